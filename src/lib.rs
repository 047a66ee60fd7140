pub mod backends;
pub mod config;
pub mod events;
pub mod history;
pub mod models;
pub mod player;
pub mod services;
pub mod utils;
