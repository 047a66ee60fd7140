pub mod dramabox;
pub mod traits;

pub use dramabox::DramaBoxClient;
pub use traits::CatalogFetcher;
