use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dramapop")]
#[command(author, version, about = "Short-drama episode player")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the stream URL chosen for an episode and its fallbacks
    Resolve {
        drama: String,

        /// 1-based episode index
        episode: u32,

        /// Preferred vertical resolution; defaults to the configured one
        #[arg(short, long)]
        quality: Option<u32>,
    },

    /// Open a drama and record it in watch history
    Watch {
        drama: String,

        /// 1-based episode index; resumes from history when omitted
        #[arg(short, long)]
        episode: Option<u32>,
    },

    /// List watch history, most recent first
    History,

    /// Remove one drama from watch history
    Forget { drama: String },

    /// Remove all watch history
    ClearHistory,
}
