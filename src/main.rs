mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use dramapop::backends::{CatalogFetcher, DramaBoxClient};
use dramapop::config::Config;
use dramapop::events::{EventBus, NavigationOutcome};
use dramapop::history::{HistoryStore, JsonFileHistoryStore};
use dramapop::models::DramaId;
use dramapop::player::{EpisodeSource, NullBackend, PlaybackController};
use dramapop::services::{EpisodeContinuity, WatchSession};
use dramapop::utils::SystemClock;

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn open_history(config: &Config) -> Result<JsonFileHistoryStore> {
    let path = config.history_path()?;
    JsonFileHistoryStore::open(&path, config.history.capacity)
        .with_context(|| format!("Failed to open history at {:?}", path))
}

fn catalog_client(config: &Config) -> Result<DramaBoxClient> {
    DramaBoxClient::new(&config.api.base_url, &config.api.language, config.api_timeout())
        .context("Failed to create catalog client")
}

async fn resolve(config: &Config, drama: DramaId, episode: u32, quality: Option<u32>) -> Result<()> {
    let client = catalog_client(config)?;
    let quality = quality.unwrap_or(config.playback.preferred_quality);

    let episode = client
        .get_episode_video_info(&drama, episode)
        .await
        .with_context(|| format!("Failed to fetch {} episode {}", drama, episode))?;

    let candidates = EpisodeSource::candidate_urls(&episode, quality);
    let Some((selected, fallbacks)) = candidates.split_first() else {
        bail!("No playable source for {} episode {}", drama, episode.index);
    };

    println!("{} episode {} ({})", drama, episode.index, episode.name);
    println!("  selected: {}", selected);
    for url in fallbacks {
        println!("  fallback: {}", url);
    }
    let qualities: Vec<String> = EpisodeSource::available_qualities(&episode)
        .iter()
        .map(|q| format!("{q}p"))
        .collect();
    println!("  qualities: {}", qualities.join(", "));
    Ok(())
}

async fn watch(config: &Config, drama: DramaId, episode: Option<u32>) -> Result<()> {
    let catalog: Arc<dyn CatalogFetcher> = Arc::new(catalog_client(config)?);
    let player = PlaybackController::new(
        Box::new(NullBackend::new()),
        config.player_settings(),
        EventBus::default(),
    );
    let continuity = EpisodeContinuity::new(
        player,
        Box::new(open_history(config)?),
        Arc::new(SystemClock),
        config.continuity_settings(),
    );
    let session = WatchSession::new(continuity, catalog);

    match session.open_drama(drama, episode).await {
        NavigationOutcome::Opened {
            drama_id,
            episode_index,
            url,
        } => {
            println!("Opened {} episode {}", drama_id, episode_index);
            println!("  {}", url);
            Ok(())
        }
        NavigationOutcome::Failed {
            drama_id,
            episode_index,
            error,
        } => bail!("{} episode {}: {}", drama_id, episode_index, error),
        other => bail!("Nothing opened ({:?})", other),
    }
}

fn show_history(config: &Config) -> Result<()> {
    let store = open_history(config)?;
    let items = store.get_all()?;
    if items.is_empty() {
        println!("No watch history");
        return Ok(());
    }

    for item in items {
        let title = item.title.as_deref().unwrap_or(item.drama_id.as_str());
        let total = item
            .total_episodes
            .map(|t| format!("/{t}"))
            .unwrap_or_default();
        println!(
            "{}  {}  episode {}{}  {}%",
            item.last_watched_at.format("%Y-%m-%d %H:%M"),
            title,
            item.episode_index,
            total,
            item.progress
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "dramapop=debug"
    } else {
        "dramapop=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;
    info!("Using catalog {}", config.api.base_url);

    match cli.command {
        Commands::Resolve {
            drama,
            episode,
            quality,
        } => resolve(&config, DramaId::new(drama), episode, quality).await,
        Commands::Watch { drama, episode } => watch(&config, DramaId::new(drama), episode).await,
        Commands::History => show_history(&config),
        Commands::Forget { drama } => {
            let mut store = open_history(&config)?;
            if store.remove(&DramaId::new(drama.clone()))? {
                println!("Removed {} from history", drama);
            } else {
                println!("{} is not in history", drama);
            }
            Ok(())
        }
        Commands::ClearHistory => {
            open_history(&config)?.clear()?;
            println!("Watch history cleared");
            Ok(())
        }
    }
}
