pub mod core;
pub mod providers;
pub mod resolver;
pub mod store;

use crate::core::config::{AppConfig, CacheBackend};
use crate::providers::CurrencyApiProvider;
use crate::resolver::RateResolver;
use crate::store::disk::DiskRateStore;
use anyhow::{Context, Result, bail};
use chrono::{Days, Local};
use std::sync::Arc;
use tracing::{debug, info};

pub use crate::core::error::ConversionError;

pub enum AppCommand {
    Rate { from: String, to: String },
    Prune { days: u64 },
}

/// Wires the configured fetcher and store into a resolver.
pub fn build_resolver(config: &AppConfig) -> Result<RateResolver> {
    let api_key = config.api_key();
    if api_key.is_none() {
        debug!(
            "No API key in config or ${}, requesting without one",
            config.provider.api_key_env
        );
    }

    let fetcher = CurrencyApiProvider::from_config(&config.provider, api_key)?;
    let cache_path = config.cache_path()?;
    let store = store::open_store(&config.cache, &cache_path)
        .with_context(|| format!("Failed to open rate cache at {}", cache_path.display()))?;

    Ok(RateResolver::new(Arc::new(fetcher), store))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.base_url,
        cache = ?config.cache,
        "Loaded config"
    );

    match command {
        AppCommand::Rate { from, to } => {
            let resolver = build_resolver(&config)?;
            let rate = resolver.resolve(&from, &to).await?;
            println!("{} -> {}: {rate}", from.to_uppercase(), to.to_uppercase());
            Ok(())
        }
        AppCommand::Prune { days } => {
            if config.cache.backend != CacheBackend::Disk {
                bail!("Pruning is only supported for the disk cache");
            }
            let store = DiskRateStore::new(config.cache_path()?);
            let cutoff = Local::now()
                .date_naive()
                .checked_sub_days(Days::new(days))
                .context("Prune cutoff out of range")?;
            let removed = store
                .prune_before(cutoff)
                .await
                .with_context(|| format!("Failed to prune {}", store.root().display()))?;
            info!(removed, %cutoff, "Pruned stale rate partitions");
            println!("Removed {removed} partition(s) older than {cutoff}");
            Ok(())
        }
    }
}
