mod config;
mod dedup;
mod model;
mod normalizer;
mod parser;
mod scoring;
mod scraper;
mod storage;

use std::collections::HashSet;

use clap::Parser;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::{AppConfig, load_config};
use crate::dedup::Deduplicator;
use crate::model::Listing;
use crate::normalizer::{filter_iso_posts, normalize_all, validate};
use crate::scoring::compute_rating;
use crate::scraper::Scraper;
use crate::storage::SqliteStorage;

/// NYC short-term sublet listings pipeline.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Comma-separated list of sources to run (default: all)
    #[arg(long)]
    source: Option<String>,

    /// Scrape and score but don't write to the database
    #[arg(long)]
    dry_run: bool,

    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    config: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {e}");
            std::process::exit(1);
        }
    };

    let scrapers = select_scrapers(cli.source.as_deref());

    if let Err(e) = run_pipeline(scrapers, &cfg, cli.dry_run).await {
        error!("Pipeline failed: {e}");
        std::process::exit(1);
    }
}

/// Resolves the `--source` flag against the adapter registry. Unknown
/// names are fatal so typos don't silently run nothing.
fn select_scrapers(source: Option<&str>) -> Vec<(&'static str, Box<dyn Scraper>)> {
    let mut registry = crate::scraper::registry();

    let Some(source) = source else {
        return registry;
    };

    let requested: Vec<&str> = source.split(',').map(str::trim).collect();
    let available: Vec<&str> = registry.iter().map(|(name, _)| *name).collect();
    for name in &requested {
        if !available.contains(name) {
            error!("Unknown source '{name}'. Available: {available:?}");
            std::process::exit(1);
        }
    }

    registry.retain(|(name, _)| requested.contains(name));
    registry
}

/// One scraper invocation with error isolation: a failing source logs and
/// contributes nothing instead of aborting the run.
async fn run_scraper_safe(name: &str, scraper: &dyn Scraper, cfg: &AppConfig) -> Vec<Listing> {
    info!("Starting {name}");
    match scraper.scrape(cfg).await {
        Ok(listings) => {
            info!("{name} returned {} listings", listings.len());
            listings
        }
        Err(e) => {
            error!("{name} FAILED: {e}");
            Vec::new()
        }
    }
}

async fn run_pipeline(
    scrapers: Vec<(&'static str, Box<dyn Scraper>)>,
    cfg: &AppConfig,
    dry_run: bool,
) -> Result<(), model::StorageError> {
    // Phase 1: scrape all selected sources concurrently
    let tasks = scrapers
        .iter()
        .map(|(name, scraper)| run_scraper_safe(name, scraper.as_ref(), cfg));
    let mut all_listings: Vec<Listing> = join_all(tasks).await.into_iter().flatten().collect();
    info!("Total raw listings: {}", all_listings.len());

    // Phase 2: fill fields the adapters left empty
    normalize_all(&mut all_listings, cfg);

    // Phase 3: drop "in search of" posts
    let all_listings = filter_iso_posts(all_listings);

    // Phase 4: validate
    let mut all_listings: Vec<Listing> = all_listings
        .into_iter()
        .filter(|l| validate(l, cfg))
        .collect();
    info!("After validation: {}", all_listings.len());

    // Phase 5: assign fingerprints
    for listing in &mut all_listings {
        listing.id = listing.generate_fingerprint();
    }

    // Phase 6: deduplicate against this batch and prior runs
    let mut storage = if dry_run {
        None
    } else {
        Some(SqliteStorage::new(&cfg.db_path)?)
    };
    let seed: HashSet<String> = match &storage {
        Some(s) => s.seed_fingerprints()?,
        None => HashSet::new(),
    };
    let mut new_listings = Deduplicator::new(seed).deduplicate(all_listings);
    info!("After dedup: {} new listings", new_listings.len());

    // Phase 7: score and rank
    for listing in &mut new_listings {
        let (rating, breakdown) = compute_rating(listing, &cfg.scoring);
        listing.rating = rating;
        listing.rating_breakdown = Some(breakdown);
    }
    new_listings.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    // Phase 8: persist
    match &mut storage {
        None => {
            info!("DRY RUN - not writing to database");
            for l in new_listings.iter().take(20) {
                info!(
                    "  [{:.1}] ${} | {} | {} | {}",
                    l.rating,
                    l.price_monthly
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    l.neighborhood,
                    l.listing_type,
                    l.source
                );
            }
        }
        Some(storage) => {
            let added = storage.append_listings(&new_listings)?;
            info!("Pipeline complete. Added {added} listings.");
        }
    }

    if new_listings.is_empty() {
        warn!("No new listings this run");
    }
    Ok(())
}
