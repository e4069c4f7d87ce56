mod cli;
mod output;

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rtok_config::Config;
use rtok_core::Target;
use rtok_engine::Counter;
use rtok_sources::{Discovery, SourceOptions};
use rtok_storage::{JsonFileStore, ResultCache, SystemClock};
use rtok_tokens::{BpeTokenizer, MatchKind, resolve_model};
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let target = Target::resolve(&cli.path)?;
    let model = cli.model.clone().unwrap_or_else(|| config.model.clone());

    let matched = resolve_model(&model);
    match matched.kind {
        MatchKind::Exact => debug!("Model {} uses {}", model, matched.encoding),
        MatchKind::Approximate => debug!("Approximating {} with {}", model, matched.encoding),
        MatchKind::Fallback => debug!("Unknown model {}, falling back to {}", model, matched.encoding),
    }
    let tokenizer = BpeTokenizer::new(matched.encoding).context("Failed to load tokenizer")?;

    let discovery = Discovery::new(SourceOptions::from(&config.discovery));
    let mut counter = Counter::new(model, Arc::new(tokenizer), discovery);
    if config.cache.enabled && !cli.no_cache {
        match result_cache(&config) {
            Some(cache) => counter = counter.with_cache(cache),
            None => warn!("No home directory found; token cache disabled"),
        }
    }

    let report = counter.count(&target).await?;

    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let rendered = output::render(&report, &target.display_name(), cli.output_mode(), color)?;
    println!("{rendered}");

    Ok(())
}

fn result_cache(config: &Config) -> Option<ResultCache> {
    let path = config.cache_path()?;
    debug!("Token cache at {}", path.display());

    Some(
        ResultCache::new(Box::new(JsonFileStore::new(path)), Arc::new(SystemClock))
            .with_ttl(Duration::from_secs(config.cache.ttl_secs))
            .with_max_entries(config.cache.max_entries),
    )
}
