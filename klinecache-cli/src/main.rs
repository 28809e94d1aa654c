//! klinecache CLI: download, load, stats and cache commands.
//!
//! Commands:
//! - `download` fetch klines from Binance and cache one CSV per asset
//! - `load` read cached assets back, aligned on a shared time index
//! - `stats` mean and covariance of log returns over cached assets
//! - `cache status` report what each cached artifact holds

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use klinecache_core::data::{KlineProvider, StdoutProgress, SyntheticProvider};
use klinecache_core::domain::{parse_utc, Field, Interval, TimeRange};
use klinecache_core::PipelineConfig;
use klinecache_runner::{export, pipeline};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "klinecache",
    version,
    about = "klinecache: Binance kline downloader, CSV cache and aligner"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that touches the cache.
#[derive(Args, Clone)]
struct CommonArgs {
    /// TOML config file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cache directory. Defaults to ./data_1h.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download klines from Binance and cache one CSV per asset.
    Download {
        /// Base assets to download (e.g., BTC ETH SOL).
        #[arg(required = true)]
        assets: Vec<String>,

        /// Start time (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, UTC).
        #[arg(long)]
        start: String,

        /// End time (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, UTC), inclusive.
        #[arg(long)]
        end: String,

        /// Quote asset. Defaults to USDT.
        #[arg(long)]
        quote: Option<String>,

        /// Candle interval (1m, 5m, 1h, 4h, 1d, ...). Defaults to 1h.
        #[arg(long)]
        interval: Option<Interval>,

        /// Records per request (1-1000). Defaults to 1000.
        #[arg(long)]
        limit: Option<u32>,

        /// Retries per failed request. Defaults to 0.
        #[arg(long)]
        retries: Option<u32>,

        /// Print the planned requests without fetching.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Use deterministic synthetic candles instead of the network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Load cached assets aligned on a shared time index.
    Load {
        #[arg(required = true)]
        assets: Vec<String>,

        /// Window start (inclusive). Defaults to the earliest cached row.
        #[arg(long)]
        start: Option<String>,

        /// Window end (inclusive). Defaults to the latest cached row.
        #[arg(long)]
        end: Option<String>,

        /// Comma-separated fields (open,high,low,close,volume). Defaults to close.
        #[arg(long)]
        fields: Option<String>,

        /// Write the aligned CSV here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Mean vector and covariance matrix of log returns.
    Stats {
        #[arg(required = true)]
        assets: Vec<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Price field the returns are computed on.
        #[arg(long, default_value = "close")]
        field: Field,

        /// Print JSON instead of CSV.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report row counts, time span and integrity per cached asset.
    Status {
        /// Assets to report. Defaults to every artifact in the cache.
        assets: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            assets,
            start,
            end,
            quote,
            interval,
            limit,
            retries,
            dry_run,
            synthetic,
            common,
        } => {
            let mut config = build_config(&common)?;
            if let Some(quote) = quote {
                config.quote_asset = quote;
            }
            if let Some(interval) = interval {
                config.step = interval;
            }
            if let Some(limit) = limit {
                config.page_limit = limit;
            }
            if let Some(retries) = retries {
                config.max_retries = retries;
            }
            config.validate()?;
            let range = TimeRange::parse(&start, &end)?;
            run_download(&config, &assets, &range, dry_run, synthetic)
        }
        Commands::Load {
            assets,
            start,
            end,
            fields,
            out,
            common,
        } => {
            let mut config = build_config(&common)?;
            if let Some(fields) = fields {
                config.fields = Field::parse_list(&fields)?;
            }
            config.validate()?;
            let range = window(start.as_deref(), end.as_deref())?;
            run_load(&config, &assets, &range, out.as_deref())
        }
        Commands::Stats {
            assets,
            start,
            end,
            field,
            json,
            out,
            common,
        } => {
            let config = build_config(&common)?;
            let range = window(start.as_deref(), end.as_deref())?;
            run_stats(&config, &assets, &range, field, json, out.as_deref())
        }
        Commands::Cache { action } => match action {
            CacheAction::Status { assets, common } => {
                let config = build_config(&common)?;
                run_cache_status(&config, &assets)
            }
        },
    }
}

/// Config file (or defaults) with the shared flag overrides applied.
fn build_config(common: &CommonArgs) -> Result<PipelineConfig> {
    let mut config = match &common.config {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            PipelineConfig::from_file(path)?
        }
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &common.data_dir {
        config.storage_path = dir.clone();
    }
    Ok(config)
}

/// Inclusive window; a missing bound is open on that side.
fn window(start: Option<&str>, end: Option<&str>) -> Result<TimeRange> {
    let start = start
        .map(parse_utc)
        .transpose()?
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = end
        .map(parse_utc)
        .transpose()?
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Ok(TimeRange::new(start, end)?)
}

fn asset_refs(assets: &[String]) -> Vec<&str> {
    assets.iter().map(|s| s.as_str()).collect()
}

fn run_download(
    config: &PipelineConfig,
    assets: &[String],
    range: &TimeRange,
    dry_run: bool,
    synthetic: bool,
) -> Result<()> {
    if dry_run {
        let windows = pipeline::plan(config, range)?;
        println!(
            "{} request(s) per asset, {} asset(s), interval {}, limit {}:",
            windows.len(),
            assets.len(),
            config.step,
            config.page_limit
        );
        for w in &windows {
            println!("  {} .. {}", w.start, w.end);
        }
        return Ok(());
    }

    let synthetic_provider;
    let live_provider;
    let provider: &dyn KlineProvider = if synthetic {
        synthetic_provider = SyntheticProvider::new(config.step);
        &synthetic_provider
    } else {
        live_provider = pipeline::binance_provider(config)?;
        &live_provider
    };

    let summary = pipeline::collect(config, &asset_refs(assets), range, provider, &StdoutProgress)?;
    println!(
        "Cached {} row(s) in {}",
        summary.total_rows(),
        config.storage_path.display()
    );
    if synthetic {
        println!("WARNING: cached data is SYNTHETIC");
    }
    Ok(())
}

fn run_load(
    config: &PipelineConfig,
    assets: &[String],
    range: &TimeRange,
    out: Option<&Path>,
) -> Result<()> {
    let table = pipeline::load(config, &asset_refs(assets), range)?;
    let csv = export::aligned_to_csv(&table, &config.fields)?;
    emit(&csv, out)?;
    if let Some(path) = out {
        println!(
            "Wrote {} row(s) for {} asset(s) to {}",
            table.len(),
            table.assets().len(),
            path.display()
        );
    }
    Ok(())
}

fn run_stats(
    config: &PipelineConfig,
    assets: &[String],
    range: &TimeRange,
    field: Field,
    json: bool,
    out: Option<&Path>,
) -> Result<()> {
    let stats = pipeline::stats(config, &asset_refs(assets), range, field)?;
    let rendered = if json {
        export::stats_to_json(&stats)?
    } else {
        export::stats_to_csv(&stats)?
    };
    emit(&rendered, out)
}

fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => export::save(path, content),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

fn run_cache_status(config: &PipelineConfig, assets: &[String]) -> Result<()> {
    let cache_dir = &config.storage_path;
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let assets = if assets.is_empty() {
        cached_assets(cache_dir)?
    } else {
        assets.to_vec()
    };
    if assets.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let statuses = pipeline::status(config, &asset_refs(&assets));
    println!("Cache: {}", cache_dir.display());
    println!();
    println!(
        "{:<8} {:<5} {:<41} {:>8} {:>6} {:>10}  {}",
        "Asset", "Step", "Time Span", "Rows", "Gaps", "Size", "Hash"
    );
    println!("{}", "-".repeat(91));
    for s in &statuses {
        if !s.cached {
            println!("{:<8} (not cached)", s.asset);
            continue;
        }
        let span = match (s.first_timestamp, s.last_timestamp) {
            (Some(first), Some(last)) => format!(
                "{} to {}",
                first.format("%Y-%m-%d %H:%M"),
                last.format("%Y-%m-%d %H:%M")
            ),
            (None, None) if s.row_count == Some(0) => "(empty)".to_string(),
            _ => "(no meta)".to_string(),
        };
        let size = std::fs::metadata(config.storage_path.join(format!("{}.csv", s.asset)))
            .map(|m| m.len())
            .unwrap_or(0);
        let hash = match s.intact {
            Some(true) => "ok",
            Some(false) => "MISMATCH",
            None => "-",
        };
        println!(
            "{:<8} {:<5} {:<41} {:>8} {:>6} {:>10}  {}",
            s.asset,
            s.interval.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
            span,
            s.row_count.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
            s.missing_candles.map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
            format_size(size),
            hash
        );
    }

    if statuses.iter().any(|s| s.intact == Some(false)) {
        bail!("one or more artifacts no longer match their recorded hash");
    }
    Ok(())
}

/// Asset names of every `*.csv` artifact in the cache directory.
fn cached_assets(cache_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(cache_dir)
        .with_context(|| format!("failed to read {}", cache_dir.display()))?;
    let mut assets = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            assets.push(stem.to_string());
        }
    }
    assets.sort();
    Ok(assets)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
