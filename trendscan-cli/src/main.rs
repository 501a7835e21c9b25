//! Command-line front end for trend-template screening and alert commands.
//!
//! Commands:
//! - `scan`: screen a universe, alert new qualifiers, send a summary
//! - `evaluate`: print the full template breakdown for one symbol
//! - `near-misses`: list symbols just below the qualification score
//! - `alerts status|recent|prune`: inspect or trim the alert history
//! - `init-config`: write a default configuration file

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendscan_core::{evaluate, SeriesSource};
use trendscan_runner::{
    render_alert, render_near_misses, run_scan, screen_batch, AlertDeduplicator, AlertStore,
    AppConfig, BatchOptions, CsvSeriesSource, JsonFileStore, LogNotifier, MemoryStore, Notifier,
    OutboxNotifier, ScanOptions, ScanReport, SyntheticSource, SystemClock, Universe,
};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "trendscan.toml";

#[derive(Parser)]
#[command(
    name = "trendscan",
    about = "Trend-template stock screener with deduplicated alerts"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./trendscan.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the symbol list comes from.
#[derive(clap::Args, Default)]
struct SymbolArgs {
    /// Symbols to screen (comma or space separated).
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    symbols: Vec<String>,

    /// Universe TOML file. Overrides `[data] universe_path`.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Use deterministic synthetic prices instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Screen symbols in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen, alert new qualifiers, and send a scan summary.
    Scan {
        #[command(flatten)]
        input: SymbolArgs,

        /// Screen and render, but leave the alert history untouched and print
        /// messages instead of delivering them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Print the scan report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Evaluate one symbol and print every criterion.
    Evaluate {
        symbol: String,

        /// Use deterministic synthetic prices instead of CSV files.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List symbols scoring just below the qualification threshold.
    NearMisses {
        #[command(flatten)]
        input: SymbolArgs,
    },
    /// Alert history commands.
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AlertsAction {
    /// Totals, last-24h count, and most alerted symbols.
    Status,
    /// Alerts sent within the last N hours.
    Recent {
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Remove records last alerted more than N days ago.
    Prune {
        #[arg(long)]
        days: i64,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { path, force } = &cli.command {
        return run_init_config(path, *force);
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Scan {
            input,
            dry_run,
            json,
        } => run_scan_cmd(&config, &input, dry_run, json),
        Commands::Evaluate {
            symbol,
            synthetic,
            json,
        } => run_evaluate(&config, &symbol, synthetic, json),
        Commands::NearMisses { input } => run_near_misses(&config, &input),
        Commands::Alerts { action } => match action {
            AlertsAction::Status => run_alerts_status(&config),
            AlertsAction::Recent { hours } => run_alerts_recent(&config, hours),
            AlertsAction::Prune { days, confirm } => run_alerts_prune(&config, days, confirm),
        },
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => AppConfig::from_file(p)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => AppConfig::default(),
    };
    Ok(config)
}

/// `RUST_LOG` wins over `[logging] level`. Logs go to stderr so stdout
/// stays clean for messages and JSON.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_symbols(config: &AppConfig, input: &SymbolArgs) -> Result<Vec<String>> {
    let from_cli: Vec<String> = input
        .symbols
        .iter()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if !from_cli.is_empty() {
        return Ok(from_cli);
    }

    let universe_path = input
        .universe
        .as_ref()
        .or(config.data.universe_path.as_ref());
    match universe_path {
        Some(path) => {
            let universe = Universe::from_file(path)
                .with_context(|| format!("loading universe {}", path.display()))?;
            Ok(universe.all_symbols())
        }
        None => {
            let universe = Universe::default_nse();
            info!(
                symbols = universe.symbol_count(),
                "no symbols or universe given, using the built-in NSE list"
            );
            Ok(universe.all_symbols())
        }
    }
}

fn build_source(config: &AppConfig, synthetic: bool) -> Box<dyn SeriesSource> {
    if synthetic {
        eprintln!("WARNING: using synthetic prices, results are not market data");
        Box::new(SyntheticSource::default().with_drift(0.001))
    } else {
        Box::new(CsvSeriesSource::new(&config.data.series_dir))
    }
}

fn build_notifier(config: &AppConfig, dry_run: bool) -> Box<dyn Notifier> {
    match &config.alerts.outbox_path {
        Some(path) if !dry_run => Box::new(OutboxNotifier::new(path)),
        _ => Box::new(LogNotifier),
    }
}

fn run_scan_cmd(config: &AppConfig, input: &SymbolArgs, dry_run: bool, json: bool) -> Result<()> {
    let symbols = resolve_symbols(config, input)?;
    let source = build_source(config, input.synthetic);
    let notifier = build_notifier(config, dry_run);
    let opts = ScanOptions {
        batch: BatchOptions {
            parallel: input.parallel,
            cancel: None,
        },
        ..ScanOptions::from_config(config)
    };

    let file_store = JsonFileStore::new(&config.alerts.history_path);
    let report = if dry_run {
        // Start from the real history so cooldowns still apply, but keep
        // every claim in memory.
        let store = MemoryStore::with_history(file_store.load()?);
        let dedup = AlertDeduplicator::new(store, SystemClock, config.alerts.cooldown());
        info!("dry run: alert history will not be written");
        run_scan(&symbols, source.as_ref(), config, &dedup, notifier.as_ref(), &opts)
    } else {
        let dedup = AlertDeduplicator::new(file_store, SystemClock, config.alerts.cooldown());
        run_scan(&symbols, source.as_ref(), config, &dedup, notifier.as_ref(), &opts)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_scan_report(&report);
    }

    if !report.store_errors.is_empty() {
        bail!(
            "alert store failed for {} symbol(s); check {}",
            report.store_errors.len(),
            config.alerts.history_path.display()
        );
    }
    Ok(())
}

fn print_scan_report(report: &ScanReport) {
    let s = &report.batch.summary;
    eprintln!();
    eprintln!("=== Scan Report ===");
    eprintln!("Config:       {}", report.fingerprint);
    eprintln!("Source:       {}", report.batch.source);
    eprintln!("Screened:     {}/{}", s.screened, s.total);
    eprintln!(
        "Qualified:    {} ({} perfect, {} near misses)",
        s.qualified, s.perfect, s.near_miss
    );
    eprintln!("Incomplete:   {}", s.incomplete);
    eprintln!("Errors:       {}", s.errored);
    if s.skipped > 0 {
        eprintln!("Skipped:      {}", s.skipped);
    }
    eprintln!("Alerts sent:  {}", report.sent.len());
    eprintln!("In cooldown:  {}", report.suppressed.len());
    for failure in &report.delivery_failures {
        eprintln!("  delivery failed for {}: {}", failure.symbol, failure.error);
    }
    for failure in &report.store_errors {
        eprintln!("  store error for {}: {}", failure.symbol, failure.error);
    }
    for (symbol, error) in report.batch.errors() {
        eprintln!("  {symbol}: {error}");
    }
}

fn run_evaluate(config: &AppConfig, symbol: &str, synthetic: bool, json: bool) -> Result<()> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let source = build_source(config, synthetic);
    let series = source
        .fetch_series(&symbol)
        .with_context(|| format!("fetching {symbol} from {}", source.name()))?;
    let result = evaluate(&symbol, &series, &config.template);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_alert(&result, &config.template));
        if let trendscan_core::Completeness::Incomplete {
            available_bars,
            required_bars,
            ..
        } = result.completeness
        {
            println!();
            println!("Only {available_bars} of {required_bars} required bars available.");
        }
    }
    Ok(())
}

fn run_near_misses(config: &AppConfig, input: &SymbolArgs) -> Result<()> {
    let symbols = resolve_symbols(config, input)?;
    let source = build_source(config, input.synthetic);
    let opts = BatchOptions {
        parallel: input.parallel,
        cancel: None,
    };
    let batch = screen_batch(&symbols, source.as_ref(), &config.template, &opts);

    let mut near = batch.near_misses();
    near.sort_by(|a, b| trendscan_runner::screener::rank_order(a, b));
    println!("{}", render_near_misses(&near, &config.template));
    Ok(())
}

fn run_alerts_status(config: &AppConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.alerts.history_path);
    let history = store.load()?;
    let stats = history.statistics(Utc::now());

    println!("History:          {}", store.path().display());
    println!("Symbols alerted:  {}", stats.symbols_alerted);
    println!("Total alerts:     {}", stats.total_alerts);
    println!("Last 24h:         {}", stats.alerts_last_24h);
    if !stats.most_alerted.is_empty() {
        println!();
        println!("Most alerted:");
        for (symbol, count) in &stats.most_alerted {
            println!("  {symbol:<12} {count:>5}");
        }
    }
    Ok(())
}

fn run_alerts_recent(config: &AppConfig, hours: i64) -> Result<()> {
    if hours <= 0 {
        bail!("--hours must be positive");
    }
    let Some(window) = Duration::try_hours(hours) else {
        bail!("--hours {hours} is out of range");
    };
    let history = JsonFileStore::new(&config.alerts.history_path).load()?;
    let recent = history.recent(Utc::now(), window);
    if recent.is_empty() {
        println!("No alerts in the last {hours} hours.");
        return Ok(());
    }

    println!("{:<12} {:<20} {:>5} {:>6}", "Symbol", "Last alert (UTC)", "Score", "Count");
    println!("{}", "-".repeat(46));
    for r in recent {
        println!(
            "{:<12} {:<20} {:>5} {:>6}",
            r.symbol,
            r.last_alerted.format("%Y-%m-%d %H:%M"),
            r.last_score,
            r.alert_count
        );
    }
    Ok(())
}

fn run_alerts_prune(config: &AppConfig, days: i64, confirm: bool) -> Result<()> {
    if days <= 0 {
        bail!("--days must be positive");
    }
    let Some(age) = Duration::try_days(days) else {
        bail!("--days {days} is out of range");
    };
    let store = JsonFileStore::new(&config.alerts.history_path);
    let mut history = store.load()?;
    let now = Utc::now();

    let stale: Vec<String> = history
        .older_than(now, age)
        .into_iter()
        .map(|r| r.symbol.clone())
        .collect();

    if stale.is_empty() {
        println!("No alert records older than {days} days.");
        return Ok(());
    }

    println!("Found {} record(s) older than {days} days:", stale.len());
    for symbol in &stale {
        println!("  {symbol}");
    }

    if !confirm {
        println!();
        println!("Dry run. Pass --confirm to actually delete.");
        return Ok(());
    }

    let removed = history.prune_older_than(now, age);
    store.save(&history)?;
    println!("Removed {removed} record(s).");
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    let text = AppConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
