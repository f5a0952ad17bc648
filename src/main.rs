//! Listing History - Binary Entry Point
//!
//! Lists regions, imports CSV snapshots, and computes daily price series.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use listing_history::event_store::export::{export_csv_file, write_compact, write_csv};
use listing_history::event_store::import::import_region;
use listing_history::event_store::{parse_min_change_price, resolve_data_dir};
use listing_history::utils::atomic_write_with;
use listing_history::{
    compute_daily_statistics, compute_partitions, DailySeries, EventStore, EventStoreConfig,
    PartitionKey,
};

/// Result type for binary entry points
type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "listing-history", version, about = "Daily listing price reconstruction")]
struct Cli {
    /// Directory holding the region JSONL files
    #[arg(long, global = true, env = "LISTING_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Drop price changes whose old price is at or below this ("none" keeps all)
    #[arg(long, global = true, env = "LISTING_MIN_CHANGE_PRICE")]
    min_change_price: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List regions present in the data directory
    Regions,

    /// Compute the daily price series of a partition
    Daily {
        /// Region to replay
        #[arg(long, required_unless_present = "all_regions")]
        region: Option<String>,

        /// Restrict to one location inside the region
        #[arg(long, conflicts_with = "all_regions")]
        location: Option<String>,

        /// Replay every region in parallel; --output is a directory
        #[arg(long, conflicts_with = "region", requires = "output")]
        all_regions: bool,

        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Output file (or directory with --all-regions); stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Append CSV listing and change rows to a region
    Import {
        #[arg(long)]
        region: String,

        /// CSV with aid,location,price,nts,uts
        #[arg(long)]
        listings: PathBuf,

        /// CSV with aid,old_price,new_price,ts
        #[arg(long)]
        changes: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Compact,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Compact => "txt",
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = EventStore::with_config(build_config(&cli)?);

    match cli.command {
        Command::Regions => {
            for region in store.list_regions()? {
                println!("{}", region);
            }
            Ok(())
        }
        Command::Daily {
            region,
            location,
            all_regions,
            format,
            output,
        } => {
            if all_regions {
                // clap enforces --output with --all-regions
                let dir = output.ok_or("--all-regions needs --output")?;
                return daily_all_regions(&store, format, &dir);
            }

            let region = region.ok_or("--region is required")?;
            let key = match location.filter(|l| !l.is_empty()) {
                Some(location) => PartitionKey::location(region, location),
                None => PartitionKey::region(region),
            };

            let series = compute_daily_statistics(&store, &key)?;
            write_series(&series, format, output.as_deref())
        }
        Command::Import {
            region,
            listings,
            changes,
        } => {
            let listings = BufReader::new(File::open(&listings)?);
            let changes = match changes {
                Some(path) => Some(BufReader::new(File::open(path)?)),
                None => None,
            };

            let (listing_count, change_count) = import_region(&store, &region, listings, changes)?;
            println!(
                "Imported {} listings and {} price changes into {}",
                listing_count, change_count, region
            );
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliResult<EventStoreConfig> {
    let mut config = EventStoreConfig::from_env();

    if let Some(dir) = &cli.data_dir {
        config.data_dir = resolve_data_dir(dir);
    }
    if let Some(value) = &cli.min_change_price {
        config.min_change_old_price = parse_min_change_price(value)
            .ok_or_else(|| format!("invalid --min-change-price: {}", value))?;
    }

    Ok(config)
}

fn daily_all_regions(store: &EventStore, format: Format, dir: &Path) -> CliResult<()> {
    let keys: Vec<PartitionKey> = store
        .list_regions()?
        .into_iter()
        .map(PartitionKey::region)
        .collect();

    let mut failed = 0;
    for (key, result) in compute_partitions(store, &keys) {
        match result {
            Ok(series) => {
                let path = dir.join(format!("{}.{}", key.region, format.extension()));
                match write_series(&series, format, Some(&path)) {
                    Ok(()) => {
                        info!(region = %key.region, path = %path.display(), "Wrote daily series")
                    }
                    Err(e) => {
                        error!(region = %key.region, path = %path.display(), error = %e, "Write failed");
                        failed += 1;
                    }
                }
            }
            Err(e) => {
                error!(region = %key.region, error = %e, "Region failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} regions failed", failed, keys.len()).into());
    }
    Ok(())
}

fn write_series(series: &DailySeries, format: Format, output: Option<&Path>) -> CliResult<()> {
    match (format, output) {
        (Format::Csv, Some(path)) => export_csv_file(series, path)?,
        (Format::Csv, None) => write_csv(series, io::stdout().lock())?,
        (Format::Compact, Some(path)) => atomic_write_with(path, |out| {
            write_compact(series, out).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        })?,
        (Format::Compact, None) => write_compact(series, io::stdout().lock())?,
        (Format::Json, Some(path)) => atomic_write_with(path, |out| {
            serde_json::to_writer_pretty(&mut *out, series)?;
            Ok(())
        })?,
        (Format::Json, None) => {
            println!("{}", serde_json::to_string_pretty(series)?);
        }
    }
    Ok(())
}
