//! stockroom - command-line front end for the inventory API
//!
//! Drives the same resources a dashboard view would: collections with
//! their stats, reports over a date preset, and CSV export.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use stockroom::constants::{APP_NAME, APP_VERSION};
use stockroom::date_range::local_today;
use stockroom::resource::{product_stats, supplier_stats};
use stockroom::{
    ApiClient, ClientConfig, CollectionEndpoints, CollectionResource, CsvExporter, DateRange,
    DerivedStats, FileDownloads, Notifier, Preset, Record, RequestResource, Scope,
};

const SUPPLIER_HEADERS: &[&str] = &["ID", "Name", "Email", "Phone", "Category", "Status"];
const PRODUCT_HEADERS: &[&str] = &["ID", "Name", "SKU", "Category", "Quantity", "Price"];

#[derive(Parser, Debug)]
#[command(name = "stockroom", version, about = "Inventory API client")]
struct Cli {
    /// Config file (default: ~/.stockroom/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for stockroom.log
    #[arg(long, global = true, default_value = ".")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List suppliers with per-category counts
    Suppliers {
        /// Read the admin-wide listing
        #[arg(long)]
        admin: bool,
        /// Also export as CSV
        #[arg(long)]
        export: bool,
    },
    /// List products with per-category counts
    Products {
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        export: bool,
    },
    /// Fetch a report endpoint over a date range
    Report {
        /// Endpoint path, e.g. /reports/sales
        endpoint: String,
        #[arg(long, default_value = "last-30-days")]
        preset: Preset,
        /// Export array payloads as CSV under this file name
        #[arg(long)]
        export: Option<String>,
    },
    /// Show the date presets as of today
    Presets,
}

/// Prints notifications for a terminal user
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!(%message, "notify success");
        println!("✓ {}", message);
    }

    fn notify_error(&self, message: &str) {
        tracing::warn!(%message, "notify error");
        eprintln!("✗ {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(&cli.log_dir, "stockroom.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    tracing::info!(app = APP_NAME, version = APP_VERSION, "Starting");

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ClientConfig::from_file(path)?;
            config.apply_env();
            config
        }
        None => ClientConfig::load()?,
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let client = ApiClient::new(&config);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let exporter = CsvExporter::new(FileDownloads::new(config.resolved_export_dir()));

    match cli.command {
        Command::Suppliers { admin, export } => {
            let suppliers = CollectionResource::create(
                client,
                CollectionEndpoints::suppliers(),
                Scope::from_admin_flag(admin),
                supplier_stats(),
                notifier,
            )
            .await;

            let items = suppliers.items();
            for s in &items {
                println!(
                    "{:>6}  {:<30} {:<28} {}",
                    s.id,
                    s.name,
                    s.email.as_deref().unwrap_or("-"),
                    s.category.as_deref().unwrap_or("-")
                );
            }
            print_stats(&suppliers.stats());

            if export {
                report_export(exporter.export_rows(&items, SUPPLIER_HEADERS, "suppliers")?);
            }
        }

        Command::Products { admin, export } => {
            let products = CollectionResource::create(
                client,
                CollectionEndpoints::products(),
                Scope::from_admin_flag(admin),
                product_stats(),
                notifier,
            )
            .await;

            let items = products.items();
            for p in &items {
                println!(
                    "{:>6}  {:<30} {:<14} {:>8}",
                    p.id,
                    p.name,
                    p.sku.as_deref().unwrap_or("-"),
                    p.quantity
                );
            }
            print_stats(&products.stats());

            if export {
                report_export(exporter.export_rows(&items, PRODUCT_HEADERS, "products")?);
            }
        }

        Command::Report {
            endpoint,
            preset,
            export,
        } => {
            let mut range = DateRange::new(config.default_range_days);
            range.apply_preset(preset);

            let report: RequestResource<Value> = RequestResource::create(
                client,
                endpoint,
                range.to_api_params(),
                range.dependency_key(),
                notifier,
            )
            .await;

            let Some(data) = report.data() else {
                bail!(
                    "{}",
                    report.error().unwrap_or_else(|| "No data returned".to_string())
                );
            };
            println!("{}", serde_json::to_string_pretty(&data)?);

            if let Some(base) = export {
                let rows = match data {
                    Value::Array(rows) => rows,
                    other => vec![other],
                };
                report_export(exporter.export_mapped(&rows, to_record, &base)?);
            }
        }

        Command::Presets => {
            let today = local_today();
            for preset in Preset::ALL {
                let (start, end) = preset.bounds(today);
                println!("{:<14} {:<14} {} .. {}", preset.name(), preset.label(), start, end);
            }
        }
    }

    Ok(())
}

fn to_record(value: &Value) -> Record {
    match value {
        Value::Object(map) => map.clone(),
        other => {
            let mut record = Record::new();
            record.insert("value".to_string(), other.clone());
            record
        }
    }
}

fn print_stats(stats: &DerivedStats) {
    if stats.is_empty() {
        return;
    }
    println!();
    for (label, count) in stats {
        println!("{:<24} {}", label, count);
    }
}

fn report_export(filename: Option<String>) {
    match filename {
        Some(filename) => println!("Exported {}", filename),
        None => println!("Nothing to export"),
    }
}
