use anyhow::Result;
use clap::{Parser, Subcommand};
use linkpearl_core::database::Database;
use linkpearl_core::enhancements::EnhancementConfig;
use linkpearl_core::fetch::WikiClient;
use linkpearl_core::models::{CatalogRecord, ItemSelection};
use linkpearl_core::pipeline::{ScrapeOptions, scrape_tooltips};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "linkpearl",
    version = "0.1.0",
    about = "CLI tool for linkshell item and loot metadata management",
    long_about = None
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    database: Option<std::path::PathBuf>,

    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/linkpearl.log")]
    log_file: std::path::PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an exported item dataset (CSV) into the database
    ImportItems {
        /// CSV file with item_id,name,flags columns
        #[arg(long)]
        csv_path: std::path::PathBuf,
        /// Quiet mode (0=show messages/warnings, 1=suppress messages, 2=suppress both)
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Decode item flag masks into rarity/exclusivity columns
    AnnotateFlags {
        /// Quiet mode
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Load curated enhancement/conversion relationships from TOML
    LinkEnhancements {
        /// Path to TOML file defining item relationships
        #[arg(long)]
        config: std::path::PathBuf,
        /// Quiet mode
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Scrape wiki tooltip data for a batch of items
    ScrapeTooltips {
        /// Scrape items referenced as conversion targets instead of items
        /// missing tooltip records
        #[arg(long, conflicts_with = "names")]
        conversion_targets: bool,
        /// Explicit internal item names to scrape
        #[arg(long, num_args = 1..)]
        names: Vec<String>,
        /// Delay between items in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
        /// Cap on how many items to process this run
        #[arg(long)]
        limit: Option<usize>,
        /// Quiet mode
        #[arg(long, default_value_t = 0)]
        quiet: u8,
    },

    /// Print the stored tooltip record for one item
    ShowTooltip {
        /// Internal item name, or a numeric item id
        item: String,
    },
}

fn setup_logging(
    verbose: u8,
    log_file: &std::path::Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(std::path::Path::new(".")),
        log_file
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("linkpearl.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn open_database(path: Option<std::path::PathBuf>) -> Result<Database> {
    let db_path = path.unwrap_or_else(|| std::path::PathBuf::from("./linkpearl.sqlite"));
    Ok(Database::new(&db_path)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;

    match cli.command {
        Commands::ImportItems { csv_path, quiet } => {
            let db = open_database(cli.database)?;

            if !csv_path.exists() {
                anyhow::bail!("CSV file not found: {:?}", csv_path);
            }

            if quiet == 0 {
                info!("Reading item dataset from {:?}", csv_path);
            }

            let mut reader = csv::Reader::from_path(&csv_path)?;
            let mut records = Vec::new();
            for result in reader.deserialize() {
                let record: CatalogRecord = result?;
                records.push(record);
            }

            if quiet == 0 {
                info!("Parsed {} item rows from CSV", records.len());
            }

            let written = db.insert_or_update_items(&records)?;
            if quiet == 0 {
                info!("Inserted/updated {} items in database", written);
            }
        }
        Commands::AnnotateFlags { quiet } => {
            let db = open_database(cli.database)?;
            let updated = db.annotate_flag_columns(quiet)?;
            if quiet == 0 {
                info!("Flag annotation complete: {} items updated", updated);
            }
        }
        Commands::LinkEnhancements { config, quiet } => {
            let db = open_database(cli.database)?;

            if !config.exists() {
                anyhow::bail!("Enhancement config not found: {:?}", config);
            }

            let relationships = EnhancementConfig::from_file(&config)?;
            if quiet == 0 {
                info!(
                    "Loaded {} enhancement and {} conversion entries",
                    relationships.enhancements.len(),
                    relationships.conversions.len()
                );
            }

            let report = db.link_enhancements(&relationships, quiet)?;
            if quiet == 0 {
                info!(
                    "Linked {} enhancements, {} conversions ({} entries referenced unknown items)",
                    report.enhancements_linked, report.conversions_linked, report.names_missing
                );
            }
        }
        Commands::ScrapeTooltips {
            conversion_targets,
            names,
            delay_ms,
            limit,
            quiet,
        } => {
            let db = open_database(cli.database)?;
            let client = WikiClient::new()?;

            let selection = if !names.is_empty() {
                ItemSelection::Named(names)
            } else if conversion_targets {
                ItemSelection::ConversionTargets
            } else {
                ItemSelection::MissingTooltips
            };

            let options = ScrapeOptions {
                delay: Duration::from_millis(delay_ms),
                limit,
                quiet,
            };

            let summary = scrape_tooltips(&db, &client, &selection, &options).await?;

            if quiet == 0 {
                info!("--- Summary ---");
                info!("Total processed: {}", summary.total);
                info!("Stored: {}", summary.scraped);
                info!("Skipped: {}", summary.skipped);
                info!("Failed: {}", summary.failed);
            }
        }
        Commands::ShowTooltip { item } => {
            let db = open_database(cli.database)?;

            let item_id = match item.parse::<i32>() {
                Ok(id) => {
                    if db.item_name_by_id(id)?.is_none() {
                        anyhow::bail!("No item with id {}", id);
                    }
                    id
                }
                Err(_) => db
                    .item_id_by_name(&item)?
                    .ok_or_else(|| anyhow::anyhow!("No item named {:?}", item))?,
            };

            let Some(tooltip) = db.get_tooltip(item_id)? else {
                anyhow::bail!("No tooltip record stored for item {}", item_id);
            };

            for line in &tooltip.tooltip_lines {
                println!("{}", line);
            }
            if !tooltip.hidden_effects.is_empty() {
                println!();
                println!("Hidden effects:");
                for effect in &tooltip.hidden_effects {
                    println!("  - {}", effect);
                }
            }
            if !tooltip.description.is_empty() {
                println!();
                println!("{}", tooltip.description);
            }
            println!();
            println!("Source: {} (scraped {})", tooltip.source_url, tooltip.scraped_at);
        }
    }

    Ok(())
}
