use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

use opsdesk_core::dedup::{self, DuplicateGroup, NoopMergeLock};
use opsdesk_core::{AppConfig, Database, EntityKind};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "opsdesk",
    about = "opsdesk console backend — duplicate detection and merge",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Scan for duplicate customers and companies.
    Detect,

    /// Merge one duplicate group.
    Merge {
        /// Entity type: customer or company.
        #[arg(long = "type")]
        entity_type: String,

        /// Record ids forming the group (at least two, comma separated).
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        ids: Vec<String>,

        /// Explicit master id; defaults to the oldest record.
        #[arg(long)]
        master: Option<String>,

        /// Operator recorded on the merge.
        #[arg(long, default_value = "cli")]
        operator: String,
    },

    /// Detect and merge every duplicate group.
    MergeAll {
        /// Operator recorded on the merges.
        #[arg(long, default_value = "cli")]
        operator: String,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration.
    Show,
    /// Write the default configuration to disk.
    Init,
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Serve { host, port } => {
            let mut server_config = config.server.clone();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }

            let db = Arc::new(open_database(&config)?);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(opsdesk_server::run(&server_config, db))?;
        }

        Commands::Detect => {
            let db = open_database(&config)?;
            let (customers, customer_groups) = dedup::detect_customers(&db)?;
            let (companies, company_groups) = dedup::detect_companies(&db)?;

            if cli.json {
                let report = json!({
                    "customers": {
                        "total": customers.len(),
                        "duplicateGroups": customer_groups,
                    },
                    "companies": {
                        "total": companies.len(),
                        "duplicateGroups": company_groups,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_groups("customers", customers.len(), &customer_groups);
                print_groups("companies", companies.len(), &company_groups);
            }
        }

        Commands::Merge {
            entity_type,
            ids,
            master,
            operator,
        } => {
            let kind: EntityKind = entity_type.parse()?;
            let db = open_database(&config)?;
            let outcome =
                dedup::merge_group(&db, &NoopMergeLock, kind, &ids, master.as_deref(), &operator)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "Merged {} {} record(s) into {}",
                    outcome.merged_count, kind, outcome.master_id
                );
                for id in &outcome.deleted_ids {
                    println!("  deleted {id}");
                }
            }
        }

        Commands::MergeAll { operator } => {
            let db = open_database(&config)?;
            let report = dedup::merge_all(&db, &NoopMergeLock, &operator)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Merged {} group(s): {} customer, {} company",
                    report.total_merged(),
                    report.customers.merged,
                    report.companies.merged
                );
                for failure in report
                    .customers
                    .errors
                    .iter()
                    .chain(report.companies.errors.iter())
                {
                    println!("  failed {}: {}", failure.group, failure.error);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    println!("{}", toml_pretty(&config)?);
                }
            }
            ConfigAction::Init => {
                let path = AppConfig::config_path();
                config.save()?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn open_database(config: &AppConfig) -> Result<Database> {
    std::fs::create_dir_all(&config.core.data_dir)?;
    Ok(Database::open(&config.database_path())?)
}

fn print_groups(label: &str, total: usize, groups: &[DuplicateGroup]) {
    println!("{total} {label}, {} duplicate group(s)", groups.len());
    for group in groups {
        println!("  {} → {}", group.key(), group.member_ids.join(", "));
    }
}

fn toml_pretty(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
