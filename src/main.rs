//! Roster CLI - serve the student record API or talk to a running server

use clap::{Parser, Subcommand};
use roster::config::{self, RosterConfig};
use roster::storage::StoreGateway;
use roster::ui::{self, Icons};
use roster::{NewStudent, RecordService, RefEntry, RosterClient, StudentFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Student record service - filtered listings and statistics over HTTP")]
#[command(long_about = r#"
Roster manages students, groups, curricula and science areas, enabling:
  • Listing students filtered by group and/or science area
  • Per-group and per-science statistics
  • Creating and deleting student records over an HTTP API

Example usage:
  roster init --database roster.db
  roster serve --bind 127.0.0.1:8000
  roster students list --group 1
  roster students add --name "Ann Lee" --group 1 --curriculum 1 --science 10
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server URL used by client commands
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and load reference data from the config `[seed]` section
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Skip seeding reference data
        #[arg(long)]
        no_seed: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// Include raw store errors in 5xx responses
        #[arg(long)]
        expose_error_detail: bool,
    },

    /// Manage student records
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Show student counts per group and science area
    Stats,

    /// List groups
    Groups,

    /// List science areas
    Sciences,

    /// List curricula
    Curricula,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    /// List students, optionally filtered
    List {
        /// Only students of this group id
        #[arg(short, long)]
        group: Option<i64>,

        /// Only students of this science area id
        #[arg(long)]
        science: Option<i64>,

        /// Case-insensitive name search within the filtered list
        #[arg(long)]
        search: Option<String>,
    },

    /// Create a student
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        group: i64,

        #[arg(long)]
        curriculum: i64,

        #[arg(long)]
        science: i64,
    },

    /// Delete a student by id
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = match config::load_config(cli.config.as_deref())? {
        Some(settings) => settings,
        None => {
            if let Some(path) = cli.config.as_deref() {
                ui::warn(&format!("Config file {} not found, using defaults", path.display()));
            }
            RosterConfig::default()
        }
    };
    let server_url = cli
        .server
        .clone()
        .unwrap_or_else(|| settings.server_url().to_string());

    match cli.command {
        Commands::Init { database, no_seed } => {
            let mut store_config = settings.store_config().with_create_if_missing(true);
            if let Some(path) = database {
                store_config.path = path;
            }
            config::ensure_db_dir(&store_config.path)?;

            let path = store_config.path.clone();
            let gateway = StoreGateway::new(store_config);
            gateway.initialize_schema()?;
            ui::success(&format!("Schema ready in {}", path.display()));

            match settings.seed.as_ref() {
                Some(seed) if !no_seed && !seed.is_empty() => {
                    let written = gateway.seed(seed)?;
                    ui::info("Reference rows seeded", &written.to_string());
                }
                _ => tracing::debug!("No reference data to seed"),
            }
        }

        Commands::Serve {
            database,
            bind,
            expose_error_detail,
        } => {
            let overrides = RosterConfig {
                database: database.map(|p| p.to_string_lossy().into_owned()),
                bind,
                expose_error_detail: expose_error_detail.then_some(true),
                ..RosterConfig::default()
            };
            let effective = merge(&settings, overrides);

            let addr = effective.bind_addr()?;
            let service = RecordService::new(StoreGateway::new(effective.store_config()));

            ui::header(&format!("Roster API on http://{}", addr));
            ui::info("Database", &effective.database_path().display().to_string());
            roster::server::start_server(addr, service, effective.expose_error_detail()).await?;
        }

        Commands::Students { action } => {
            let client = RosterClient::new(server_url)?;
            match action {
                StudentAction::List {
                    group,
                    science,
                    search,
                } => {
                    let filter = StudentFilter { group_id: group, science_id: science };
                    let students = match search.as_deref() {
                        Some(text) => client.search_students(filter, text).await?,
                        None => client.list_students(filter).await?,
                    };

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&students)?);
                    } else if students.is_empty() {
                        println!("{} No students found.", Icons::CROSS);
                    } else {
                        println!("{}", ui::students_table(&students));
                        ui::info("Students", &students.len().to_string());
                    }
                }

                StudentAction::Add {
                    name,
                    group,
                    curriculum,
                    science,
                } => {
                    let id = client
                        .create_student(NewStudent::new(name, group, curriculum, science))
                        .await?;
                    if cli.json {
                        println!("{}", serde_json::json!({ "id": id }));
                    } else {
                        ui::success(&format!("{} Student created with id {}", Icons::PERSON, id));
                    }
                }

                StudentAction::Delete { id } => {
                    client.delete_student(id).await?;
                    if cli.json {
                        println!("{}", serde_json::json!({ "id": id, "deleted": true }));
                    } else {
                        ui::success(&format!("{} Student {} deleted", Icons::DEL, id));
                    }
                }
            }
        }

        Commands::Stats => {
            let client = RosterClient::new(server_url)?;
            let stats = client.statistics().await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let (by_group, by_science) = ui::stats_table(&stats);
                ui::header(&format!("{} Total students: {}", Icons::STATS, stats.total));
                ui::section("By group");
                println!("{}", by_group);
                ui::section("By science area");
                println!("{}", by_science);
            }
        }

        Commands::Groups => {
            let client = RosterClient::new(server_url)?;
            print_reference(&client.groups().await?, cli.json)?;
        }

        Commands::Sciences => {
            let client = RosterClient::new(server_url)?;
            print_reference(&client.sciences().await?, cli.json)?;
        }

        Commands::Curricula => {
            let client = RosterClient::new(server_url)?;
            print_reference(&client.curricula().await?, cli.json)?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                let path = cli.config.clone().unwrap_or_else(config::default_config_path);
                config::write_config(&path, &RosterConfig::starter(), force)?;
                ui::success(&format!("{} Config written to {}", Icons::DATABASE, path.display()));
            }
        },
    }

    Ok(())
}

fn print_reference(entries: &[RefEntry], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else if entries.is_empty() {
        println!("{} Nothing found.", Icons::CROSS);
    } else {
        println!("{}", ui::reference_table(entries));
    }
    Ok(())
}

/// Command-line values win over the config file
fn merge(file: &RosterConfig, cli: RosterConfig) -> RosterConfig {
    RosterConfig {
        database: cli.database.or_else(|| file.database.clone()),
        bind: cli.bind.or_else(|| file.bind.clone()),
        server_url: cli.server_url.or_else(|| file.server_url.clone()),
        busy_timeout_ms: cli.busy_timeout_ms.or(file.busy_timeout_ms),
        expose_error_detail: cli.expose_error_detail.or(file.expose_error_detail),
        seed: cli.seed.or_else(|| file.seed.clone()),
    }
}
