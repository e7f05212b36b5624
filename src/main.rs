use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use vaxtrack::config;
use vaxtrack::core_state::{CoreError, CoreState};

#[derive(Parser)]
#[command(name = "vaxtrack")]
#[command(version)]
#[command(about = "Family vaccination schedules, records and clinic search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data directory (overrides VAXTRACK_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Listen address (overrides VAXTRACK_BIND)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Write all members, schedules and records to a JSON file
    Export {
        /// Output file
        file: PathBuf,
    },

    /// Merge a JSON snapshot into the database
    Import {
        /// Snapshot file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    vaxtrack::init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("vaxtrack: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CoreError> {
    let db_path = match cli.data_dir {
        Some(dir) => dir.join(config::DB_FILE_NAME),
        None => config::db_path(),
    };
    let core = Arc::new(CoreState::from_config(db_path)?);
    core.initialize()?;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(config::bind_addr);
            tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(vaxtrack::api::serve(Arc::clone(&core), addr, shutdown_signal()))?;
        }
        Commands::Export { file } => {
            let snapshot = core.export_snapshot_to(&file)?;
            println!(
                "Exported {} members to {}",
                snapshot.members.len(),
                file.display()
            );
        }
        Commands::Import { file } => {
            let summary = core.import_snapshot_from(&file)?;
            println!(
                "Imported {} members, {} schedule entries, {} records ({} already present)",
                summary.members,
                summary.schedule_entries_added,
                summary.records_added,
                summary.records_skipped
            );
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, shutting down");
}
