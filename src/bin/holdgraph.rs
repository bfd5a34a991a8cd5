//! Holdgraph CLI: edge annotation server for climbing routes.
//!
//! Usage:
//!   holdgraph serve --catalog path [--db path] [--bind addr] [--start-mode resume|zero]
//!   holdgraph export [--db path]
//!   holdgraph clear --catalog path --position N [--db path]

use clap::{Parser, Subcommand};
use holdgraph::config::{default_db_path, ServerConfig};
use holdgraph::{EdgeStore, OpenStore, SqliteEdgeStore, StartMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "holdgraph",
    version,
    about = "Annotate movement edges between climbing holds"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "HOLDGRAPH_LOG", default_value = "info,holdgraph=debug")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the annotation HTTP server
    Serve {
        /// Reference catalog (.json, .yaml or .yml)
        #[arg(long, env = "HOLDGRAPH_CATALOG")]
        catalog: PathBuf,
        /// Path to SQLite database file
        #[arg(long, env = "HOLDGRAPH_DB")]
        db: Option<PathBuf>,
        /// Address to listen on
        #[arg(long, env = "HOLDGRAPH_BIND", default_value = "127.0.0.1:5000")]
        bind: String,
        /// Where the cursor starts: resume from saved edges, or zero
        #[arg(long, env = "HOLDGRAPH_START_MODE", default_value = "resume")]
        start_mode: StartMode,
        /// SQLite busy timeout in milliseconds
        #[arg(long, env = "HOLDGRAPH_BUSY_TIMEOUT_MS", default_value_t = 5_000)]
        busy_timeout_ms: u64,
        /// Per-request storage timeout in milliseconds
        #[arg(long, env = "HOLDGRAPH_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
        request_timeout_ms: u64,
    },
    /// Print every stored (start, end) pair as JSON
    Export {
        /// Path to SQLite database file
        #[arg(long, env = "HOLDGRAPH_DB")]
        db: Option<PathBuf>,
    },
    /// Delete all edges saved for one climb
    Clear {
        /// Reference catalog used to validate the position
        #[arg(long, env = "HOLDGRAPH_CATALOG")]
        catalog: PathBuf,
        /// Climb position to clear
        #[arg(long, allow_negative_numbers = true)]
        position: i64,
        /// Path to SQLite database file
        #[arg(long, env = "HOLDGRAPH_DB")]
        db: Option<PathBuf>,
    },
}

/// Initialize logging on stderr so `export` output stays clean
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_export(db: Option<PathBuf>) -> i32 {
    let db_path = db.unwrap_or_else(default_db_path);
    let store = match SqliteEdgeStore::open(&db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to open database at {}: {}", db_path.display(), e);
            return 1;
        }
    };
    let pairs = match store.get_all() {
        Ok(pairs) => pairs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match serde_json::to_string(&serde_json::json!({ "edges": pairs })) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_clear(config: ServerConfig, position: i64) -> i32 {
    let annotator = match holdgraph::server::open_annotator(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match annotator.delete_edges_at(position) {
        Ok(removed) => {
            println!("Deleted {} edges for climb {}", removed, position);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let code = match cli.command {
        Commands::Serve {
            catalog,
            db,
            bind,
            start_mode,
            busy_timeout_ms,
            request_timeout_ms,
        } => {
            let config = ServerConfig {
                bind_address: bind,
                db_path: db.unwrap_or_else(default_db_path),
                start_mode,
                busy_timeout_ms,
                request_timeout_ms,
                log_level: cli.log_level,
                ..ServerConfig::new(catalog)
            };
            holdgraph::server::run_server(config)
        }
        Commands::Export { db } => cmd_export(db),
        Commands::Clear {
            catalog,
            position,
            db,
        } => {
            let config = ServerConfig {
                db_path: db.unwrap_or_else(default_db_path),
                // Clearing only touches saved rows; the cursor rule is irrelevant
                start_mode: StartMode::Zero,
                ..ServerConfig::new(catalog)
            };
            cmd_clear(config, position)
        }
    };
    std::process::exit(code);
}
