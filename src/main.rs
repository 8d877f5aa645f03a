use std::path::PathBuf;

use clap::Parser;
use secrecy::SecretString;

use atelier_auth::SessionManager;
use atelier_server::ServerConfig;
use atelier_store::Database;

#[derive(Parser)]
#[command(name = "atelier", about = "Atelier authentication & reconciliation server")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 4680)]
    port: u16,

    /// SQLite database path. Defaults to ~/.atelier/atelier.db.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Signing secret for session tokens.
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: String,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Starting Atelier server");

    let db_path = args
        .db_path
        .unwrap_or_else(|| dirs_home().join(".atelier").join("atelier.db"));
    let db = Database::open(&db_path).expect("Failed to open database");

    // The Secure cookie attribute follows the deployment environment.
    let production = std::env::var("ATELIER_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);
    let secret = SecretString::from(args.session_secret);
    let sessions = SessionManager::new(&secret, production);

    let config = ServerConfig { port: args.port };
    let handle = atelier_server::start(config, db, sessions)
        .await
        .expect("Failed to start server");

    tracing::info!(port = handle.port, production, "Atelier server ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
