use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinyblog::auth::session;
use tinyblog::config::{Cli, Command, Config};
use tinyblog::db::{self, Store};
use tinyblog::routes;
use tinyblog::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let db_path = config.db_path();
    tracing::info!("Database: {}", db_path.display());
    let store = Store::open(
        &db_path,
        Duration::from_millis(config.database.connect_timeout_ms),
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            db::init_db(&store)?;
            tracing::info!("Initialized the database");
            Ok(())
        }
        Command::Serve => serve(store, config).await,
    }
}

async fn serve(store: Store, config: Config) -> anyhow::Result<()> {
    // An unreachable store is not fatal: pages show the connection error
    // until it comes back.
    if let Err(e) = db::run_migrations(&store) {
        tracing::warn!("Could not run migrations, continuing without: {}", e);
    }

    let state = AppState {
        store,
        cookie_key: session::signing_key(config.auth.secret_key.as_deref()),
        config: config.clone(),
    };

    let app = routes::app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
