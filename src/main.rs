use mimalloc::MiMalloc;
use portfolio_backend::config::Config;
use portfolio_backend::db::PortfolioStore;
use portfolio_backend::service::uploads::UploadStore;
use portfolio_backend::{PortfolioState, portfolio_router};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.listen_addr,
        database_url = %cfg.database_url,
        upload_dir = %cfg.upload_dir.display(),
        upload_prefix = %cfg.upload_prefix,
        loglevel = %cfg.loglevel
    );

    let uploads = UploadStore::new(&cfg.upload_dir, &cfg.upload_prefix);
    uploads.ensure_dir().await?;

    // A failed connection leaves the service up; every query then fails with 500.
    let store = match PortfolioStore::connect(&cfg.database_url).await {
        Ok(store) => {
            info!("Connected to database");
            store
        }
        Err(e) => {
            error!(
                database_url = %cfg.database_url,
                error = %e,
                "Error connecting to database; make sure the database exists and the connection details are correct"
            );
            PortfolioStore::disconnected()
        }
    };

    if cfg.init_schema && store.is_connected() {
        match store.init_schema().await {
            Ok(()) => info!("database schema initialized"),
            Err(e) => warn!(error = %e, "failed to initialize database schema"),
        }
    }

    let state = PortfolioState::new(store, uploads, cfg.max_upload_bytes);
    let app = portfolio_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Server running on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
