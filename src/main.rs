use anyhow::Result;
use std::{fs, io::ErrorKind, path::Path};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use placeholder_api::{config::AppConfig, db, routes::routes::routes, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + maintenance flags ---
    let (cfg, args) = AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting placeholder-api on {} (database: {})",
        cfg.addr(),
        cfg.database_url
    );

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize SQLite connection ---
    let pool = db::connect(&cfg.database_url).await?;

    // --- Handle one-shot maintenance modes ---
    if args.migrate {
        db::apply_migrations(&pool).await?;
        tracing::info!("Database migration complete.");
        return Ok(());
    }
    if args.seed {
        db::apply_migrations(&pool).await?;
        db::seed_demo_data(pool).await?;
        tracing::info!("Demo data seeded.");
        return Ok(());
    }

    // --- Build router ---
    let state = AppState::new(pool, cfg.jwt_secret.clone());
    let app = routes(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
