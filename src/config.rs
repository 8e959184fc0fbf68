use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "JSONPlaceholder-style CRUD REST API")]
pub struct Args {
    /// Host to bind to (overrides PLACEHOLDER_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PLACEHOLDER_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PLACEHOLDER_API_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Apply migrations, insert demo users/posts, and exit
    #[arg(long)]
    pub seed: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the
    /// one-shot maintenance flags.
    pub fn from_env_and_args() -> Result<(Self, Args)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PLACEHOLDER_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PLACEHOLDER_API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PLACEHOLDER_API_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PLACEHOLDER_API_PORT"),
        };
        let env_db = env::var("PLACEHOLDER_API_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/placeholder_api.db".into());

        // Dev fallback only; set JWT_SECRET in any real deployment.
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "super-secret-jwt-token-with-at-least-32-characters".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.clone().unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.clone().unwrap_or(env_db),
            jwt_secret,
        };

        Ok((cfg, args))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
