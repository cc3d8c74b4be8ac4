//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through the environment; a `.env`
//! file in the working directory is read first and never overrides
//! variables that are already set.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_PORT: u16 = 8089;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATABASE: &str = "share/collections.db";
pub const DEFAULT_CARDS_FILE: &str = "share/cards.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const DEFAULT_PACK_RATE_LIMIT: u32 = 20;
pub const DEFAULT_MAX_PACK_SIZE: usize = 100;

#[derive(Parser)]
#[command(name = "rocards-server")]
#[command(about = "HTTP API server for the rocards card collection game")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Start the API server
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Bind address
    #[arg(short, long, env = "SERVER_HOST", default_value = DEFAULT_HOST)]
    pub bind: String,

    /// Database URL (postgres://...) or SQLite path
    #[arg(short, long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Card catalog document (JSON array of cards)
    #[arg(short, long, env = "CARDS_FILE", default_value = DEFAULT_CARDS_FILE)]
    pub cards: PathBuf,

    /// Probability that a draw comes from the MVP pool
    #[arg(long, env = "RARE_RATE", default_value_t = rocards::DEFAULT_RARE_RATE)]
    pub rare_rate: f64,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Requests per minute per client IP (0 disables)
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: u32,

    /// Pack openings per minute per client IP (0 disables)
    #[arg(long, env = "PACK_RATE_LIMIT_PER_MINUTE", default_value_t = DEFAULT_PACK_RATE_LIMIT)]
    pub pack_rate_limit: u32,

    /// Largest pack a client may request
    #[arg(long, env = "MAX_PACK_SIZE", default_value_t = DEFAULT_MAX_PACK_SIZE)]
    pub max_pack_size: usize,
}

/// Resolved server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub database: String,
    pub cards: PathBuf,
    pub rare_rate: f64,
    pub request_timeout: Duration,
    pub rate_limit: u32,
    pub pack_rate_limit: u32,
    pub max_pack_size: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            cards: PathBuf::from(DEFAULT_CARDS_FILE),
            rare_rate: rocards::DEFAULT_RARE_RATE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rate_limit: DEFAULT_RATE_LIMIT,
            pack_rate_limit: DEFAULT_PACK_RATE_LIMIT,
            max_pack_size: DEFAULT_MAX_PACK_SIZE,
        }
    }
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind: args.bind,
            port: args.port,
            database: args.database,
            cards: args.cards,
            rare_rate: args.rare_rate,
            request_timeout: Duration::from_secs(args.timeout),
            rate_limit: args.rate_limit,
            pack_rate_limit: args.pack_rate_limit,
            max_pack_size: args.max_pack_size,
        }
    }
}

/// Load `.env` from the working directory if present.
///
/// Returns the path that was loaded so it can be logged once tracing is up.
pub fn load_dotenv() -> anyhow::Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context("load .env")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["rocards-server", "serve"]).unwrap();
        let Command::Serve(args) = cli.command;
        let config = ServerConfig::from(args);

        // Environment may override these in CI; only check what has no env var set
        if std::env::var_os("PORT").is_none() {
            assert_eq!(config.port, DEFAULT_PORT);
        }
        if std::env::var_os("MAX_PACK_SIZE").is_none() {
            assert_eq!(config.max_pack_size, DEFAULT_MAX_PACK_SIZE);
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "rocards-server",
            "serve",
            "--port",
            "9000",
            "--bind",
            "127.0.0.1",
            "--rare-rate",
            "0.5",
            "--timeout",
            "5",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command;
        let config = ServerConfig::from(args);

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.rare_rate, 0.5);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
