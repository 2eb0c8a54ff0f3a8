//! Basic usage example

use fromenv::FromEnv;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Default, FromEnv)]
struct Config {
    // Left untouched unless DATABASE_URL is set
    #[env("DATABASE_URL")]
    pub database_url: String,

    // With default value
    #[env("SERVER_ADDR=127.0.0.1:8080")]
    pub server_addr: String,

    // Numeric type, hex and octal literals are accepted too
    #[env("MAX_CONNECTIONS=10")]
    pub max_connections: u32,

    // Boolean type
    #[env("DEBUG_MODE=false")]
    pub debug_mode: bool,
}

fn init_log() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("FROMENV_LOG")
                .from_env_lossy(),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_log();

    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");

    // Load configuration
    let mut config = Config::default();
    fromenv::unmarshal(&mut config)?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.max_connections);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}
