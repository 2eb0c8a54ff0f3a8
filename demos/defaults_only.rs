//! Applying annotation defaults without reading the environment

use fromenv::{FromEnv, Options};

#[derive(Debug, Default, FromEnv)]
struct Config {
    #[env("APP_NAME=demo")]
    pub name: String,

    #[env("APP_WORKERS=4")]
    pub workers: usize,

    // No default, so never set in this mode
    #[env("APP_SECRET")]
    pub secret: Option<String>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("APP_WORKERS", "64");
    std::env::set_var("APP_SECRET", "ignored");

    let mut config = Config::default();
    Options::new().defaults_only().unmarshal(&mut config)?;

    println!("Defaults: {config:#?}");
    assert_eq!(config.workers, 4);
    assert!(config.secret.is_none());

    Ok(())
}
