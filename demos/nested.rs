//! Nested, boxed and optional structs

use fromenv::{FromEnv, Options, Url};

#[derive(Debug, Default, FromEnv)]
#[env(prefix = "DB_")]
struct Database {
    #[env("URL=postgres://localhost/app")]
    pub url: Url,

    #[env("POOL=4")]
    pub pool: u32,
}

#[derive(Debug, Default, FromEnv)]
struct Tls {
    #[env("TLS_CERT=/etc/app/cert.pem")]
    pub cert: std::path::PathBuf,
}

#[derive(Debug, Default, FromEnv)]
struct Config {
    #[env("PORT=8080")]
    pub port: u16,

    // Walked like an inline struct
    pub database: Box<Database>,

    // Only walked when allocated by the caller
    pub tls: Option<Tls>,

    // Allocated when READ_TIMEOUT_MS resolves
    #[env("READ_TIMEOUT_MS")]
    pub read_timeout_ms: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let options = Options::new().map([("DB_POOL", "16"), ("READ_TIMEOUT_MS", "2500")]);

    let mut plain = Config::default();
    options.unmarshal(&mut plain)?;
    println!("Without TLS: {plain:#?}");

    let mut secured = Config {
        tls: Some(Tls::default()),
        ..Default::default()
    };
    options.unmarshal(&mut secured)?;
    println!("With TLS: {secured:#?}");

    Ok(())
}
