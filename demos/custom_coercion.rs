//! Custom coercion functions and settable types

use anyhow::Context;
use fromenv::{settable, FromEnv, Options, Set};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default)]
enum Level {
    #[default]
    Info,
    Debug,
}

impl Set for Level {
    fn set(&mut self, raw: &str) -> anyhow::Result<()> {
        *self = match raw.to_ascii_lowercase().as_str() {
            "info" => Self::Info,
            "debug" => Self::Debug,
            other => anyhow::bail!("unknown level {other}"),
        };
        Ok(())
    }
}

settable!(Level);

#[derive(Debug, Default, Deserialize)]
struct Retry {
    attempts: u32,
    backoff_ms: u64,
}

fromenv::opaque!(Retry);

#[derive(Debug, Default, FromEnv)]
struct Config {
    // Uses Level's Set impl
    #[env("LOG_LEVEL=info")]
    pub level: Level,

    // Duration has no parser of its own
    #[env("TIMEOUT=30")]
    pub timeout: Duration,

    // JSON encoded values
    #[env(r#"TAGS=["web", "edge"]"#)]
    pub tags: Vec<String>,

    #[env("RETRY")]
    pub retry: Option<Retry>,
}

fn seconds(target: &mut Duration, raw: &str) -> anyhow::Result<()> {
    let secs: u64 = raw.parse().context("timeout must be a number of seconds")?;
    *target = Duration::from_secs(secs);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut config = Config::default();
    Options::new()
        .map([
            ("LOG_LEVEL", "DEBUG"),
            ("RETRY", r#"{"attempts": 3, "backoff_ms": 200}"#),
        ])
        .set_func(seconds)
        .set_func(fromenv::json::<Vec<String>>)
        .set_func(fromenv::json::<Retry>)
        .unmarshal(&mut config)?;

    println!("{config:#?}");
    if let Some(retry) = &config.retry {
        println!(
            "retrying {} times, {}ms apart",
            retry.attempts, retry.backoff_ms
        );
    }

    Ok(())
}
