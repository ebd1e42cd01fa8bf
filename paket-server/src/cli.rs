use std::path::PathBuf;

use clap::Parser;
use paket_core::config::{
    DEFAULT_DB, DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_PORT, DEFAULT_TTL_DAYS,
};
use paket_core::FeedConfig;
use url::Url;

/// A hundred years.
const MAX_TTL_DAYS: u32 = 36_500;

/// Paket: read before it goes away
#[derive(Debug, Clone, Parser)]
#[command(name = "paket")]
pub struct Args {
    /// feed name
    #[arg(short = 'n', long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// feed description
    #[arg(short = 'd', long, default_value = DEFAULT_DESCRIPTION)]
    pub desc: String,

    /// feed HTTP url
    #[arg(short = 'l', long, value_parser = parse_http_url)]
    pub link: String,

    /// database file
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    /// server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// time to live in days
    #[arg(long, default_value_t = DEFAULT_TTL_DAYS, value_parser = clap::value_parser!(u32).range(1..=MAX_TTL_DAYS as i64))]
    pub ttl: u32,
}

impl Args {
    pub fn into_config(self) -> FeedConfig {
        FeedConfig {
            name: self.name,
            description: self.desc,
            link: self.link,
            db: self.db,
            port: self.port,
            ttl_days: self.ttl,
        }
    }
}

fn parse_http_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw).map_err(|_| String::from("invalid link"))?;
    match url.scheme() {
        "http" | "https" => Ok(url.into()),
        _ => Err(String::from("invalid link")),
    }
}
