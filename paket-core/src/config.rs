use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_NAME: &str = "My Paket";
pub const DEFAULT_DESCRIPTION: &str = "My links";
pub const DEFAULT_DB: &str = "paket.json";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TTL_DAYS: u32 = 60;

/// Process-wide feed settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub name: String,
    pub description: String,
    /// Public base URL of the feed.
    pub link: String,
    pub db: PathBuf,
    pub port: u16,
    pub ttl_days: u32,
}

impl FeedConfig {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            link: link.into(),
            db: PathBuf::from(DEFAULT_DB),
            port: DEFAULT_PORT,
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }

    /// TTL as whole 24 hour windows counted from the save time.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.ttl_days))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpiryConfig {
    pub interval: Duration,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}
