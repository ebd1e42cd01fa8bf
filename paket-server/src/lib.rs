pub mod cli;
pub mod gateway;

use tracing_subscriber::EnvFilter;

pub use gateway::{router, AppState};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
