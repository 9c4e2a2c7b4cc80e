use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::Session;

/// Install the fmt subscriber; `RUST_LOG` overrides the default `info` filter.
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Initialise logging, load configuration and start a session.
/// Must be called within a tokio runtime.
pub fn run(config_file: Option<&Path>) -> Result<Session> {
    init_tracing();

    let mut service = ConfigService::new();
    if let Some(path) = config_file {
        service = service.with_file(path);
    }
    let config = service.load()?;

    Session::new(&config)
}
