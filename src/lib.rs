pub mod api;
pub mod clinics;
pub mod config;
pub mod core_state;
pub mod db;
pub mod error;
pub mod family;
pub mod home;
pub mod knowledge;
pub mod models;
pub mod schedule;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
