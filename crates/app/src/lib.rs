//! `storefront-app` — composition root for the storefront cart.

pub mod app;
pub mod config;

pub use app::Storefront;
pub use config::AppConfig;

/// Initialize logging, read configuration from the environment, and boot.
pub fn start() -> Storefront {
    storefront_observability::init();
    let config = AppConfig::from_env();
    Storefront::bootstrap(&config)
}
