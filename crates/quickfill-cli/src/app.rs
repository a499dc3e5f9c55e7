//! Application state management.

use quickfill_backend_redis::RedisStore;
use quickfill_core::{Config, KeySpace};
use std::time::Duration;
use tracing::info;

/// Shared state for one command invocation.
///
/// The Redis connection lives as long as the `App` and is closed when it is
/// dropped, on success and error paths alike.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Key layout
    pub keys: KeySpace,

    /// Connected store
    pub store: RedisStore,
}

impl App {
    /// Connect to the store. `url` overrides the configured URL.
    pub fn new(config: Config, url: Option<String>) -> anyhow::Result<Self> {
        let url = store_url(&config, url);
        let timeout = Duration::from_secs(config.store.connect_timeout_secs);
        let store = RedisStore::connect(&url, timeout)?;
        let keys = config.store.key_space();

        info!(
            url = %store.url(),
            namespace = %keys.namespace(),
            "Application initialized"
        );

        Ok(App {
            config,
            keys,
            store,
        })
    }
}

/// Pick the store URL: flag or environment first, then the config file.
fn store_url(config: &Config, url: Option<String>) -> String {
    url.filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| config.store.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_url_precedence() {
        let mut config = Config::default();
        assert_eq!(store_url(&config, None), "redis://127.0.0.1:6379/0");

        config.store.url = "redis://configured:6379/0".to_string();
        assert_eq!(store_url(&config, None), "redis://configured:6379/0");
        assert_eq!(
            store_url(&config, Some("redis://flag:6379/0".to_string())),
            "redis://flag:6379/0"
        );
        assert_eq!(
            store_url(&config, Some("  ".to_string())),
            "redis://configured:6379/0"
        );
    }
}
