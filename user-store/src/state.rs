//! Application state management

use std::sync::Arc;

use crate::{config::Config, store::UserStore};

/// Application state shared across handlers
///
/// Cloning is cheap: both the configuration and the store sit behind `Arc`s,
/// so every clone points at the same records.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    users: Arc<UserStore>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    /// Create state with a store built from `config.store`
    pub fn new(config: Config) -> Self {
        let users = UserStore::from_config(&config.store);
        Self::with_store(config, users)
    }

    /// Create state around an existing store
    pub fn with_store(config: Config, users: UserStore) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(users),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the user store
    pub fn users(&self) -> &UserStore {
        &self.users
    }
}
