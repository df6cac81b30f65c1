//! Application context providing dependency injection root.

use std::sync::Arc;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::repositories::{AppStore, GraphStore};

/// Shared configuration handle.
pub type AppConfig = Arc<Config>;

/// Root application context.
///
/// `#[derive(Context)]` generates a `FromRef` implementation for each field,
/// so services resolve their handles at compile time.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Graph store shared by every pipeline run.
    pub store: AppStore,
    /// Application configuration.
    pub config: AppConfig,
}

impl Context {
    pub fn new(store: impl GraphStore + 'static, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Builds a context around an already shared store.
    pub fn with_store(store: AppStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
