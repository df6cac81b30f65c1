//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/contentgraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.contentgraph.toml`
//! 3. Environment variables: `CONTENTGRAPH_*`, with `__` separating sections
//!    (`CONTENTGRAPH_PIPELINE__MAX_STATEMENT_DEPTH=16`)
//!
//! Every key has a default, so an empty configuration is valid:
//!
//! ```toml
//! [pipeline]
//! temp_id_prefix = "#"
//! temp_id_min_length = 2
//! max_statement_depth = 32
//!
//! [labels]
//! max_length = 8164
//!
//! [storage]
//! snapshot = "graph.json"
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Placeholder syntax and statement tree limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Prefix every temp id must start with.
    pub temp_id_prefix: String,
    /// Minimum temp id length, prefix included.
    pub temp_id_min_length: usize,
    /// Deepest nesting accepted in a contribution statement tree.
    pub max_statement_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temp_id_prefix: "#".to_string(),
            temp_id_min_length: 2,
            max_statement_depth: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Longest label, in characters, accepted for any new thing.
    pub max_length: usize,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { max_length: 8164 }
    }
}

/// In-memory store persistence used by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Graph snapshot loaded when `--graph` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::user_config_path(), Path::new(".contentgraph.toml"))
    }

    /// Load config from explicit user and project files, plus the environment.
    pub fn load_from(user_config: impl AsRef<Path>, project_config: &Path) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Config::default()))
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config.as_ref()))
            // Layer 2: Project config
            .merge(Toml::file(project_config))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("CONTENTGRAPH_").split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/contentgraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("contentgraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("contentgraph").join("config.toml"))
            .unwrap_or_default()
    }
}
