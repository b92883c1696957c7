//! Configuration for the header watcher.
//!
//! Layered configuration:
//! - Default values
//! - TOML configuration file (`.headwatch/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the binary)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `HEADWATCH_` and use double
//! underscores to separate nested levels:
//! - `HEADWATCH_MANIFEST=.projectrules` sets `manifest`
//! - `HEADWATCH_DEBOUNCE__REWRITE_MS=2000` sets `debounce.rewrite_ms`
//! - `HEADWATCH_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WATCHLIST: &str = "watchlist";
pub const DEFAULT_MANIFEST: &str = ".cursorrules";
pub const MIN_REWRITE_MS: u64 = 1000;
pub const MIN_EVENT_MS: u64 = 100;

const CONFIG_DIR: &str = ".headwatch";
const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "HEADWATCH_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Project root; the current directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Name of the watchlist file at the project root
    #[serde(default = "default_watchlist")]
    pub watchlist: String,

    /// Name of the manifest file at the project root
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default)]
    pub debounce: DebounceConfig,

    #[serde(default)]
    pub tree: TreeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DebounceConfig {
    /// Minimum interval between header rewrites of one file
    #[serde(default = "default_rewrite_ms")]
    pub rewrite_ms: u64,

    /// Window for coalescing raw notifications for one path
    #[serde(default = "default_event_ms")]
    pub event_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TreeConfig {
    /// Entry names left out of the manifest tree
    #[serde(default = "default_tree_exclude")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `headwatch::watcher = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 { 1 }
fn default_watchlist() -> String { DEFAULT_WATCHLIST.to_string() }
fn default_manifest() -> String { DEFAULT_MANIFEST.to_string() }
fn default_rewrite_ms() -> u64 { MIN_REWRITE_MS }
fn default_event_ms() -> u64 { MIN_EVENT_MS }
fn default_log_level() -> String { "info".to_string() }
fn default_tree_exclude() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "__pycache__".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            root: None,
            watchlist: default_watchlist(),
            manifest: default_manifest(),
            debounce: DebounceConfig::default(),
            tree: TreeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            rewrite_ms: default_rewrite_ms(),
            event_ms: default_event_ms(),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            exclude: default_tree_exclude(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting levels; single underscores stay
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.headwatch/settings.toml` from the current directory upwards
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Location of the settings file for a project rooted at `root`
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// The configured root, or the current directory
    pub fn project_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Coarse rewrite window, raised to the 1s floor if configured lower
    pub fn rewrite_window(&self) -> Duration {
        Duration::from_millis(self.debounce.rewrite_ms.max(MIN_REWRITE_MS))
    }

    /// Fine event window, raised to the 100ms floor if configured lower
    pub fn event_window(&self) -> Duration {
        Duration::from_millis(self.debounce.event_ms.max(MIN_EVENT_MS))
    }

    /// Warn about values that will be clamped
    pub fn warn_clamped(&self) {
        if self.debounce.rewrite_ms < MIN_REWRITE_MS {
            tracing::warn!(
                "[config] debounce.rewrite_ms = {} is below {MIN_REWRITE_MS}; using {MIN_REWRITE_MS}",
                self.debounce.rewrite_ms
            );
        }
        if self.debounce.event_ms < MIN_EVENT_MS {
            tracing::warn!(
                "[config] debounce.event_ms = {} is below {MIN_EVENT_MS}; using {MIN_EVENT_MS}",
                self.debounce.event_ms
            );
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Write a default settings file under `root`
    pub fn init_config_file(root: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = Self::config_path(root);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
