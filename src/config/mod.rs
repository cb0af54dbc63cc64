//! Configuration for the treeaccess editor.
//!
//! Settings live in `~/.config/treeaccess/config.toml`. Every field has a
//! default, so a partial file (or no file at all) is fine.
//!
//! # Example
//!
//! ```
//! use treeaccess::config::Config;
//!
//! let config = Config::default();
//! assert!(config.keep_root_expanded);
//! assert_eq!(config.indent_size, 2);
//!
//! let custom: Config = toml::from_str("indent_size = 4").unwrap();
//! assert_eq!(custom.indent_size, 4);
//! assert!(custom.expand_on_load);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::editor::accessor::cache::TreeSettings;

/// Editor settings.
///
/// * `expand_on_load` - Start with every node expanded (default: true)
/// * `keep_root_expanded` - Collapse-all on the root keeps the root open (default: true)
/// * `sync_clipboard` - Copy to the system clipboard instead of memory (default: true)
/// * `enable_mouse` - Forward mouse clicks to the tree (default: true)
/// * `show_guides` - Draw connector lines between siblings (default: true)
/// * `indent_size` - Columns per depth level (default: 2)
/// * `message_timeout_ms` - Status message lifetime (default: 2000)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_true")]
    pub expand_on_load: bool,

    #[serde(default = "default_true")]
    pub keep_root_expanded: bool,

    #[serde(default = "default_true")]
    pub sync_clipboard: bool,

    #[serde(default = "default_true")]
    pub enable_mouse: bool,

    #[serde(default = "default_true")]
    pub show_guides: bool,

    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_indent_size() -> usize {
    2
}

fn default_message_timeout_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expand_on_load: true,
            keep_root_expanded: true,
            sync_clipboard: true,
            enable_mouse: true,
            show_guides: true,
            indent_size: default_indent_size(),
            message_timeout_ms: default_message_timeout_ms(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/treeaccess/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("treeaccess");
            path.push("config.toml");
            path
        })
    }

    /// Loads the configuration from the default location, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads the configuration from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&path)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            keep_root_expanded: self.keep_root_expanded,
        }
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }
}
