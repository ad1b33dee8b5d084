//! Configuration for torrent-store.
//!
//! This module provides runtime configuration for the on-disk filesystem.
//! Use [`ConfigBuilder`] at application startup to choose where torrents are
//! stored and whether files are extended to their declared size on open.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Global configuration, initialized via [`ConfigBuilder::init`].
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Runtime configuration for torrent-store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory under which [`OsFsProvider`](crate::file::OsFsProvider)
    /// creates per-torrent directories.
    pub download_dir: PathBuf,
    /// Extend files to their declared length when opened.
    ///
    /// Keeps reads of not-yet-downloaded regions returning zeros instead of
    /// hitting end-of-file.
    pub preallocate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            preallocate: true,
        }
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    download_dir: Option<PathBuf>,
    preallocate: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the download directory.
    ///
    /// Default: the current directory.
    ///
    /// # Example
    ///
    /// ```
    /// use torrent_store::config::ConfigBuilder;
    ///
    /// ConfigBuilder::new()
    ///     .download_dir("/var/lib/torrents")
    ///     .init();
    /// ```
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Enable or disable preallocation. Default: enabled.
    pub fn preallocate(mut self, enabled: bool) -> Self {
        self.preallocate = Some(enabled);
        self
    }

    /// Build the configuration without installing it globally.
    pub fn build(self) -> Config {
        let default = Config::default();
        Config {
            download_dir: self.download_dir.unwrap_or(default.download_dir),
            preallocate: self.preallocate.unwrap_or(default.preallocate),
        }
    }

    /// Build and initialize the global configuration.
    ///
    /// This can only be called once. Subsequent calls are ignored.
    /// Returns `true` if configuration was set, `false` if already initialized.
    pub fn init(self) -> bool {
        CONFIG.set(self.build()).is_ok()
    }
}

/// Initialize torrent-store with default configuration.
///
/// This is equivalent to `ConfigBuilder::new().init()`.
pub fn init_default() -> bool {
    ConfigBuilder::new().init()
}

/// Get the current configuration, or default if not initialized.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}
