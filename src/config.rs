use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const USER_CONFIG_PATH: &str = ".config/buildexit.toml";
const LOCAL_CONFIG_NAME: &str = ".buildexit.toml";

/// Known top-level config keys
const KNOWN_KEYS: &[&str] = &["counterpart_header", "trap_signals"];

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Header holding the launcher's copy of the exit status table.
    pub counterpart_header: Option<String>,
    /// Whether SIGINT/SIGTERM/SIGHUP go through the terminator (default: true)
    pub trap_signals: Option<bool>,
}

impl Config {
    /// Load config with hierarchy: user -> current directory.
    ///
    /// Order (later overrides earlier):
    /// 1. User config (~/.config/buildexit.toml)
    /// 2. Current directory config (.buildexit.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::load_user()?;

        if let Ok(cwd) = std::env::current_dir() {
            let local_config = Self::load_local(&cwd)?;
            config = config.merge(local_config);
        }

        Ok(config)
    }

    /// Load config exclusively from a specific file (ignores default locations).
    /// Unlike load_from_path, this returns an error if the file doesn't exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        Self::load_from_path(path)
    }

    /// Load user config from ~/.config/buildexit.toml.
    /// Without a HOME there is no user config.
    fn load_user() -> Result<Self> {
        match std::env::var_os("HOME") {
            Some(home) => Self::load_from_path(&PathBuf::from(home).join(USER_CONFIG_PATH)),
            None => {
                debug!("HOME not set, skipping user config");
                Ok(Config::default())
            }
        }
    }

    /// Load local config from path/.buildexit.toml (returns default if not exists)
    fn load_local(path: &Path) -> Result<Self> {
        let config_path = path.join(LOCAL_CONFIG_NAME);
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path (returns default if not exists)
    fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(config_path).map_err(|source| Error::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        debug!(file = %config_path.display(), "Loading config");

        Self::parse(&contents, config_path)
    }

    fn parse(contents: &str, config_path: &Path) -> Result<Self> {
        // First parse as generic TOML to check for unknown keys
        if let Ok(value) = contents.parse::<toml::Table>() {
            let known: HashSet<&str> = KNOWN_KEYS.iter().copied().collect();
            for key in value.keys() {
                if !known.contains(key.as_str()) {
                    warn!(
                        file = %config_path.display(),
                        key = %key,
                        "Unknown config key (ignored)"
                    );
                }
            }
        }

        toml::from_str(contents).map_err(|e| Error::ConfigParse {
            path: config_path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Merge another config into this one (other takes precedence for set values).
    fn merge(self, other: Self) -> Self {
        Config {
            counterpart_header: other.counterpart_header.or(self.counterpart_header),
            trap_signals: other.trap_signals.or(self.trap_signals),
        }
    }

    /// Whether to install termination signal handlers (default: true)
    pub fn trap_signals(&self) -> bool {
        self.trap_signals.unwrap_or(true)
    }

    /// Get the counterpart header path, expanding ~ to $HOME.
    /// Relative paths are relative to the current directory.
    pub fn counterpart_header(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.counterpart_header.as_deref() else {
            return Ok(None);
        };

        if path == "~" || path.starts_with("~/") {
            let home = std::env::var("HOME").map_err(|_| Error::MissingEnv("HOME"))?;
            let expanded = match path.strip_prefix("~/") {
                Some(suffix) => PathBuf::from(home).join(suffix),
                None => PathBuf::from(home),
            };
            return Ok(Some(expanded));
        }

        Ok(Some(PathBuf::from(path)))
    }
}
