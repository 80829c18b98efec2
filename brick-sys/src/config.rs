// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::claim::ClaimWalk;
use crate::error::{BrickError, Result};

pub const CONFIG_ENV: &str = "BRICK_CHECK_CONFIG";
pub const SYSTEM_CONFIG_PATH: &str = "/etc/brick-check/config.toml";

/// Mode requested for newly created brick directories (before umask).
pub const DEFAULT_DIR_MODE: u32 = 0o777;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrickConfig {
    pub claim_walk: ClaimWalk,
    pub require_local_host: bool,
    pub dir_mode: u32,
}

impl Default for BrickConfig {
    fn default() -> Self {
        Self {
            claim_walk: ClaimWalk::default(),
            require_local_host: false,
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

impl BrickConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|error| BrickError::Config {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, origin: &Path) -> Result<Self> {
        let config: BrickConfig = toml::from_str(raw).map_err(|error| BrickError::Config {
            path: origin.to_path_buf(),
            reason: error.to_string(),
        })?;

        if config.dir_mode & !0o7777 != 0 {
            return Err(BrickError::Config {
                path: origin.to_path_buf(),
                reason: format!("dir_mode {:#o} has bits outside 0o7777", config.dir_mode),
            });
        }

        Ok(config)
    }

    /// Resolve the config file to use when none was given explicitly.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(value) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(value));
        }

        let system = Path::new(SYSTEM_CONFIG_PATH);
        system.exists().then(|| system.to_path_buf())
    }

    /// Load `explicit`, else the default location, else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => {
                tracing::debug!("Loading brick config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
