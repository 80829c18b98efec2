// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBrickSpecError {
    #[error("invalid brick '{0}', expected the form host:path")]
    MissingSeparator(String),
    #[error("brick '{0}' has an empty host")]
    EmptyHost(String),
    #[error("brick '{0}' has an empty path")]
    EmptyPath(String),
}

/// A brick as named by an operator: the host that owns it and the directory
/// on that host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrickSpec {
    pub host: String,
    pub path: PathBuf,
}

impl BrickSpec {
    pub fn new(host: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for BrickSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.path.display())
    }
}

impl std::str::FromStr for BrickSpec {
    type Err = ParseBrickSpecError;

    /// Splits on the last `:` so IPv6 literals such as `[::1]:/bricks/b1`
    /// keep their colons in the host part.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, path) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseBrickSpecError::MissingSeparator(s.to_string()))?;

        if host.is_empty() {
            return Err(ParseBrickSpecError::EmptyHost(s.to_string()));
        }
        if path.is_empty() {
            return Err(ParseBrickSpecError::EmptyPath(s.to_string()));
        }

        Ok(Self::new(host, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_host_and_path() {
        let spec: BrickSpec = "server1:/bricks/b1".parse().unwrap();
        assert_eq!(spec.host, "server1");
        assert_eq!(spec.path, PathBuf::from("/bricks/b1"));
        assert_eq!(spec.to_string(), "server1:/bricks/b1");
    }

    #[test]
    fn splits_on_last_colon() {
        let spec: BrickSpec = "fe80::1:/data/brick".parse().unwrap();
        assert_eq!(spec.host, "fe80::1");
        assert_eq!(spec.path, PathBuf::from("/data/brick"));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(
            "/bricks/b1".parse::<BrickSpec>(),
            Err(ParseBrickSpecError::MissingSeparator("/bricks/b1".into()))
        );
        assert_eq!(
            ":/bricks/b1".parse::<BrickSpec>(),
            Err(ParseBrickSpecError::EmptyHost(":/bricks/b1".into()))
        );
        assert_eq!(
            "server1:".parse::<BrickSpec>(),
            Err(ParseBrickSpecError::EmptyPath("server1:".into()))
        );
    }
}
