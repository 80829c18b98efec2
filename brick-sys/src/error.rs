// SPDX-License-Identifier: GPL-3.0-only

use std::ffi::OsString;
use std::path::PathBuf;

use brick_types::BrickErrorKind;
use thiserror::Error;

/// Error types for brick path validation
#[derive(Error, Debug)]
pub enum BrickError {
    #[error("I/O error on {host}:{}: {source}", .path.display())]
    Io {
        host: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device id not found for {}", .path.display())]
    DeviceIdNotFound { path: PathBuf },

    #[error("brick path {host}:{} which is already present is not a directory", .path.display())]
    NotDirectory { host: String, path: PathBuf },

    #[error("brick {host}:{} is a mount point", .path.display())]
    IsMountPoint { host: String, path: PathBuf },

    #[error("brick {host}:{} is under the root partition", .path.display())]
    UnderRootPartition { host: String, path: PathBuf },

    #[error("brick path {host}:{} is already in use", .path.display())]
    AlreadyInUse { host: String, path: PathBuf },

    #[error("brick path {} is too long ({len} bytes)", .path.display())]
    PathTooLong { path: PathBuf, len: usize },

    #[error("sub directory {} is too long ({len} bytes)", .segment.to_string_lossy())]
    SubdirTooLong { segment: OsString, len: usize },

    #[error("host {host} does not resolve to a local address")]
    NotLocalHost { host: String },

    #[error("failed to resolve host {host}: {source}")]
    HostResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl BrickError {
    pub(crate) fn io(host: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BrickError::Io {
            host: host.to_string(),
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> BrickErrorKind {
        match self {
            BrickError::Io { .. } => BrickErrorKind::IoFailure,
            BrickError::DeviceIdNotFound { .. } => BrickErrorKind::DeviceIdNotFound,
            BrickError::NotDirectory { .. } => BrickErrorKind::BrickNotDirectory,
            BrickError::IsMountPoint { .. } => BrickErrorKind::BrickIsMountPoint,
            BrickError::UnderRootPartition { .. } => BrickErrorKind::BrickUnderRootPartition,
            BrickError::AlreadyInUse { .. } => BrickErrorKind::BrickPathAlreadyInUse,
            BrickError::PathTooLong { .. } => BrickErrorKind::PathTooLong,
            BrickError::SubdirTooLong { .. } => BrickErrorKind::SubdirTooLong,
            BrickError::NotLocalHost { .. } => BrickErrorKind::NotLocalHost,
            BrickError::HostResolution { .. } => BrickErrorKind::HostResolution,
            BrickError::Config { .. } => BrickErrorKind::Config,
        }
    }

    pub fn is_forceable(&self) -> bool {
        self.kind().is_forceable()
    }
}

/// Result type alias for brick validation
pub type Result<T> = std::result::Result<T, BrickError>;
