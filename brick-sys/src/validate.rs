// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end brick path validation.
//!
//! Validation runs in two phases, mirroring how a brick is prepared:
//!
//! 1. [`BrickPathValidator::validate`] makes sure the directory exists and
//!    sits on a sensible filesystem (not a mount point, not the root
//!    partition).
//! 2. [`BrickPathValidator::validate_xattr_support`] checks for xattr
//!    support, refuses paths already claimed by a volume, and writes the
//!    claim.
//!
//! Neither phase is atomic. A crash in between leaves a created but
//! unclaimed directory, which a second run accepts.

use std::io;
use std::path::{Path, PathBuf};

use brick_types::{BrickSpec, Outcome, ValidationReport, VolumeId};
use tracing::{debug, error, info};

use crate::claim::{self, ClaimWalk, TEST_XATTR, VOLUME_ID_XATTR};
use crate::config::{BrickConfig, DEFAULT_DIR_MODE};
use crate::device::device_id_of;
use crate::error::{BrickError, Result};
use crate::fs::{BrickFs, PosixFs};
use crate::net;
use crate::path_len::{validate_brick_path_length, validate_brick_subdir_length};
use crate::topology::{check_topology, TopologyViolation};

const ROOT: &str = "/";

pub struct BrickPathValidator<F: BrickFs = PosixFs> {
    fs: F,
    claim_walk: ClaimWalk,
    dir_mode: u32,
    require_local_host: bool,
}

impl BrickPathValidator<PosixFs> {
    pub fn new() -> Self {
        Self::with_fs(PosixFs)
    }

    pub fn from_config(config: &BrickConfig) -> Self {
        Self::with_fs(PosixFs).configure(config)
    }
}

impl Default for BrickPathValidator<PosixFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: BrickFs> BrickPathValidator<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            claim_walk: ClaimWalk::default(),
            dir_mode: DEFAULT_DIR_MODE,
            require_local_host: false,
        }
    }

    pub fn configure(mut self, config: &BrickConfig) -> Self {
        self.claim_walk = config.claim_walk;
        self.dir_mode = config.dir_mode;
        self.require_local_host = config.require_local_host;
        self
    }

    pub fn claim_walk(mut self, walk: ClaimWalk) -> Self {
        self.claim_walk = walk;
        self
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Create the brick directory if needed and check where it lives.
    ///
    /// Unless `force` is set, the brick must share a device with its parent
    /// and that device must not be the one backing `/`.
    pub fn validate(&self, path: &Path, host: &str, force: bool) -> Result<()> {
        let created = match self.fs.create_dir(path, self.dir_mode) {
            Ok(()) => {
                debug!(host, brick = %path.display(), "created brick directory");
                true
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => false,
            Err(err) => {
                error!(host, brick = %path.display(), error = %err, "Failed to create brick");
                return Err(BrickError::io(host, path, err));
            }
        };

        let brick_stat = self.fs.symlink_metadata(path).map_err(|err| {
            error!(host, brick = %path.display(), error = %err, "Failed to stat on brick path");
            BrickError::io(host, path, err)
        })?;

        if !created && !brick_stat.is_dir {
            error!(
                host,
                brick = %path.display(),
                "brick path which is already present is not a directory"
            );
            return Err(BrickError::NotDirectory {
                host: host.to_string(),
                path: path.to_path_buf(),
            });
        }

        let root = Path::new(ROOT);
        let root_stat = self.fs.symlink_metadata(root).map_err(|err| {
            error!(error = %err, "Failed to stat on /");
            BrickError::io(host, root, err)
        })?;

        let parent = parent_dir(path);
        let parent_stat = self.fs.symlink_metadata(&parent).map_err(|err| {
            error!(
                host,
                brick = %path.display(),
                parent = %parent.display(),
                error = %err,
                "Failed to stat on parent of the brick path"
            );
            BrickError::io(host, &parent, err)
        })?;

        if force {
            debug!(host, brick = %path.display(), "force set, skipping topology checks");
            return Ok(());
        }

        let parent_device = device_id_of(&parent_stat, &parent)?;
        let root_device = device_id_of(&root_stat, root)?;
        let brick_device = device_id_of(&brick_stat, path)?;

        check_topology(root_device, parent_device, brick_device).map_err(|violation| {
            let err = match violation {
                TopologyViolation::MountPoint => BrickError::IsMountPoint {
                    host: host.to_string(),
                    path: path.to_path_buf(),
                },
                TopologyViolation::UnderRootPartition => BrickError::UnderRootPartition {
                    host: host.to_string(),
                    path: path.to_path_buf(),
                },
            };
            error!(
                host,
                brick = %path.display(),
                brick_device = %brick_device,
                parent_device = %parent_device,
                root_device = %root_device,
                "{err}"
            );
            err
        })
    }

    /// Confirm xattr support and claim the brick for `volume_id`.
    ///
    /// Without `force`, a brick that already carries a gfid or volume-id
    /// attribute is refused. With `force`, any existing claim is overwritten.
    pub fn validate_xattr_support(
        &self,
        path: &Path,
        host: &str,
        volume_id: &VolumeId,
        force: bool,
    ) -> Result<()> {
        claim::check_xattr_support(&self.fs, path).map_err(|err| {
            error!(
                host,
                brick = %path.display(),
                xattr = TEST_XATTR,
                error = %err,
                "xattr support check failed"
            );
            BrickError::io(host, path, err)
        })?;

        if !force && claim::is_already_claimed(&self.fs, path, self.claim_walk) {
            error!(host, brick = %path.display(), "brick path is already in use");
            return Err(BrickError::AlreadyInUse {
                host: host.to_string(),
                path: path.to_path_buf(),
            });
        }

        claim::claim_path(&self.fs, path, volume_id).map_err(|err| {
            error!(
                host,
                brick = %path.display(),
                xattr = VOLUME_ID_XATTR,
                error = %err,
                "setxattr failed"
            );
            BrickError::io(host, path, err)
        })
    }

    /// Run every check for `spec` and claim it for `volume_id`.
    pub fn provision(&self, spec: &BrickSpec, volume_id: &VolumeId, force: bool) -> Result<()> {
        if self.require_local_host {
            ensure_local_host(&spec.host)?;
        }

        self.check(spec, force)?;
        self.validate_xattr_support(&spec.path, &spec.host, volume_id, force)?;

        info!(brick = %spec, volume_id = %volume_id, force, "brick claimed");
        Ok(())
    }

    /// Length and placement checks only; nothing is claimed.
    pub fn check(&self, spec: &BrickSpec, force: bool) -> Result<()> {
        validate_brick_path_length(&spec.path)?;
        validate_brick_subdir_length(&spec.path)?;
        self.validate(&spec.path, &spec.host, force)
    }
}

fn ensure_local_host(host: &str) -> Result<()> {
    let local = net::is_local_address(host).map_err(|source| {
        error!(host, error = %source, "failed to resolve brick host");
        BrickError::HostResolution {
            host: host.to_string(),
            source,
        }
    })?;

    if !local {
        error!(host, "brick host is not a local address");
        return Err(BrickError::NotLocalHost {
            host: host.to_string(),
        });
    }
    Ok(())
}

/// Parent directory of `path`, or `/` for top-level entries.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from(ROOT),
    }
}

/// Summarise a validation result for printing.
pub fn report(
    spec: &BrickSpec,
    volume_id: Option<VolumeId>,
    force: bool,
    result: &Result<()>,
) -> ValidationReport {
    let outcome = match result {
        Ok(()) => Outcome::Ok,
        Err(err) => Outcome::Failed {
            kind: err.kind(),
            message: err.to_string(),
        },
    };
    ValidationReport::new(spec, volume_id, force, outcome)
}
