// SPDX-License-Identifier: GPL-3.0-only

//! Brick path validation for distributed storage
//!
//! This crate decides whether a directory offered by an operator can back a
//! storage brick, and marks it as claimed once it does:
//! - Path and path-segment length limits
//! - Device id comparison against the parent directory and `/`
//! - Extended attribute support probing
//! - Detection and writing of the `trusted.glusterfs.volume-id` claim
//!
//! All operations are synchronous and block on the underlying syscalls.
//! Writing `trusted.*` attributes requires `CAP_SYS_ADMIN`.

pub mod claim;
pub mod config;
pub mod device;
pub mod error;
pub mod fs;
pub mod memory;
pub mod net;
pub mod path_len;
pub mod topology;
pub mod validate;

pub use claim::{ClaimWalk, GFID_XATTR, TEST_XATTR, VOLUME_ID_XATTR};
pub use config::BrickConfig;
pub use device::{device_id_of, DeviceId, HasDeviceId};
pub use error::{BrickError, Result};
pub use fs::{BrickFs, FileStat, PosixFs};
pub use memory::MemoryFs;
pub use net::is_local_address;
pub use path_len::{validate_brick_path_length, validate_brick_subdir_length};
pub use validate::BrickPathValidator;

use std::path::Path;

use brick_types::VolumeId;

/// [`BrickPathValidator::validate`] against the host filesystem.
pub fn validate_brick_path_stats(path: &Path, host: &str, force: bool) -> Result<()> {
    BrickPathValidator::new().validate(path, host, force)
}

/// [`BrickPathValidator::validate_xattr_support`] against the host filesystem.
pub fn validate_xattr_support(
    path: &Path,
    host: &str,
    volume_id: &VolumeId,
    force: bool,
) -> Result<()> {
    BrickPathValidator::new().validate_xattr_support(path, host, volume_id, force)
}
