// SPDX-License-Identifier: GPL-3.0-only

//! Extended attribute probing and claim marking on brick directories.

use std::io;
use std::path::Path;

use brick_types::VolumeId;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::fs::{is_missing_xattr, BrickFs};

pub const TEST_XATTR: &str = "trusted.glusterfs.test";
pub const VOLUME_ID_XATTR: &str = "trusted.glusterfs.volume-id";
pub const GFID_XATTR: &str = "trusted.gfid";

const TEST_XATTR_VALUE: &[u8] = b"working";
const CLAIM_KEYS: [&str; 2] = [GFID_XATTR, VOLUME_ID_XATTR];

/// How far up the tree the already-in-use check looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimWalk {
    /// Only the brick directory itself.
    LeafOnly,
    /// The brick directory and every ancestor below `/`.
    #[default]
    Ancestors,
}

impl std::fmt::Display for ClaimWalk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimWalk::LeafOnly => write!(f, "leaf-only"),
            ClaimWalk::Ancestors => write!(f, "ancestors"),
        }
    }
}

impl std::str::FromStr for ClaimWalk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leaf-only" => Ok(ClaimWalk::LeafOnly),
            "ancestors" => Ok(ClaimWalk::Ancestors),
            _ => Err(format!("Invalid claim walk: {}", s)),
        }
    }
}

/// Write and remove a throwaway attribute to confirm the filesystem
/// supports `trusted.*` xattrs.
///
/// A failed removal leaves the test attribute on `path`; it is logged on its
/// own so the leftover can be traced.
pub fn check_xattr_support<F: BrickFs + ?Sized>(fs: &F, path: &Path) -> io::Result<()> {
    fs.set_xattr(path, TEST_XATTR, TEST_XATTR_VALUE)?;
    fs.remove_xattr(path, TEST_XATTR).map_err(|err| {
        error!(
            brick = %path.display(),
            xattr = TEST_XATTR,
            error = %err,
            "removexattr failed, test attribute left on brick"
        );
        err
    })
}

enum LevelState {
    Claimed,
    Unclaimed,
    Unreadable,
}

fn read_level<F: BrickFs + ?Sized>(fs: &F, path: &Path) -> LevelState {
    let mut state = LevelState::Unclaimed;
    for key in CLAIM_KEYS {
        match fs.xattr_size(path, key) {
            Ok(size) if size > 0 => {
                debug!(brick = %path.display(), xattr = key, "found claim attribute");
                return LevelState::Claimed;
            }
            Ok(_) => {}
            Err(err) if is_missing_xattr(&err) => {}
            Err(err) => {
                debug!(brick = %path.display(), xattr = key, error = %err, "getxattr failed");
                state = LevelState::Unreadable;
            }
        }
    }
    state
}

/// Whether `path` (or, with [`ClaimWalk::Ancestors`], a directory above it)
/// already carries a gfid or volume-id attribute.
///
/// Stops and reports "not claimed" at the first level that cannot be read.
pub fn is_already_claimed<F: BrickFs + ?Sized>(fs: &F, path: &Path, walk: ClaimWalk) -> bool {
    let mut current = Some(path);
    while let Some(level) = current {
        if level == Path::new("/") {
            break;
        }

        match read_level(fs, level) {
            LevelState::Claimed => return true,
            LevelState::Unreadable => return false,
            LevelState::Unclaimed => {}
        }

        if walk == ClaimWalk::LeafOnly {
            break;
        }
        current = level.parent();
    }
    false
}

/// Tag `path` as belonging to `volume_id`, replacing any previous tag.
pub fn claim_path<F: BrickFs + ?Sized>(fs: &F, path: &Path, volume_id: &VolumeId) -> io::Result<()> {
    fs.set_xattr(path, VOLUME_ID_XATTR, volume_id.as_bytes())
}
