// SPDX-License-Identifier: GPL-3.0-only

//! Length limits for brick paths.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::{BrickError, Result};

/// Maximum length of a full path, including the terminating NUL.
pub const PATH_MAX: usize = libc::PATH_MAX as usize;

/// `_POSIX_PATH_MAX` from `<limits.h>`, used as the per-directory limit.
pub const POSIX_PATH_MAX: usize = 256;

/// Lexically normalise `path`: collapse repeated separators, drop `.`
/// segments and resolve `..` against the preceding segment.
///
/// Works on the raw bytes, so non UTF-8 names survive untouched. A rooted
/// path never climbs above `/`. An empty path cleans to `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let bytes = path.as_os_str().as_bytes();
    if bytes.is_empty() {
        return PathBuf::from(".");
    }

    let rooted = bytes.first() == Some(&b'/');
    let mut parts: Vec<&[u8]> = Vec::new();

    for segment in bytes.split(|byte| *byte == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                if parts.last().is_some_and(|last| *last != b"..") {
                    parts.pop();
                } else if !rooted {
                    parts.push(b"..");
                }
            }
            other => parts.push(other),
        }
    }

    let mut cleaned = Vec::with_capacity(bytes.len());
    if rooted {
        cleaned.push(b'/');
    }
    cleaned.extend_from_slice(&parts.join(&b'/'));
    if cleaned.is_empty() {
        cleaned.push(b'.');
    }
    PathBuf::from(OsString::from_vec(cleaned))
}

pub fn validate_brick_path_length(path: &Path) -> Result<()> {
    let len = clean_path(path).as_os_str().len();
    if len >= PATH_MAX {
        error!(brick = %path.display(), len, "brickpath is too long");
        return Err(BrickError::PathTooLong {
            path: path.to_path_buf(),
            len,
        });
    }
    Ok(())
}

pub fn validate_brick_subdir_length(path: &Path) -> Result<()> {
    for segment in path.as_os_str().as_bytes().split(|byte| *byte == b'/') {
        if segment.len() >= POSIX_PATH_MAX {
            let segment = OsStr::from_bytes(segment);
            error!(subdir = %segment.to_string_lossy(), "sub directory path is too long");
            return Err(BrickError::SubdirTooLong {
                segment: segment.to_os_string(),
                len: segment.len(),
            });
        }
    }
    Ok(())
}
