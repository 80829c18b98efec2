// SPDX-License-Identifier: GPL-3.0-only

//! Filesystem primitives used by brick validation.
//!
//! Everything the validator touches on disk goes through [`BrickFs`] so the
//! topology and claim logic can be exercised against [`crate::memory::MemoryFs`]
//! as well as the real filesystem.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use crate::device::{DeviceId, HasDeviceId};

/// The subset of `lstat` results the validator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub device: Option<DeviceId>,
}

impl HasDeviceId for FileStat {
    fn device_id(&self) -> Option<DeviceId> {
        self.device
    }
}

impl From<&std::fs::Metadata> for FileStat {
    fn from(metadata: &std::fs::Metadata) -> Self {
        Self {
            is_dir: metadata.is_dir(),
            device: metadata.device_id(),
        }
    }
}

pub trait BrickFs {
    /// Create a single directory with the given permission bits.
    ///
    /// Must fail with `io::ErrorKind::AlreadyExists` when `path` exists.
    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Stat `path` without following a trailing symlink.
    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat>;

    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()>;

    fn remove_xattr(&self, path: &Path, name: &str) -> io::Result<()>;

    /// Size of the value stored under `name`.
    ///
    /// A missing attribute is reported as an error carrying `ENODATA`.
    fn xattr_size(&self, path: &Path, name: &str) -> io::Result<usize>;
}

/// Returns true when `err` means "attribute not set" rather than a failed read.
pub fn is_missing_xattr(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENODATA)
}

/// The host filesystem, via std and libc.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixFs;

impl BrickFs for PosixFs {
    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        std::fs::DirBuilder::new().mode(mode).create(path)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        std::fs::symlink_metadata(path).map(|metadata| FileStat::from(&metadata))
    }

    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        let c_path = c_path(path)?;
        let c_name = c_name(name)?;
        let rc = unsafe {
            libc::setxattr(
                c_path.as_ptr(),
                c_name.as_ptr(),
                value.as_ptr() as *const libc::c_void,
                value.len(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn remove_xattr(&self, path: &Path, name: &str) -> io::Result<()> {
        let c_path = c_path(path)?;
        let c_name = c_name(name)?;
        let rc = unsafe { libc::removexattr(c_path.as_ptr(), c_name.as_ptr()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn xattr_size(&self, path: &Path, name: &str) -> io::Result<usize> {
        let c_path = c_path(path)?;
        let c_name = c_name(name)?;
        // A zero-length buffer asks the kernel for the value size only.
        let size = unsafe {
            libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), std::ptr::null_mut(), 0)
        };
        if size < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(size as usize)
    }
}

fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path {} contains NUL byte: {}", path.display(), e),
        )
    })
}

fn c_name(name: &str) -> io::Result<CString> {
    CString::new(name).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("xattr name {name:?} contains NUL byte: {e}"),
        )
    })
}
