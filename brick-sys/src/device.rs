// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use crate::error::{BrickError, Result};

/// Identifier of the device backing a filesystem entry (`st_dev`).
///
/// Two entries share a `DeviceId` iff they live on the same mounted filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Metadata that may expose the device it lives on.
pub trait HasDeviceId {
    fn device_id(&self) -> Option<DeviceId>;
}

impl HasDeviceId for std::fs::Metadata {
    #[cfg(unix)]
    fn device_id(&self) -> Option<DeviceId> {
        use std::os::unix::fs::MetadataExt;
        Some(DeviceId(self.dev()))
    }

    #[cfg(not(unix))]
    fn device_id(&self) -> Option<DeviceId> {
        None
    }
}

pub fn device_id_of<M: HasDeviceId + ?Sized>(metadata: &M, path: &Path) -> Result<DeviceId> {
    metadata
        .device_id()
        .ok_or_else(|| BrickError::DeviceIdNotFound {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl HasDeviceId for Opaque {
        fn device_id(&self) -> Option<DeviceId> {
            None
        }
    }

    #[test]
    fn missing_device_id_is_an_error() {
        let err = device_id_of(&Opaque, Path::new("/bricks/b1")).unwrap_err();
        assert!(matches!(err, BrickError::DeviceIdNotFound { path } if path == Path::new("/bricks/b1")));
    }

    #[test]
    fn std_metadata_exposes_st_dev() {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::symlink_metadata("/").unwrap();
        let id = device_id_of(&metadata, Path::new("/")).unwrap();
        assert_eq!(id, DeviceId(metadata.dev()));
    }
}
