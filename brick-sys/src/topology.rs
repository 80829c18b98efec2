// SPDX-License-Identifier: GPL-3.0-only

//! Mount topology checks based on device ids.

use crate::device::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyViolation {
    /// The brick sits on a different device than its parent.
    MountPoint,
    /// The brick's parent lives on the root filesystem.
    UnderRootPartition,
}

/// Check that a brick is a plain directory on a non-root filesystem.
///
/// A mount point is reported before a root-partition placement when both
/// would apply.
pub fn check_topology(
    root: DeviceId,
    parent: DeviceId,
    brick: DeviceId,
) -> Result<(), TopologyViolation> {
    if brick != parent {
        return Err(TopologyViolation::MountPoint);
    }
    if parent == root {
        return Err(TopologyViolation::UnderRootPartition);
    }
    Ok(())
}
