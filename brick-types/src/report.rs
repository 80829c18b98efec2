// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{BrickSpec, VolumeId};

/// Closed set of reasons a brick path can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickErrorKind {
    #[serde(rename = "IOFailure")]
    IoFailure,
    #[serde(rename = "DeviceIDNotFound")]
    DeviceIdNotFound,
    BrickNotDirectory,
    BrickIsMountPoint,
    BrickUnderRootPartition,
    BrickPathAlreadyInUse,
    PathTooLong,
    SubdirTooLong,
    NotLocalHost,
    HostResolution,
    Config,
}

impl BrickErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BrickErrorKind::IoFailure => "IOFailure",
            BrickErrorKind::DeviceIdNotFound => "DeviceIDNotFound",
            BrickErrorKind::BrickNotDirectory => "BrickNotDirectory",
            BrickErrorKind::BrickIsMountPoint => "BrickIsMountPoint",
            BrickErrorKind::BrickUnderRootPartition => "BrickUnderRootPartition",
            BrickErrorKind::BrickPathAlreadyInUse => "BrickPathAlreadyInUse",
            BrickErrorKind::PathTooLong => "PathTooLong",
            BrickErrorKind::SubdirTooLong => "SubdirTooLong",
            BrickErrorKind::NotLocalHost => "NotLocalHost",
            BrickErrorKind::HostResolution => "HostResolution",
            BrickErrorKind::Config => "Config",
        }
    }

    /// Whether passing `force` would have skipped the check that failed.
    pub fn is_forceable(self) -> bool {
        matches!(
            self,
            BrickErrorKind::BrickIsMountPoint
                | BrickErrorKind::BrickUnderRootPartition
                | BrickErrorKind::BrickPathAlreadyInUse
        )
    }
}

impl std::fmt::Display for BrickErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Failed { kind: BrickErrorKind, message: String },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// Result of a single validation run, as printed by `brick-check --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub host: String,
    pub path: PathBuf,
    pub force: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<VolumeId>,
    pub outcome: Outcome,
}

impl ValidationReport {
    pub fn new(spec: &BrickSpec, volume_id: Option<VolumeId>, force: bool, outcome: Outcome) -> Self {
        Self {
            host: spec.host.clone(),
            path: spec.path.clone(),
            force,
            volume_id,
            outcome,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_serializes_taxonomy_name() {
        let spec = BrickSpec::new("node1", "/bricks/b1");
        let report = ValidationReport::new(
            &spec,
            None,
            false,
            Outcome::Failed {
                kind: BrickErrorKind::IoFailure,
                message: "setxattr failed".into(),
            },
        );

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["outcome"]["kind"], "IOFailure");
        assert!(value.get("volume_id").is_none());
    }

    #[test]
    fn only_topology_and_claim_kinds_are_forceable() {
        assert!(BrickErrorKind::BrickIsMountPoint.is_forceable());
        assert!(BrickErrorKind::BrickPathAlreadyInUse.is_forceable());
        assert!(!BrickErrorKind::BrickNotDirectory.is_forceable());
        assert!(!BrickErrorKind::IoFailure.is_forceable());
    }
}
