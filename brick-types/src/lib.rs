// SPDX-License-Identifier: GPL-3.0-only

//! Shared value types for brick path validation
//!
//! These types cross the boundary between the low-level validation crate
//! (`brick-sys`) and anything that reports on or schedules brick
//! provisioning:
//!
//! - `VolumeId` → the opaque 128-bit tag written onto a claimed brick
//! - `BrickSpec` → a parsed `host:path` brick specification
//! - `BrickErrorKind` → the closed taxonomy of validation failures
//! - `ValidationReport` → serializable record of one validation run

pub mod brick;
pub mod report;
pub mod volume;

pub use brick::{BrickSpec, ParseBrickSpecError};
pub use report::{BrickErrorKind, Outcome, ValidationReport};
pub use volume::VolumeId;
