// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use brick_sys::{
    BrickError, BrickPathValidator, ClaimWalk, DeviceId, MemoryFs, GFID_XATTR, TEST_XATTR,
    VOLUME_ID_XATTR,
};
use brick_types::{BrickErrorKind, BrickSpec, VolumeId};

const ROOT_DEV: DeviceId = DeviceId(1);
const DATA_DEV: DeviceId = DeviceId(2);
const DISK_DEV: DeviceId = DeviceId(3);
const HOST: &str = "node1";

/// `/` on the OS disk, `/data` a data disk, `/data/mnt` a second disk mounted
/// below it, `/srv` a plain directory on the OS disk.
fn host_layout() -> MemoryFs {
    MemoryFs::new(ROOT_DEV)
        .with_dir("/srv", ROOT_DEV)
        .with_dir("/data", DATA_DEV)
        .with_dir("/data/mnt", DISK_DEV)
        .with_dir("/data/bricks", DATA_DEV)
        .with_file("/data/notes.txt", DATA_DEV)
}

fn validator() -> BrickPathValidator<MemoryFs> {
    BrickPathValidator::with_fs(host_layout())
}

#[test]
fn validate_is_idempotent_for_new_directory() {
    let validator = validator();
    let brick = Path::new("/data/bricks/b1");

    validator.validate(brick, HOST, false).unwrap();
    assert!(validator.fs().is_dir(brick));
    validator.validate(brick, HOST, false).unwrap();
}

#[test]
fn mount_point_is_rejected_unless_forced() {
    let validator = validator();
    let brick = Path::new("/data/mnt");

    let err = validator.validate(brick, HOST, false).unwrap_err();
    assert!(matches!(&err, BrickError::IsMountPoint { host, path } if host == HOST && path == brick));
    assert!(err.is_forceable());

    validator.validate(brick, HOST, true).unwrap();
}

#[test]
fn root_partition_is_rejected_unless_forced() {
    let validator = validator();
    let brick = Path::new("/srv/b1");

    let err = validator.validate(brick, HOST, false).unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickUnderRootPartition);

    validator.validate(brick, HOST, true).unwrap();
}

#[test]
fn mount_point_directly_under_root_reports_mount_point() {
    let validator = BrickPathValidator::with_fs(MemoryFs::new(ROOT_DEV).with_dir("/export", DISK_DEV));

    let err = validator.validate(Path::new("/export"), HOST, false).unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickIsMountPoint);
}

#[test]
fn missing_device_id_is_fatal_unless_forced() {
    let validator = BrickPathValidator::with_fs(
        MemoryFs::new(ROOT_DEV)
            .with_dir("/data", DATA_DEV)
            .with_dir_without_device("/data/odd"),
    );
    let brick = Path::new("/data/odd");

    let err = validator.validate(brick, HOST, false).unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::DeviceIdNotFound);
    assert!(matches!(&err, BrickError::DeviceIdNotFound { path } if path == brick));

    validator.validate(brick, HOST, true).unwrap();
}

#[test]
fn existing_file_is_not_a_directory() {
    let validator = validator();
    let brick = Path::new("/data/notes.txt");

    for force in [false, true] {
        let err = validator.validate(brick, HOST, force).unwrap_err();
        assert_eq!(err.kind(), BrickErrorKind::BrickNotDirectory);
    }
    assert!(validator.fs().exists(brick));
    assert!(!validator.fs().is_dir(brick));
}

#[test]
fn claim_round_trip() {
    let validator = validator();
    let brick = Path::new("/data/bricks/b1");
    let first = VolumeId::new_random();
    let second = VolumeId::new_random();

    validator.validate(brick, HOST, false).unwrap();
    validator.validate_xattr_support(brick, HOST, &first, false).unwrap();
    assert_eq!(
        validator.fs().xattr(brick, VOLUME_ID_XATTR),
        Some(first.as_bytes().to_vec())
    );

    let err = validator
        .validate_xattr_support(brick, HOST, &second, false)
        .unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickPathAlreadyInUse);
    assert_eq!(
        validator.fs().xattr(brick, VOLUME_ID_XATTR),
        Some(first.as_bytes().to_vec())
    );

    validator.validate_xattr_support(brick, HOST, &second, true).unwrap();
    assert_eq!(
        validator.fs().xattr(brick, VOLUME_ID_XATTR),
        Some(second.as_bytes().to_vec())
    );
    assert_eq!(validator.fs().xattr(brick, TEST_XATTR), None);
}

#[test]
fn gfid_marks_path_in_use() {
    let fs = host_layout().with_xattr("/data/bricks", GFID_XATTR, &[0xab; 16]);
    let validator = BrickPathValidator::with_fs(fs);

    // The gfid is on the directory itself here, so both walks agree.
    let brick = Path::new("/data/bricks");
    let err = validator
        .validate_xattr_support(brick, HOST, &VolumeId::new_random(), false)
        .unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickPathAlreadyInUse);
}

#[test]
fn nested_brick_inside_claimed_brick() {
    let volume = VolumeId::new_random();
    let nested = Path::new("/data/bricks/b1/inner");

    let layout = || {
        host_layout()
            .with_dir("/data/bricks/b1", DATA_DEV)
            .with_xattr("/data/bricks/b1", VOLUME_ID_XATTR, volume.as_bytes())
    };

    let walking = BrickPathValidator::with_fs(layout()).claim_walk(ClaimWalk::Ancestors);
    walking.validate(nested, HOST, false).unwrap();
    let err = walking
        .validate_xattr_support(nested, HOST, &VolumeId::new_random(), false)
        .unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickPathAlreadyInUse);

    let leaf_only = BrickPathValidator::with_fs(layout()).claim_walk(ClaimWalk::LeafOnly);
    leaf_only.validate(nested, HOST, false).unwrap();
    leaf_only
        .validate_xattr_support(nested, HOST, &VolumeId::new_random(), false)
        .unwrap();
}

#[test]
fn filesystem_without_xattrs_fails_without_claiming() {
    let validator = BrickPathValidator::with_fs(host_layout().without_xattr_support());
    let brick = Path::new("/data/bricks/b1");

    validator.validate(brick, HOST, false).unwrap();
    for force in [false, true] {
        let err = validator
            .validate_xattr_support(brick, HOST, &VolumeId::new_random(), force)
            .unwrap_err();
        assert_eq!(err.kind(), BrickErrorKind::IoFailure);
        assert!(validator.fs().xattr_names(brick).is_empty());
    }
}

#[test]
fn provision_runs_every_phase() {
    let validator = validator();
    let spec: BrickSpec = "node1:/data/bricks/b2".parse().unwrap();
    let volume = VolumeId::new_random();

    validator.provision(&spec, &volume, false).unwrap();
    assert_eq!(
        validator.fs().xattr(&spec.path, VOLUME_ID_XATTR),
        Some(volume.as_bytes().to_vec())
    );

    // Re-running for the same volume still trips the claim check.
    let err = validator.provision(&spec, &volume, false).unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickPathAlreadyInUse);
}

#[test]
fn provision_stops_at_topology_failure() {
    let validator = validator();
    let spec = BrickSpec::new(HOST, "/srv/b2");

    let err = validator
        .provision(&spec, &VolumeId::new_random(), false)
        .unwrap_err();
    assert_eq!(err.kind(), BrickErrorKind::BrickUnderRootPartition);
    // The directory is created as a side effect but never claimed.
    assert!(validator.fs().is_dir(&spec.path));
    assert!(validator.fs().xattr_names(&spec.path).is_empty());
}
