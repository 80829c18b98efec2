// SPDX-License-Identifier: GPL-3.0-only

//! In-memory [`BrickFs`] for tests.
//!
//! Each entry records the device it lives on, so mount points and the root
//! partition can be laid out explicitly instead of depending on the host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::device::DeviceId;
use crate::fs::{BrickFs, FileStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    device: Option<DeviceId>,
    mode: u32,
    xattrs: BTreeMap<String, Vec<u8>>,
    /// errno returned when reading or removing the named attribute.
    xattr_errors: BTreeMap<String, i32>,
}

impl Entry {
    fn new(kind: EntryKind, device: Option<DeviceId>, mode: u32) -> Self {
        Self {
            kind,
            device,
            mode,
            xattrs: BTreeMap::new(),
            xattr_errors: BTreeMap::new(),
        }
    }

    fn check_xattr(&self, name: &str) -> io::Result<()> {
        match self.xattr_errors.get(name) {
            Some(errno) => Err(io::Error::from_raw_os_error(*errno)),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct MemoryFs {
    entries: RefCell<BTreeMap<PathBuf, Entry>>,
    xattrs_supported: bool,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new(DeviceId(1))
    }
}

impl MemoryFs {
    /// A filesystem holding only `/`, on `root_device`.
    pub fn new(root_device: DeviceId) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            PathBuf::from("/"),
            Entry::new(EntryKind::Dir, Some(root_device), 0o755),
        );
        Self {
            entries: RefCell::new(entries),
            xattrs_supported: true,
        }
    }

    /// Add a directory on `device`; a device different from its parent's makes
    /// it a mount point.
    pub fn with_dir(self, path: impl AsRef<Path>, device: DeviceId) -> Self {
        self.entries.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            Entry::new(EntryKind::Dir, Some(device), 0o755),
        );
        self
    }

    /// Add a directory whose stat result carries no device id.
    pub fn with_dir_without_device(self, path: impl AsRef<Path>) -> Self {
        self.entries.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            Entry::new(EntryKind::Dir, None, 0o755),
        );
        self
    }

    pub fn with_file(self, path: impl AsRef<Path>, device: DeviceId) -> Self {
        self.entries.borrow_mut().insert(
            path.as_ref().to_path_buf(),
            Entry::new(EntryKind::File, Some(device), 0o644),
        );
        self
    }

    pub fn with_xattr(self, path: impl AsRef<Path>, name: &str, value: &[u8]) -> Self {
        if let Some(entry) = self.entries.borrow_mut().get_mut(path.as_ref()) {
            entry.xattrs.insert(name.to_string(), value.to_vec());
        }
        self
    }

    /// Make reads and removals of `name` on `path` fail with `errno`.
    /// Writes still succeed.
    pub fn with_xattr_error(self, path: impl AsRef<Path>, name: &str, errno: i32) -> Self {
        if let Some(entry) = self.entries.borrow_mut().get_mut(path.as_ref()) {
            entry.xattr_errors.insert(name.to_string(), errno);
        }
        self
    }

    /// Make every xattr write fail with `EOPNOTSUPP`, like a filesystem
    /// mounted without extended attribute support.
    pub fn without_xattr_support(mut self) -> Self {
        self.xattrs_supported = false;
        self
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.entries.borrow().contains_key(path.as_ref())
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.entries
            .borrow()
            .get(path.as_ref())
            .is_some_and(|entry| entry.kind == EntryKind::Dir)
    }

    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.entries.borrow().get(path.as_ref()).map(|entry| entry.mode)
    }

    pub fn xattr(&self, path: impl AsRef<Path>, name: &str) -> Option<Vec<u8>> {
        self.entries
            .borrow()
            .get(path.as_ref())
            .and_then(|entry| entry.xattrs.get(name).cloned())
    }

    pub fn xattr_names(&self, path: impl AsRef<Path>) -> Vec<String> {
        self.entries
            .borrow()
            .get(path.as_ref())
            .map(|entry| entry.xattrs.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn with_entry<T>(
        &self,
        path: &Path,
        f: impl FnOnce(&mut Entry) -> io::Result<T>,
    ) -> io::Result<T> {
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .get_mut(path)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))?;
        f(entry)
    }
}

impl BrickFs for MemoryFs {
    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(path) {
            return Err(io::Error::from_raw_os_error(libc::EEXIST));
        }

        let parent = path.parent().unwrap_or(Path::new("/"));
        let device = match entries.get(parent) {
            Some(entry) if entry.kind == EntryKind::Dir => entry.device,
            Some(_) => return Err(io::Error::from_raw_os_error(libc::ENOTDIR)),
            None => return Err(io::Error::from_raw_os_error(libc::ENOENT)),
        };

        entries.insert(path.to_path_buf(), Entry::new(EntryKind::Dir, device, mode));
        Ok(())
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<FileStat> {
        self.entries
            .borrow()
            .get(path)
            .map(|entry| FileStat {
                is_dir: entry.kind == EntryKind::Dir,
                device: entry.device,
            })
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))
    }

    fn set_xattr(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        if !self.xattrs_supported {
            return Err(io::Error::from_raw_os_error(libc::EOPNOTSUPP));
        }
        self.with_entry(path, |entry| {
            entry.xattrs.insert(name.to_string(), value.to_vec());
            Ok(())
        })
    }

    fn remove_xattr(&self, path: &Path, name: &str) -> io::Result<()> {
        if !self.xattrs_supported {
            return Err(io::Error::from_raw_os_error(libc::EOPNOTSUPP));
        }
        self.with_entry(path, |entry| {
            entry.check_xattr(name)?;
            entry
                .xattrs
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODATA))
        })
    }

    fn xattr_size(&self, path: &Path, name: &str) -> io::Result<usize> {
        if !self.xattrs_supported {
            return Err(io::Error::from_raw_os_error(libc::EOPNOTSUPP));
        }
        self.with_entry(path, |entry| {
            entry.check_xattr(name)?;
            entry
                .xattrs
                .get(name)
                .map(Vec::len)
                .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODATA))
        })
    }
}
