// Mounted filesystem enumeration with pseudo-filesystem filtering

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sysinfo::Disks;

use crate::models::PartitionInfo;

use super::disk::DiskError;

/// Filesystem types that never describe real persistent storage.
const PSEUDO_FILESYSTEMS: &[&str] = &[
    "devfs",
    "tmpfs",
    "devtmpfs",
    "none",
    "proc",
    "sysfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "debugfs",
    "securityfs",
    "autofs",
];

pub fn is_pseudo_filesystem(fstype: &str) -> bool {
    PSEUDO_FILESYSTEMS.contains(&fstype)
}

/// One entry of a mount listing, before its usage is known.
#[derive(Debug, Clone)]
pub struct Mount {
    pub device: String,
    pub mount_point: PathBuf,
    pub fstype: String,
}

/// Usage figures for one mount point.
#[derive(Debug, Clone, Copy)]
pub struct MountUsage {
    pub total: u64,
    pub free: u64,
}

pub trait MountSource: Send + Sync {
    /// All mounted filesystems, in OS enumeration order, pseudo ones included.
    fn mounts(&self) -> Vec<Mount>;
    fn usage(&self, mount_point: &Path) -> Result<MountUsage, DiskError>;
}

/// sysinfo-backed listing. `mounts` refreshes once; `usage` answers from the
/// same refreshed list so one enumeration pass costs one scan.
pub struct SysinfoMounts {
    disks: Mutex<Disks>,
}

impl SysinfoMounts {
    pub fn new() -> Self {
        Self {
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl Default for SysinfoMounts {
    fn default() -> Self {
        Self::new()
    }
}

impl MountSource for SysinfoMounts {
    fn mounts(&self) -> Vec<Mount> {
        let Ok(mut disks) = self.disks.lock() else {
            return Vec::new();
        };
        disks.refresh(true);
        disks
            .list()
            .iter()
            .map(|d| Mount {
                device: d.name().to_string_lossy().into_owned(),
                mount_point: d.mount_point().to_path_buf(),
                fstype: d.file_system().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn usage(&self, mount_point: &Path) -> Result<MountUsage, DiskError> {
        let disks = self
            .disks
            .lock()
            .map_err(|_| DiskError::NoMatch(mount_point.to_path_buf()))?;
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == mount_point)
            .ok_or_else(|| DiskError::NoMatch(mount_point.to_path_buf()))?;
        Ok(MountUsage {
            total: disk.total_space(),
            free: disk.available_space(),
        })
    }
}

/// Lists real partitions with usage. A partition whose usage query fails is
/// skipped, as is anything with zero capacity (unmounted binds and similar
/// artifacts). Enumeration order is preserved; this never errors.
pub struct PartitionEnumerator {
    source: Arc<dyn MountSource>,
}

impl PartitionEnumerator {
    pub fn new(source: Arc<dyn MountSource>) -> Self {
        Self { source }
    }

    pub fn enumerate(&self) -> Vec<PartitionInfo> {
        let mut partitions = Vec::new();
        for mount in self.source.mounts() {
            if is_pseudo_filesystem(&mount.fstype) {
                continue;
            }
            let usage = match self.source.usage(&mount.mount_point) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!(
                        mount = %mount.mount_point.display(),
                        error = %e,
                        "partition usage query failed; skipping"
                    );
                    continue;
                }
            };
            if usage.total == 0 {
                continue;
            }
            let used = usage.total.saturating_sub(usage.free);
            partitions.push(PartitionInfo {
                device: mount.device,
                mount: mount.mount_point.to_string_lossy().into_owned(),
                fstype: mount.fstype,
                total: usage.total,
                used,
                free: usage.free,
                percent: used as f64 / usage.total as f64 * 100.0,
            });
        }
        partitions
    }
}
