// Shared test fixtures: scripted counters, fixed probes, canned strategies

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use hoststat::error::MetricsError;
use hoststat::models::{DiskInfo, HostInfo, MemoryInfo, SwapInfo};
use hoststat::sampler::disk::DiskError;
use hoststat::sampler::{
    CoreTimes, CounterSnapshot, CounterSource, DiskResolver, DiskUsageStrategy, InterfaceCounters,
    Mount, MountSource, MountUsage, PartitionEnumerator, Platform, Sampler, SamplerConfig,
    StaticWalled, SystemProbe,
};

pub fn snapshot(
    at: Instant,
    cores: &[(u64, u64)],
    interfaces: &[(&str, u64, u64)],
) -> CounterSnapshot {
    CounterSnapshot {
        captured_at: at,
        cores: cores
            .iter()
            .map(|&(idle, total)| CoreTimes { idle, total })
            .collect(),
        interfaces: interfaces
            .iter()
            .map(|&(name, recv, sent)| {
                (
                    name.to_string(),
                    InterfaceCounters {
                        bytes_recv: recv,
                        bytes_sent: sent,
                    },
                )
            })
            .collect(),
    }
}

/// CounterSource that replays a fixed sequence of snapshots, then errors.
pub struct ScriptedCounters {
    snapshots: Mutex<Vec<CounterSnapshot>>,
}

impl ScriptedCounters {
    pub fn new(snapshots: Vec<CounterSnapshot>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots),
        }
    }
}

impl CounterSource for ScriptedCounters {
    fn capture(&self) -> Result<CounterSnapshot, MetricsError> {
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.is_empty() {
            return Err(MetricsError::Unavailable("scripted counters exhausted".into()));
        }
        Ok(snapshots.remove(0))
    }
}

pub fn memory_fixture() -> MemoryInfo {
    MemoryInfo {
        total: 8_000,
        available: 6_000,
        used: 2_000,
        used_percent: 25.0,
        free: 5_000,
    }
}

pub fn swap_fixture() -> SwapInfo {
    SwapInfo {
        total: 1_000,
        used: 100,
        free: 900,
        used_percent: 10.0,
    }
}

pub fn host_fixture() -> HostInfo {
    HostInfo {
        hostname: "testhost".into(),
        uptime: 3_600,
        boot_time: 1_700_000_000,
        procs: 42,
        os: "linux".into(),
        platform: "Test Linux".into(),
        platform_family: "test".into(),
        platform_version: "1.0".into(),
        kernel_version: "6.1.0".into(),
        kernel_arch: "x86_64".into(),
    }
}

/// Probe with canned data; individual queries can be flipped to fail.
pub struct FixedProbe {
    pub fail_memory: bool,
    pub fail_swap: bool,
    pub fail_host: bool,
}

impl FixedProbe {
    pub fn ok() -> Self {
        Self {
            fail_memory: false,
            fail_swap: false,
            fail_host: false,
        }
    }
}

impl SystemProbe for FixedProbe {
    fn memory(&self) -> Result<MemoryInfo, MetricsError> {
        if self.fail_memory {
            return Err(MetricsError::Unavailable("memory query failed".into()));
        }
        Ok(memory_fixture())
    }

    fn swap(&self) -> Result<SwapInfo, MetricsError> {
        if self.fail_swap {
            return Err(MetricsError::Unavailable("swap query failed".into()));
        }
        Ok(swap_fixture())
    }

    fn host(&self) -> Result<HostInfo, MetricsError> {
        if self.fail_host {
            return Err(MetricsError::Unavailable("host query failed".into()));
        }
        Ok(host_fixture())
    }
}

/// Disk strategy that always fails, counting attempts.
pub struct FailingDisk {
    pub calls: Arc<AtomicUsize>,
}

impl FailingDisk {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl DiskUsageStrategy for FailingDisk {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn usage(&self, path: &Path) -> Result<DiskInfo, DiskError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(DiskError::NoMatch(path.to_path_buf()))
    }
}

/// Disk strategy that returns fixed usage, counting calls.
pub struct FixedDisk {
    pub info: DiskInfo,
    pub calls: Arc<AtomicUsize>,
}

impl FixedDisk {
    pub fn new(info: DiskInfo) -> Self {
        Self {
            info,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl DiskUsageStrategy for FixedDisk {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn usage(&self, _path: &Path) -> Result<DiskInfo, DiskError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.info)
    }
}

/// Mount listing over a fixed table; `None` usage makes that mount's usage
/// query fail.
pub struct FixedMounts {
    pub entries: Vec<(Mount, Option<MountUsage>)>,
}

impl MountSource for FixedMounts {
    fn mounts(&self) -> Vec<Mount> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    fn usage(&self, mount_point: &Path) -> Result<MountUsage, DiskError> {
        self.entries
            .iter()
            .find(|(m, _)| m.mount_point == mount_point)
            .and_then(|(_, usage)| *usage)
            .ok_or_else(|| DiskError::NoMatch(mount_point.to_path_buf()))
    }
}

pub fn mount(device: &str, mount_point: &str, fstype: &str) -> Mount {
    Mount {
        device: device.into(),
        mount_point: PathBuf::from(mount_point),
        fstype: fstype.into(),
    }
}

pub fn test_config() -> SamplerConfig {
    SamplerConfig {
        platform: Platform::Linux,
        window: Duration::from_millis(500),
        loopback: "lo".into(),
        root_path: PathBuf::from("/"),
    }
}

/// Fully mocked sampler: scripted snapshots, canned probe, fixed disk and
/// mounts, no real waiting.
pub fn mock_sampler(
    snapshots: Vec<CounterSnapshot>,
    probe: FixedProbe,
    disk: DiskResolver,
    mounts: FixedMounts,
) -> Sampler {
    Sampler::new(
        Arc::new(ScriptedCounters::new(snapshots)),
        Arc::new(probe),
        disk,
        PartitionEnumerator::new(Arc::new(mounts)),
        Arc::new(StaticWalled(Value::Bool(false))),
        test_config(),
    )
    .with_wait(Arc::new(|_| {}))
}

/// Two snapshots 500 ms apart with simple hand-computable numbers.
pub fn default_snapshots() -> Vec<CounterSnapshot> {
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_millis(500);
    vec![
        snapshot(
            t0,
            &[(100, 200), (100, 200)],
            &[("eth0", 1_000, 500), ("lo", 100, 200)],
        ),
        snapshot(
            t1,
            &[(150, 300), (100, 400)],
            &[("eth0", 2_000, 1_000), ("lo", 300, 400)],
        ),
    ]
}

pub fn default_mounts() -> FixedMounts {
    FixedMounts {
        entries: vec![(
            mount("/dev/sda1", "/", "ext4"),
            Some(MountUsage {
                total: 1_000,
                free: 600,
            }),
        )],
    }
}
