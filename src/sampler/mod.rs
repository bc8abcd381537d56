// Report assembly: two-snapshot delta sampling plus single-shot queries

pub mod delta;
pub mod disk;
pub mod environment;
pub mod partitions;
pub mod probe;
pub mod snapshot;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::instrument;

use crate::config::AppConfig;
use crate::error::MetricsError;
use crate::models::{MemReport, Report};

pub use delta::{cpu_utilization, network_delta};
pub use disk::{DfCommand, DiskResolver, DiskUsageStrategy, NativeUsage};
pub use environment::is_containerized;
pub use partitions::{Mount, MountSource, MountUsage, PartitionEnumerator, SysinfoMounts};
pub use probe::{SysinfoProbe, SystemProbe};
pub use snapshot::{CoreTimes, CounterSnapshot, CounterSource, InterfaceCounters, SystemCounters};

/// Coarse platform classification; picks the df argument set and the default
/// root path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Mac,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::Mac,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    pub fn default_root(self) -> PathBuf {
        match self {
            Platform::Windows => PathBuf::from("C:\\"),
            _ => PathBuf::from("/"),
        }
    }
}

/// External source of the opaque `walled` status, merged into the report
/// verbatim.
pub trait WalledProvider: Send + Sync {
    fn current(&self) -> Value;
}

/// Fixed walled status; the default when no prober is wired in.
pub struct StaticWalled(pub Value);

impl WalledProvider for StaticWalled {
    fn current(&self) -> Value {
        self.0.clone()
    }
}

/// Everything the assembler needs, fixed at construction. No ambient state
/// is consulted while a request is in flight.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub platform: Platform,
    pub window: Duration,
    pub loopback: String,
    pub root_path: PathBuf,
}

impl SamplerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let platform = Platform::current();
        Self {
            platform,
            window: config.sampling.window(),
            loopback: config.sampling.loopback.clone(),
            root_path: config
                .sampling
                .root_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| platform.default_root()),
        }
    }
}

type WaitFn = dyn Fn(Duration) + Send + Sync;

/// Assembles one report per call: snapshot, wait, snapshot, deltas, then the
/// single-shot queries. Cheap to clone; every part is shared and requests
/// share no mutable state.
#[derive(Clone)]
pub struct Sampler {
    counters: Arc<dyn CounterSource>,
    probe: Arc<dyn SystemProbe>,
    disks: Arc<DiskResolver>,
    partitions: Arc<PartitionEnumerator>,
    walled: Arc<dyn WalledProvider>,
    wait: Arc<WaitFn>,
    config: Arc<SamplerConfig>,
}

impl Sampler {
    /// OS-backed sampler with the production strategy chain.
    pub fn system(config: SamplerConfig) -> Self {
        Self::new(
            Arc::new(SystemCounters::new()),
            Arc::new(SysinfoProbe::new()),
            DiskResolver::system(config.platform),
            PartitionEnumerator::new(Arc::new(SysinfoMounts::new())),
            Arc::new(StaticWalled(Value::Bool(false))),
            config,
        )
    }

    pub fn new(
        counters: Arc<dyn CounterSource>,
        probe: Arc<dyn SystemProbe>,
        disks: DiskResolver,
        partitions: PartitionEnumerator,
        walled: Arc<dyn WalledProvider>,
        config: SamplerConfig,
    ) -> Self {
        Self {
            counters,
            probe,
            disks: Arc::new(disks),
            partitions: Arc::new(partitions),
            walled,
            wait: Arc::new(|d| std::thread::sleep(d)),
            config: Arc::new(config),
        }
    }

    /// Replace the wait primitive. Tests substitute a no-op so the
    /// two-snapshot delta runs without real wall-clock cost.
    pub fn with_wait(mut self, wait: Arc<WaitFn>) -> Self {
        self.wait = wait;
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// One report, off the async runtime: the sampling window is a blocking
    /// wait, so the whole pipeline runs on the blocking pool.
    #[instrument(skip(self), fields(operation = "report"))]
    pub async fn report(&self) -> Result<Report, MetricsError> {
        let sampler = self.clone();
        tokio::task::spawn_blocking(move || sampler.collect())
            .await
            .map_err(|e| MetricsError::Join(e.to_string()))?
    }

    /// Synchronous collection pipeline. Any required single-shot query
    /// failing fails the report; disk and partition trouble degrades to
    /// zeroed or omitted fields instead.
    pub fn collect(&self) -> Result<Report, MetricsError> {
        let s1 = self.counters.capture()?;
        (self.wait)(self.config.window);
        let s2 = self.counters.capture()?;

        let cpu = delta::cpu_utilization(&s1, &s2)?;
        let net = delta::network_delta(&s1, &s2, &self.config.loopback);

        let mem = MemReport {
            virtual_mem: self.probe.memory()?,
            swap: self.probe.swap()?,
        };
        let host = self.probe.host()?;

        let disk = self.disks.resolve(&self.config.root_path);
        let disks = self.partitions.enumerate();

        Ok(Report {
            walled: self.walled.current(),
            mem,
            cpu,
            net,
            host,
            disk,
            disks,
        })
    }
}
