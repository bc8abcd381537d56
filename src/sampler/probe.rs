// Single-shot memory, swap, and host queries (no delta sampling)

use std::sync::Mutex;

use sysinfo::{ProcessesToUpdate, System};

use crate::error::MetricsError;
use crate::models::{HostInfo, MemoryInfo, SwapInfo};

/// The report's single-shot collaborators. Any failure here fails the whole
/// report; there is no partial memory or host data.
pub trait SystemProbe: Send + Sync {
    fn memory(&self) -> Result<MemoryInfo, MetricsError>;
    fn swap(&self) -> Result<SwapInfo, MetricsError>;
    fn host(&self) -> Result<HostInfo, MetricsError>;
}

pub struct SysinfoProbe {
    sys: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, System>, MetricsError> {
        self.sys
            .lock()
            .map_err(|e| MetricsError::Unavailable(format!("sysinfo lock poisoned: {e}")))
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysinfoProbe {
    fn memory(&self) -> Result<MemoryInfo, MetricsError> {
        let mut sys = self.lock()?;
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(MetricsError::Unavailable(
                "memory query returned no data".into(),
            ));
        }
        let available = sys.available_memory();
        let used = total.saturating_sub(available);
        Ok(MemoryInfo {
            total,
            available,
            used,
            used_percent: used as f64 / total as f64 * 100.0,
            free: sys.free_memory(),
        })
    }

    fn swap(&self) -> Result<SwapInfo, MetricsError> {
        let mut sys = self.lock()?;
        sys.refresh_memory();
        let total = sys.total_swap();
        let used = sys.used_swap();
        // A machine without swap reports zeroes; that is data, not a failure.
        Ok(SwapInfo {
            total,
            used,
            free: sys.free_swap(),
            used_percent: if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
    }

    fn host(&self) -> Result<HostInfo, MetricsError> {
        let mut sys = self.lock()?;
        sys.refresh_processes(ProcessesToUpdate::All, true);
        Ok(HostInfo {
            hostname: System::host_name().unwrap_or_default(),
            uptime: System::uptime(),
            boot_time: System::boot_time(),
            procs: sys.processes().len() as u64,
            os: std::env::consts::OS.into(),
            platform: System::name().unwrap_or_default(),
            platform_family: System::distribution_id(),
            platform_version: System::os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            kernel_arch: System::cpu_arch(),
        })
    }
}
