// Wire models for the /stat report (gopsutil-style JSON key names)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One complete point-in-time report. Built fresh per request; nothing here
/// survives across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Opaque status supplied by an external provider, merged verbatim.
    pub walled: serde_json::Value,
    pub mem: MemReport,
    pub cpu: CpuReport,
    pub net: NetReport,
    pub host: HostInfo,
    /// Usage of the configured root path. All-zero means "unknown" (every
    /// resolution tier failed), not necessarily an empty disk.
    pub disk: DiskInfo,
    pub disks: Vec<PartitionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemReport {
    #[serde(rename = "virtual")]
    pub virtual_mem: MemoryInfo,
    pub swap: SwapInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f64,
    pub free: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Utilization fractions in [0,1]. `single` is ordered by core index;
/// `multi` comes from summed tick deltas, not averaged fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuReport {
    pub multi: f64,
    pub single: Vec<f64>,
}

/// Byte rates over the sampling window, in bytes/second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NetRate {
    #[serde(rename = "in")]
    pub inbound: f64,
    #[serde(rename = "out")]
    pub outbound: f64,
}

/// Cumulative byte counters since boot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NetTotal {
    #[serde(rename = "in")]
    pub inbound: u64,
    #[serde(rename = "out")]
    pub outbound: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceReport {
    pub delta: NetRate,
    pub total: NetTotal,
}

/// Per-interface figures plus aggregates. `devices` keeps the loopback
/// interface for inspection; the aggregate `delta`/`total` leave it out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetReport {
    pub devices: BTreeMap<String, DeviceReport>,
    pub delta: NetRate,
    pub total: NetTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub hostname: String,
    pub uptime: u64,
    pub boot_time: u64,
    pub procs: u64,
    pub os: String,
    pub platform: String,
    pub platform_family: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub kernel_arch: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub device: String,
    pub mount: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}
