// Counter snapshots: cumulative per-core CPU times and interface byte counters

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

use sysinfo::Networks;

use crate::error::MetricsError;

/// Cumulative CPU time for one logical core, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTimes {
    pub idle: u64,
    pub total: u64,
}

/// Cumulative byte counters for one network interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub bytes_recv: u64,
    pub bytes_sent: u64,
}

/// One point-in-time read of all delta-relevant counters. Immutable once
/// captured; owned by the request that triggered it.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    pub captured_at: Instant,
    /// Ordered by OS core index.
    pub cores: Vec<CoreTimes>,
    pub interfaces: BTreeMap<String, InterfaceCounters>,
}

pub trait CounterSource: Send + Sync {
    /// Fresh read of CPU and network counters. No caching; the CPU and
    /// network reads happen back-to-back so both belong to the same instant.
    fn capture(&self) -> Result<CounterSnapshot, MetricsError>;
}

/// OS-backed source: /proc/stat for per-core times, sysinfo for the
/// interface counters.
pub struct SystemCounters {
    networks: Mutex<Networks>,
}

impl SystemCounters {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl Default for SystemCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SystemCounters {
    fn capture(&self) -> Result<CounterSnapshot, MetricsError> {
        let captured_at = Instant::now();
        let cores = read_core_times()?;
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| MetricsError::Unavailable(format!("networks lock poisoned: {e}")))?;
        networks.refresh(true);
        let interfaces = networks
            .list()
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    InterfaceCounters {
                        bytes_recv: data.total_received(),
                        bytes_sent: data.total_transmitted(),
                    },
                )
            })
            .collect();
        Ok(CounterSnapshot {
            captured_at,
            cores,
            interfaces,
        })
    }
}

#[cfg(target_os = "linux")]
fn read_core_times() -> Result<Vec<CoreTimes>, MetricsError> {
    let content = std::fs::read_to_string("/proc/stat")
        .map_err(|e| MetricsError::Unavailable(format!("read /proc/stat: {e}")))?;
    let cores = parse_proc_stat(&content);
    if cores.is_empty() {
        return Err(MetricsError::Unavailable(
            "no per-core cpu lines in /proc/stat".into(),
        ));
    }
    Ok(cores)
}

#[cfg(not(target_os = "linux"))]
fn read_core_times() -> Result<Vec<CoreTimes>, MetricsError> {
    Err(MetricsError::Unavailable(
        "per-core cpu times are only read from /proc/stat on linux".into(),
    ))
}

/// Parse the per-core `cpuN` lines of /proc/stat, in file order. Total sums
/// the first eight fields (user, nice, system, idle, iowait, irq, softirq,
/// steal); guest time is already included in user. Malformed lines are
/// dropped rather than misaligned.
pub fn parse_proc_stat(content: &str) -> Vec<CoreTimes> {
    let mut cores = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else { continue };
        let Some(index) = label.strip_prefix("cpu") else {
            continue;
        };
        // "cpu" without an index is the machine-wide aggregate line.
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Some(ticks) = fields
            .take(8)
            .map(|f| f.parse::<u64>().ok())
            .collect::<Option<Vec<u64>>>()
        else {
            continue;
        };
        if ticks.len() < 4 {
            continue;
        }
        cores.push(CoreTimes {
            idle: ticks[3],
            total: ticks.iter().sum(),
        });
    }
    cores
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "\
cpu  1000 20 300 5000 40 5 6 7 0 0
cpu0 500 10 150 2500 20 2 3 4 0 0
cpu1 500 10 150 2500 20 3 3 3 0 0
intr 12345
ctxt 67890
";

    #[test]
    fn parses_per_core_lines_and_skips_aggregate() {
        let cores = parse_proc_stat(PROC_STAT);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].idle, 2500);
        assert_eq!(cores[0].total, 500 + 10 + 150 + 2500 + 20 + 2 + 3 + 4);
        assert_eq!(cores[1].total, 500 + 10 + 150 + 2500 + 20 + 3 + 3 + 3);
    }

    #[test]
    fn ignores_guest_fields_beyond_steal() {
        let cores = parse_proc_stat("cpu0 1 1 1 1 1 1 1 1 999 999\n");
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].total, 8);
    }

    #[test]
    fn drops_malformed_lines() {
        let cores = parse_proc_stat("cpu0 1 2 three 4 5 6 7 8\ncpu1 1 2 3 4 5 6 7 8\n");
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].idle, 4);
    }

    #[test]
    fn short_line_is_dropped() {
        assert!(parse_proc_stat("cpu0 1 2 3\n").is_empty());
    }

    #[test]
    fn non_cpu_labels_are_ignored() {
        assert!(parse_proc_stat("cpufreq 1 2 3 4 5 6 7 8\nintr 5\n").is_empty());
    }
}
