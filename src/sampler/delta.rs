// Two-snapshot delta math: utilization fractions and byte rates

use std::collections::BTreeMap;

use crate::error::MetricsError;
use crate::models::{CpuReport, DeviceReport, NetRate, NetReport, NetTotal};

use super::snapshot::CounterSnapshot;

/// Per-core and aggregate CPU utilization between two snapshots.
///
/// The aggregate divides summed idle/total deltas, so busier cores weigh in
/// by their actual tick counts; averaging the per-core fractions would give
/// every core equal weight.
pub fn cpu_utilization(
    s1: &CounterSnapshot,
    s2: &CounterSnapshot,
) -> Result<CpuReport, MetricsError> {
    if s1.cores.len() != s2.cores.len() {
        return Err(MetricsError::CoreCountMismatch {
            first: s1.cores.len(),
            second: s2.cores.len(),
        });
    }

    let mut single = Vec::with_capacity(s2.cores.len());
    let mut idle_sum: u64 = 0;
    let mut total_sum: u64 = 0;
    for (i, (c1, c2)) in s1.cores.iter().zip(&s2.cores).enumerate() {
        if c2.idle < c1.idle || c2.total < c1.total {
            tracing::debug!(core = i, "cpu counter went backwards; clamping delta to 0");
        }
        let idle = c2.idle.saturating_sub(c1.idle);
        let total = c2.total.saturating_sub(c1.total);
        idle_sum += idle;
        total_sum += total;
        if total == 0 {
            // A quiescent core can tick zero times inside a short window;
            // report it idle instead of dividing by zero.
            single.push(0.0);
        } else {
            single.push((1.0 - idle as f64 / total as f64).clamp(0.0, 1.0));
        }
    }

    let multi = if total_sum == 0 {
        0.0
    } else {
        (1.0 - idle_sum as f64 / total_sum as f64).clamp(0.0, 1.0)
    };
    Ok(CpuReport { multi, single })
}

/// Per-interface and aggregate network rates over the interval between the
/// snapshots. The `devices` map keeps the loopback interface; the aggregate
/// figures leave it out.
pub fn network_delta(s1: &CounterSnapshot, s2: &CounterSnapshot, loopback: &str) -> NetReport {
    let dt = s2
        .captured_at
        .saturating_duration_since(s1.captured_at)
        .as_secs_f64();

    let mut devices = BTreeMap::new();
    let mut delta = NetRate::default();
    let mut total = NetTotal::default();
    for (name, now) in &s2.interfaces {
        // An interface that appeared between the samples has no baseline yet;
        // it contributes totals but a zero delta.
        let prev = s1.interfaces.get(name).copied().unwrap_or(*now);
        if now.bytes_recv < prev.bytes_recv || now.bytes_sent < prev.bytes_sent {
            tracing::debug!(
                interface = %name,
                "network counter went backwards; clamping delta to 0"
            );
        }
        let rate = NetRate {
            inbound: per_second(now.bytes_recv.saturating_sub(prev.bytes_recv), dt),
            outbound: per_second(now.bytes_sent.saturating_sub(prev.bytes_sent), dt),
        };
        devices.insert(
            name.clone(),
            DeviceReport {
                delta: rate,
                total: NetTotal {
                    inbound: now.bytes_recv,
                    outbound: now.bytes_sent,
                },
            },
        );
        if name == loopback {
            continue;
        }
        delta.inbound += rate.inbound;
        delta.outbound += rate.outbound;
        total.inbound += now.bytes_recv;
        total.outbound += now.bytes_sent;
    }

    NetReport {
        devices,
        delta,
        total,
    }
}

fn per_second(delta_bytes: u64, dt: f64) -> f64 {
    if dt > 0.0 { delta_bytes as f64 / dt } else { 0.0 }
}
