// Disk usage resolution: native query first, `df` fallback, zero default

use std::path::{Path, PathBuf};
use std::process::Command;

use sysinfo::Disks;
use thiserror::Error;

use crate::models::DiskInfo;

use super::Platform;

/// Why one resolution tier failed. Absorbed by the chain; callers of
/// [`DiskResolver::resolve`] never see it.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("running df: {0}")]
    Command(#[from] std::io::Error),
    #[error("df exited with {0}")]
    ExitStatus(std::process::ExitStatus),
    #[error("df printed fewer than two lines")]
    TooFewLines,
    #[error("df data line has {0} fields, need at least 5")]
    TooFewFields(usize),
    #[error("df {field} field is not a number: {value:?}")]
    BadNumber {
        field: &'static str,
        value: String,
    },
    #[error("no mounted filesystem covers {}", .0.display())]
    NoMatch(PathBuf),
}

/// One way of answering "how full is the filesystem at this path".
pub trait DiskUsageStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn usage(&self, path: &Path) -> Result<DiskInfo, DiskError>;
}

/// Tier 1: refreshed sysinfo disk list; the mount with the longest prefix of
/// the path wins. Sandboxes without mount visibility produce an empty list,
/// which lands in the next tier.
pub struct NativeUsage;

impl DiskUsageStrategy for NativeUsage {
    fn name(&self) -> &'static str {
        "native"
    }

    fn usage(&self, path: &Path) -> Result<DiskInfo, DiskError> {
        let disks = Disks::new_with_refreshed_list();
        let best = disks
            .list()
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| DiskError::NoMatch(path.to_path_buf()))?;
        let total = best.total_space();
        if total == 0 {
            return Err(DiskError::NoMatch(path.to_path_buf()));
        }
        let free = best.available_space();
        Ok(DiskInfo {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }
}

/// Tier 2: parse `df -k` output. Containers often block the mount queries
/// tier 1 needs while still shipping a working df binary.
pub struct DfCommand {
    platform: Platform,
}

impl DfCommand {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl DiskUsageStrategy for DfCommand {
    fn name(&self) -> &'static str {
        "df"
    }

    fn usage(&self, path: &Path) -> Result<DiskInfo, DiskError> {
        let mut cmd = Command::new("df");
        match self.platform {
            // BSD-derived df has no -P; its default output is already POSIX-shaped.
            Platform::Mac => {
                cmd.arg("-k");
            }
            _ => {
                cmd.args(["-k", "-P"]);
            }
        }
        let output = cmd.arg(path).output()?;
        if !output.status.success() {
            return Err(DiskError::ExitStatus(output.status));
        }
        parse_df_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract total/used/free from `df -k` output: kilobyte counts at fields
/// 1..=3 of the second line, converted to bytes.
pub fn parse_df_output(output: &str) -> Result<DiskInfo, DiskError> {
    let mut lines = output.lines();
    let _header = lines.next().ok_or(DiskError::TooFewLines)?;
    let data = lines.next().ok_or(DiskError::TooFewLines)?;
    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(DiskError::TooFewFields(fields.len()));
    }

    const KB: u64 = 1024;
    let parse = |field: &'static str, value: &str| {
        value.parse::<u64>().map_err(|_| DiskError::BadNumber {
            field,
            value: value.to_string(),
        })
    };
    Ok(DiskInfo {
        total: parse("total", fields[1])? * KB,
        used: parse("used", fields[2])? * KB,
        free: parse("free", fields[3])? * KB,
    })
}

/// Ordered fallback chain. Tiers are tried in order and the first success
/// wins; exhaustion yields the all-zero sentinel so disk trouble never fails
/// a report.
pub struct DiskResolver {
    strategies: Vec<Box<dyn DiskUsageStrategy>>,
}

impl DiskResolver {
    pub fn new(strategies: Vec<Box<dyn DiskUsageStrategy>>) -> Self {
        Self { strategies }
    }

    /// The production chain: native query, then df.
    pub fn system(platform: Platform) -> Self {
        Self::new(vec![
            Box::new(NativeUsage),
            Box::new(DfCommand::new(platform)),
        ])
    }

    pub fn resolve(&self, path: &Path) -> DiskInfo {
        for strategy in &self.strategies {
            match strategy.usage(path) {
                Ok(info) => return info,
                Err(e) => tracing::debug!(
                    strategy = strategy.name(),
                    path = %path.display(),
                    error = %e,
                    "disk usage strategy failed"
                ),
            }
        }
        tracing::warn!(path = %path.display(), "all disk usage strategies failed; reporting zeroes");
        DiskInfo::default()
    }
}
