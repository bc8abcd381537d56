// Container/sandbox detection: sentinel file, then init's cgroup membership

use std::path::Path;

/// Substrings of /proc/1/cgroup that identify a container runtime.
const CGROUP_MARKERS: &[&str] = &["docker", "kubepods", "lxc"];

/// True when the process appears to run inside a container. Fails open:
/// unreadable or missing sources mean "not containerized".
pub fn is_containerized() -> bool {
    detect_under(Path::new("/"))
}

/// Detection relative to `root`, so tests can lay out a fake filesystem.
/// The cgroup file only exists on Linux-family systems; elsewhere the read
/// fails and the check falls through.
pub fn detect_under(root: &Path) -> bool {
    if root.join(".dockerenv").exists() {
        return true;
    }
    if let Ok(content) = std::fs::read_to_string(root.join("proc/1/cgroup")) {
        return CGROUP_MARKERS.iter().any(|m| content.contains(m));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn bare_root_is_not_containerized() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!detect_under(dir.path()));
    }

    #[test]
    fn dockerenv_sentinel_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(".dockerenv"), "").unwrap();
        assert!(detect_under(dir.path()));
    }

    #[test]
    fn cgroup_markers_detected() {
        for marker in ["docker", "kubepods", "lxc"] {
            let dir = tempfile::TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("proc/1")).unwrap();
            fs::write(
                dir.path().join("proc/1/cgroup"),
                format!("0::/system.slice/{marker}-abc123.scope\n"),
            )
            .unwrap();
            assert!(detect_under(dir.path()), "{marker} should be detected");
        }
    }

    #[test]
    fn host_cgroup_is_not_containerized() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("proc/1")).unwrap();
        fs::write(dir.path().join("proc/1/cgroup"), "0::/init.scope\n").unwrap();
        assert!(!detect_under(dir.path()));
    }
}
