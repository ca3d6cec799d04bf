//! Host metrics tool: a fixed-shape, point-in-time snapshot of OS, CPU,
//! memory, disk and network counters. Rebuilt from scratch on every call.

use crate::envelope::Envelope;
use crate::state::AppState;
use crate::tools::{round1, round2};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use sysinfo::{Disk, System};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::time::{sleep, Duration};
use tracing::debug;

pub const NAME: &str = "get_system_info";
pub const DESCRIPTION: &str =
    "Get comprehensive system information including hardware and OS details";

// An instantaneous CPU reading without a preceding window is unreliable, so
// the utilization figure is a real 1-second average. The wait is a tokio
// sleep: it parks this call only, never unrelated connections.
const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

const GIB: f64 = (1024u64 * 1024 * 1024) as f64;
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize)]
pub struct HostMetricsRecord {
    pub timestamp: String,
    pub system: SystemSection,
    pub cpu: CpuSection,
    pub memory: MemorySection,
    pub disks: Vec<DiskEntry>,
    pub network: NetworkSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemSection {
    pub os: String,
    pub os_version: String,
    pub os_release: String,
    pub machine: String,
    pub processor: String,
    pub hostname: String,
    pub boot_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuSection {
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub current_frequency_mhz: FrequencyMhz,
    pub max_frequency_mhz: FrequencyMhz,
    pub cpu_usage_percent: f64,
}

/// Clock frequency, or the literal string "Unknown" when the counter is not
/// exposed. Never a numeric placeholder like 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FrequencyMhz {
    Mhz(u64),
    Unknown(&'static str),
}

impl FrequencyMhz {
    pub fn from_mhz(mhz: u64) -> Self {
        if mhz == 0 {
            FrequencyMhz::Unknown(UNKNOWN)
        } else {
            FrequencyMhz::Mhz(mhz)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemorySection {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskEntry {
    pub device: String,
    pub mountpoint: String,
    pub filesystem: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSection {
    pub hostname: String,
    pub local_ip: String,
}

pub async fn run(state: &AppState) -> Envelope {
    match collect(state).await {
        Ok(record) => match serde_json::to_value(&record) {
            Ok(data) => Envelope::ok(data, "System information retrieved successfully"),
            Err(err) => Envelope::err(format!("Failed to get system information: {err}")),
        },
        Err(err) => Envelope::err(describe_failure(&err)),
    }
}

/// Permission problems outside the per-mount loop abort the whole call and
/// are called out as such; everything else gets the generic prefix.
fn describe_failure(err: &anyhow::Error) -> String {
    let denied = err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::PermissionDenied)
    });
    if denied {
        format!("Permission denied accessing system information: {err:#}")
    } else {
        format!("Failed to get system information: {err:#}")
    }
}

async fn collect(state: &AppState) -> Result<HostMetricsRecord> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format capture timestamp")?;
    let boot_time = OffsetDateTime::from_unix_timestamp(System::boot_time() as i64)
        .context("boot time out of range")?
        .format(&Rfc3339)
        .context("format boot time")?;

    // First half of the CPU sample. The handle is unlocked while the window
    // elapses so other tool calls are not held up behind the wait.
    {
        let mut sys = state.sys.lock().await;
        sys.refresh_cpu_usage();
    }
    sleep(CPU_SAMPLE_WINDOW).await;

    let (system, cpu, memory) = {
        let mut sys = state.sys.lock().await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let system = SystemSection {
            os: System::name().unwrap_or_else(|| UNKNOWN.into()),
            os_version: System::os_version().unwrap_or_else(|| UNKNOWN.into()),
            os_release: System::kernel_version().unwrap_or_else(|| UNKNOWN.into()),
            machine: System::cpu_arch(),
            processor: sys
                .cpus()
                .first()
                .map(|c| c.brand().to_string())
                .unwrap_or_else(|| UNKNOWN.into()),
            hostname: System::host_name().unwrap_or_else(|| UNKNOWN.into()),
            boot_time,
        };

        let current = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);
        let max = sys.cpus().iter().map(|c| c.frequency()).max().unwrap_or(0);
        let cpu = CpuSection {
            physical_cores: System::physical_core_count(),
            logical_cores: sys.cpus().len(),
            current_frequency_mhz: FrequencyMhz::from_mhz(current),
            max_frequency_mhz: FrequencyMhz::from_mhz(max),
            cpu_usage_percent: round2(f64::from(sys.global_cpu_usage())),
        };

        (system, cpu, memory_section(&sys))
    };

    let disks = {
        let mut disks = state.disks.lock().await;
        disks.refresh(true);
        let entries: Vec<DiskEntry> = disks.list().iter().filter_map(disk_entry).collect();
        debug!(mounts = entries.len(), "disk usage gathered");
        entries
    };

    Ok(HostMetricsRecord {
        timestamp,
        system,
        cpu,
        memory,
        disks,
        network: network_section(),
    })
}

fn memory_section(sys: &System) -> MemorySection {
    let total = sys.total_memory();
    let used = sys.used_memory();
    let usage_percent = if total > 0 {
        round1(used as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    MemorySection {
        total_gb: round2(total as f64 / GIB),
        available_gb: round2(sys.available_memory() as f64 / GIB),
        used_gb: round2(used as f64 / GIB),
        usage_percent,
    }
}

/// Attempt to read usage for one mount; `None` drops the entry. Mounts we
/// are not allowed to stat and pseudo-filesystems reporting zero capacity
/// are skipped without failing the whole call.
fn disk_entry(disk: &Disk) -> Option<DiskEntry> {
    if !mount_accessible(disk.mount_point()) {
        return None;
    }
    let total = disk.total_space();
    if total == 0 {
        return None;
    }
    let free = disk.available_space();
    let used = total.saturating_sub(free);
    Some(DiskEntry {
        device: disk.name().to_string_lossy().into_owned(),
        mountpoint: disk.mount_point().to_string_lossy().into_owned(),
        filesystem: disk.file_system().to_string_lossy().into_owned(),
        total_gb: round2(total as f64 / GIB),
        used_gb: round2(used as f64 / GIB),
        free_gb: round2(free as f64 / GIB),
        usage_percent: round1(used as f64 / total as f64 * 100.0),
    })
}

fn mount_accessible(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        // Only a permission error disqualifies the mount.
        Err(err) => err.kind() != ErrorKind::PermissionDenied,
    }
}

fn network_section() -> NetworkSection {
    match resolve_network() {
        Some((hostname, local_ip)) => NetworkSection { hostname, local_ip },
        None => NetworkSection {
            hostname: UNKNOWN.into(),
            local_ip: UNKNOWN.into(),
        },
    }
}

fn resolve_network() -> Option<(String, String)> {
    let hostname = hostname::get().ok()?.into_string().ok()?;
    let iface = netdev::get_default_interface().ok()?;
    let local_ip = iface
        .ipv4
        .first()
        .map(|net| net.addr().to_string())
        .or_else(|| iface.ipv6.first().map(|net| net.addr().to_string()))?;
    Some((hostname, local_ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frequency_sentinel_is_the_unknown_string() {
        assert_eq!(
            serde_json::to_value(FrequencyMhz::from_mhz(0)).unwrap(),
            json!("Unknown")
        );
        assert_eq!(
            serde_json::to_value(FrequencyMhz::from_mhz(2400)).unwrap(),
            json!(2400)
        );
    }

    #[test]
    fn gigabyte_conversion_rounds_to_two_decimals() {
        // 8 GiB plus a bit of change
        let bytes = 8 * 1024_u64.pow(3) + 123_456_789;
        assert_eq!(round2(bytes as f64 / GIB), 8.11);
    }

    #[test]
    fn permission_denied_gets_its_own_prefix() {
        let denied = anyhow::Error::new(std::io::Error::new(
            ErrorKind::PermissionDenied,
            "mount locked down",
        ));
        assert!(describe_failure(&denied).starts_with("Permission denied accessing"));

        let other = anyhow::anyhow!("sensor went away");
        assert!(describe_failure(&other).starts_with("Failed to get system information"));
    }

    #[test]
    fn missing_mounts_are_not_treated_as_permission_errors() {
        assert!(mount_accessible(Path::new("/definitely/not/a/mount/point")));
    }
}
