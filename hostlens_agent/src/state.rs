//! Shared agent state: persistent sysinfo handles reused across tool calls.

use std::sync::Arc;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, ProcessRefreshKind, RefreshKind, System};
use tokio::sync::Mutex;

pub type SharedSystem = Arc<Mutex<System>>;
pub type SharedDisks = Arc<Mutex<Disks>>;

#[derive(Clone)]
pub struct AppState {
    // Kept alive across requests so per-process CPU usage is a delta
    // between calls instead of a cold zero every time.
    pub sys: SharedSystem,
    pub disks: SharedDisks,
}

impl AppState {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything())
            .with_processes(ProcessRefreshKind::everything().without_tasks());

        let mut sys = System::new_with_specifics(refresh);
        sys.refresh_all();

        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
