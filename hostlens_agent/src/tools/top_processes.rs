//! Resource ranking tool: scores every live process by a weighted blend of
//! CPU and memory usage, then returns the top slice with page totals.

use crate::envelope::Envelope;
use crate::state::AppState;
use crate::tools::round2;
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::time::{SystemTime, UNIX_EPOCH};
use sysinfo::{Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate};
use tracing::debug;

pub const NAME: &str = "get_top_resource_processes";
pub const DESCRIPTION: &str =
    "Get the top processes consuming the most system resources (CPU + Memory combined)";

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;
const CPU_WEIGHT: f64 = 0.6;
const MEMORY_WEIGHT: f64 = 0.4;
const CMDLINE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_mb: f64,
    pub resource_score: f64,
    pub status: String,
    pub age: String,
    pub cmdline: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingSummary {
    pub total_processes_shown: usize,
    pub limit_applied: usize,
    pub combined_cpu_usage: f64,
    pub combined_memory_mb: f64,
    pub combined_memory_gb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProcesses {
    pub top_processes: Vec<ProcessSample>,
    pub summary: RankingSummary,
}

pub async fn run(state: &AppState, arguments: &Value) -> Envelope {
    let limit = normalize_limit(arguments.get("limit").and_then(Value::as_i64));

    let samples: Vec<ProcessSample> = {
        let mut sys = state.sys.lock().await;
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything().without_tasks(),
        );
        let total_memory = sys.total_memory();
        let now = unix_now();
        sys.processes()
            .values()
            .filter_map(|p| sample_process(p, total_memory, now))
            .collect()
    };
    debug!(sampled = samples.len(), limit, "process table enumerated");

    let ranked = rank(samples, limit);
    let shown = ranked.summary.total_processes_shown;
    match serde_json::to_value(&ranked) {
        Ok(data) => Envelope::ok(
            data,
            format!("Retrieved top {shown} resource-consuming processes"),
        ),
        Err(err) => Envelope::err(format!("Failed to get top resource processes: {err}")),
    }
}

/// Absent, null or non-positive limits fall back to the default; anything
/// above the cap is clamped silently.
pub(crate) fn normalize_limit(requested: Option<i64>) -> usize {
    match requested {
        Some(v) if v > MAX_LIMIT as i64 => MAX_LIMIT,
        Some(v) if v > 0 => v as usize,
        _ => DEFAULT_LIMIT,
    }
}

pub(crate) fn resource_score(cpu_percent: f64, memory_percent: f64) -> f64 {
    cpu_percent * CPU_WEIGHT + memory_percent * MEMORY_WEIGHT
}

pub(crate) fn format_age(age_seconds: u64) -> String {
    if age_seconds < 60 {
        format!("{age_seconds}s")
    } else if age_seconds < 3600 {
        format!("{}m", age_seconds / 60)
    } else {
        format!("{}h", age_seconds / 3600)
    }
}

/// Best-effort sampling of one process. Zombies and entries with nothing
/// readable (typically processes that exited mid-refresh) yield `None` and
/// are dropped without failing the enumeration.
fn sample_process(process: &Process, total_memory: u64, now_unix: u64) -> Option<ProcessSample> {
    if matches!(process.status(), ProcessStatus::Zombie) {
        return None;
    }
    let name = process.name().to_string_lossy().into_owned();
    let cmdline = join_cmdline(process.cmd());
    if name.is_empty() && cmdline.is_empty() {
        return None;
    }

    let cpu_percent = f64::from(process.cpu_usage());
    let rss = process.memory();
    let memory_percent = if total_memory > 0 {
        rss as f64 / total_memory as f64 * 100.0
    } else {
        0.0
    };

    Some(ProcessSample {
        pid: process.pid().as_u32(),
        name,
        cpu_percent: round2(cpu_percent),
        memory_percent: round2(memory_percent),
        memory_mb: round2(rss as f64 / (1024.0 * 1024.0)),
        resource_score: round2(resource_score(cpu_percent, memory_percent)),
        status: process.status().to_string(),
        age: format_age(now_unix.saturating_sub(process.start_time())),
        cmdline,
    })
}

fn join_cmdline(cmd: &[OsString]) -> String {
    let joined = cmd
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    joined.chars().take(CMDLINE_MAX_CHARS).collect()
}

/// Order by descending score, keep the first `limit` entries, and total the
/// returned page only. Ties keep enumeration order (stable sort); that
/// ordering is not part of the contract.
pub(crate) fn rank(mut samples: Vec<ProcessSample>, limit: usize) -> TopProcesses {
    samples.sort_by(|a, b| b.resource_score.total_cmp(&a.resource_score));
    samples.truncate(limit);

    let combined_cpu: f64 = samples.iter().map(|p| p.cpu_percent).sum();
    let combined_memory_mb: f64 = samples.iter().map(|p| p.memory_mb).sum();
    let summary = RankingSummary {
        total_processes_shown: samples.len(),
        limit_applied: limit,
        combined_cpu_usage: round2(combined_cpu),
        combined_memory_mb: round2(combined_memory_mb),
        combined_memory_gb: round2(combined_memory_mb / 1024.0),
    };

    TopProcesses {
        top_processes: samples,
        summary,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, cpu: f64, mem_pct: f64, mem_mb: f64) -> ProcessSample {
        ProcessSample {
            pid,
            name: format!("proc-{pid}"),
            cpu_percent: cpu,
            memory_percent: mem_pct,
            memory_mb: mem_mb,
            resource_score: round2(resource_score(cpu, mem_pct)),
            status: "Run".into(),
            age: "5s".into(),
            cmdline: String::new(),
        }
    }

    #[test]
    fn limit_normalization_table() {
        assert_eq!(normalize_limit(None), 10);
        assert_eq!(normalize_limit(Some(0)), 10);
        assert_eq!(normalize_limit(Some(-3)), 10);
        assert_eq!(normalize_limit(Some(5)), 5);
        assert_eq!(normalize_limit(Some(50)), 50);
        assert_eq!(normalize_limit(Some(75)), 50);
    }

    #[test]
    fn score_weights_cpu_sixty_memory_forty() {
        assert_eq!(round2(resource_score(50.0, 10.0)), 34.0);
        assert_eq!(round2(resource_score(0.0, 0.0)), 0.0);
    }

    #[test]
    fn age_rendering_truncates_to_integer_units() {
        assert_eq!(format_age(45), "45s");
        assert_eq!(format_age(125), "2m");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(59), "59s");
        assert_eq!(format_age(3599), "59m");
    }

    #[test]
    fn ranking_sorts_descending_and_truncates() {
        let samples = vec![
            sample(1, 10.0, 5.0, 100.0),
            sample(2, 90.0, 20.0, 800.0),
            sample(3, 40.0, 40.0, 400.0),
        ];
        let ranked = rank(samples, 2);
        let pids: Vec<u32> = ranked.top_processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 3]);
        for pair in ranked.top_processes.windows(2) {
            assert!(pair[0].resource_score >= pair[1].resource_score);
        }
    }

    #[test]
    fn summary_reflects_only_the_returned_page() {
        let samples = vec![
            sample(1, 30.0, 1.0, 512.0),
            sample(2, 20.0, 1.0, 256.0),
            sample(3, 10.0, 1.0, 128.0),
        ];
        let ranked = rank(samples, 2);
        assert_eq!(ranked.summary.total_processes_shown, 2);
        assert_eq!(ranked.summary.limit_applied, 2);
        assert_eq!(ranked.summary.combined_cpu_usage, 50.0);
        assert_eq!(ranked.summary.combined_memory_mb, 768.0);
        assert_eq!(ranked.summary.combined_memory_gb, 0.75);
    }

    #[test]
    fn fewer_processes_than_limit_is_fine() {
        let ranked = rank(vec![sample(1, 1.0, 1.0, 10.0)], 10);
        assert_eq!(ranked.top_processes.len(), 1);
        assert_eq!(ranked.summary.total_processes_shown, 1);
        assert_eq!(ranked.summary.limit_applied, 10);
    }

    #[test]
    fn failed_samples_are_skipped_without_aborting() {
        // One entry fails attribute collection, one succeeds; the failing
        // one is simply absent from the result.
        let attempts: Vec<Option<ProcessSample>> =
            vec![None, Some(sample(7, 12.0, 3.0, 64.0))];
        let collected: Vec<ProcessSample> = attempts.into_iter().flatten().collect();
        let ranked = rank(collected, 10);
        assert_eq!(ranked.top_processes.len(), 1);
        assert_eq!(ranked.top_processes[0].pid, 7);
    }

    #[test]
    fn cmdline_is_capped_at_one_hundred_chars() {
        let args: Vec<OsString> = (0..30).map(|i| OsString::from(format!("arg{i}"))).collect();
        let joined = join_cmdline(&args);
        assert_eq!(joined.chars().count(), 100);
        assert!(joined.starts_with("arg0 arg1"));
    }

    #[test]
    fn empty_cmdline_is_empty_string() {
        assert_eq!(join_cmdline(&[]), "");
    }
}
