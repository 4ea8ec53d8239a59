use super::host::Host;
use super::processes::{top_processes, SortKey};
use super::{read, CollectError};
use crate::snapshot::{round1, CpuMetrics};

const UNKNOWN_MODEL: &str = "Unknown";

pub async fn collect<H: Host>(host: &H, top_n: usize) -> Result<CpuMetrics, CollectError> {
    let stat = read(host, "/proc/stat").await?;
    let usage_percent = parse_cpu_usage(&stat)?;

    let top_processes = top_processes(host, SortKey::Cpu, top_n).await?;

    let model = read(host, "/proc/cpuinfo")
        .await
        .ok()
        .and_then(|text| parse_cpu_model(&text))
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

    Ok(CpuMetrics {
        usage_percent,
        model,
        top_processes,
    })
}

// The counters are cumulative since boot, so this is the average load over
// the whole uptime rather than the current utilization.
pub fn parse_cpu_usage(stat: &str) -> Result<f64, CollectError> {
    let line = stat
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| CollectError::parse("/proc/stat", "aggregate cpu line not found"))?;

    let times = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CollectError::parse("/proc/stat", err.to_string()))?;

    if times.len() < 4 {
        return Err(CollectError::parse(
            "/proc/stat",
            format!("expected at least 4 counters, got {}", times.len()),
        ));
    }

    let total: u64 = times.iter().sum();
    let idle = times[3];
    if total == 0 {
        return Ok(0.0);
    }
    Ok(round1(total.saturating_sub(idle) as f64 / total as f64 * 100.0))
}

pub fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter(|l| l.starts_with("model name"))
        .find_map(|l| l.split_once(':'))
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
