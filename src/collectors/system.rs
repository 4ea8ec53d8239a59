use super::host::Host;
use super::{read, run, CollectError};
use crate::snapshot::{round2, LoadAverage, SystemInfo};
use chrono::NaiveDateTime;
use std::env::consts::{ARCH, OS};

pub async fn collect<H: Host>(
    host: &H,
    captured_at: NaiveDateTime,
) -> Result<SystemInfo, CollectError> {
    let hostname = host.host_name().unwrap_or_else(|| "localhost".to_string());
    let fqdn = fqdn(host).await.unwrap_or_else(|| hostname.clone());
    let os_info = os_description(host).await;
    let kernel = host
        .kernel_version()
        .unwrap_or_else(|| "unknown".to_string());

    let uptime_seconds = parse_uptime(&read(host, "/proc/uptime").await?)?;
    let load_avg = parse_loadavg(&read(host, "/proc/loadavg").await?)?;

    Ok(SystemInfo {
        hostname,
        fqdn,
        os_info,
        kernel,
        architecture: ARCH.to_string(),
        uptime_seconds,
        uptime: format_uptime(uptime_seconds),
        load_avg,
        cpu_cores: host.logical_cpus().max(1),
        timestamp: captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

async fn fqdn<H: Host>(host: &H) -> Option<String> {
    let output = run(host, "hostname", &["-f"]).await.ok()?;
    if !output.success() {
        return None;
    }
    let name = output.stdout.trim();
    (!name.is_empty()).then(|| name.to_string())
}

async fn os_description<H: Host>(host: &H) -> String {
    if let Ok(text) = host.read_file("/etc/redhat-release").await {
        let line = text.trim();
        if !line.is_empty() {
            return line.to_string();
        }
    }
    if let Ok(text) = host.read_file("/etc/os-release").await {
        if let Some(name) = parse_os_release_name(&text) {
            return name;
        }
    }
    host.long_os_version()
        .unwrap_or_else(|| format!("{OS} {ARCH}"))
}

pub fn parse_os_release_name(text: &str) -> Option<String> {
    text.lines()
        .find_map(|l| l.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_uptime(text: &str) -> Result<u64, CollectError> {
    let first = text
        .split_whitespace()
        .next()
        .ok_or_else(|| CollectError::parse("/proc/uptime", "empty"))?;
    let secs: f64 = first
        .parse()
        .map_err(|_| CollectError::parse("/proc/uptime", format!("bad value {first:?}")))?;
    Ok(secs.max(0.0) as u64)
}

pub fn parse_loadavg(text: &str) -> Result<LoadAverage, CollectError> {
    let values = text
        .split_whitespace()
        .take(3)
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CollectError::parse("/proc/loadavg", err.to_string()))?;
    let [one, five, fifteen] = values[..] else {
        return Err(CollectError::parse(
            "/proc/loadavg",
            format!("expected 3 values, got {}", values.len()),
        ));
    };
    Ok(LoadAverage {
        one: round2(one),
        five: round2(five),
        fifteen: round2(fifteen),
    })
}

pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    format!("{days}d {hours}h")
}
