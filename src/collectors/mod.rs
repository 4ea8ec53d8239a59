pub mod cpu;
pub mod disk;
#[cfg(test)]
pub mod fake;
pub mod host;
pub mod memory;
pub mod network;
pub mod processes;
pub mod security;
pub mod services;
pub mod system;

use crate::config::CollectConfig;
use crate::snapshot::{Group, Snapshot};
use chrono::NaiveDateTime;
use host::{CommandOutput, Host};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with status {code:?}")]
    Status { program: String, code: Option<i32> },
    #[error("failed to parse {source_name}: {detail}")]
    Parse {
        source_name: &'static str,
        detail: String,
    },
}

impl CollectError {
    pub fn parse(source_name: &'static str, detail: impl Into<String>) -> Self {
        CollectError::Parse {
            source_name,
            detail: detail.into(),
        }
    }
}

pub async fn collect_snapshot<H: Host>(
    host: &H,
    cfg: &CollectConfig,
    captured_at: NaiveDateTime,
) -> Snapshot {
    info!("collecting system metrics");
    let started = Instant::now();

    let snapshot = Snapshot {
        system: guard("system", system::collect(host, captured_at).await),
        cpu: guard("cpu", cpu::collect(host, cfg.top_processes).await),
        memory: guard("memory", memory::collect(host, cfg.top_processes).await),
        disk: guard("disk", disk::collect(host, cfg).await),
        network: guard("network", network::collect(host, cfg).await),
        services: guard("services", services::collect(host, &cfg.services).await),
        security: guard("security", security::collect(host, cfg, captured_at).await),
    };

    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    let failed = snapshot.failed_groups();
    info!(
        elapsed = %humantime::format_duration(elapsed),
        failed = ?failed,
        "metrics collection completed"
    );
    snapshot
}

fn guard<T>(group: &'static str, result: Result<T, CollectError>) -> Group<T> {
    match result {
        Ok(value) => Group::Collected(value),
        Err(err) => {
            error!(group, error = %err, "failed to collect metric group");
            Group::Failed {
                error: err.to_string(),
            }
        }
    }
}

pub(crate) async fn read<H: Host>(host: &H, path: &str) -> Result<String, CollectError> {
    host.read_file(path)
        .await
        .map_err(|source| CollectError::Read {
            path: path.to_string(),
            source,
        })
}

pub(crate) async fn run<H: Host>(
    host: &H,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput, CollectError> {
    host.run(program, args)
        .await
        .map_err(|source| CollectError::Spawn {
            program: program.to_string(),
            source,
        })
}

pub(crate) async fn run_ok<H: Host>(
    host: &H,
    program: &str,
    args: &[&str],
) -> Result<String, CollectError> {
    let output = run(host, program, args).await?;
    if !output.success() {
        return Err(CollectError::Status {
            program: program.to_string(),
            code: output.code,
        });
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::fake::FakeHost;
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn captured_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    fn healthy_host() -> FakeHost {
        let mut host = FakeHost::new();
        host.add_file("/etc/redhat-release", "Rocky Linux release 9.3 (Blue Onyx)\n")
            .add_file("/proc/uptime", "200000.52 790000.10\n")
            .add_file("/proc/loadavg", "0.52 0.48 0.40 2/311 12345\n")
            .add_file("/proc/stat", "cpu  100 0 100 800 0 0 0 0 0 0\n")
            .add_file("/proc/cpuinfo", "model name\t: Intel(R) Xeon(R)\n")
            .add_file(
                "/proc/meminfo",
                "MemTotal: 1000 kB\nMemFree: 300 kB\nMemAvailable: 500 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
            )
            .add_command("hostname -f", 0, "web01.example.com\n")
            .add_command("ps aux --sort=-%cpu --no-headers", 0, "")
            .add_command("ps aux --sort=-%mem --no-headers", 0, "")
            .add_command(
                "df -hP",
                0,
                "Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 50G 20G 30G 40% /\n",
            )
            .add_command("df -iP", 0, "Filesystem Inodes IUsed IFree IUse% Mounted on\n")
            .add_command(
                "find /var/log -type f -size +100M -exec ls -lh {} +",
                0,
                "",
            )
            .add_command(
                "ip addr show",
                0,
                "1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536\n    inet 127.0.0.1/8 scope host lo\n",
            )
            .add_command("ip route show default", 0, "")
            .add_command("ss -tuln", 0, "")
            .add_command("systemctl list-unit-files --type=service --no-legend --no-pager", 0, "")
            .add_command("systemctl list-units --failed --no-legend --plain --no-pager", 0, "")
            .add_command("getenforce", 0, "Enforcing\n")
            .add_command("systemctl is-active firewalld", 0, "active\n")
            .add_command("yum check-update -q", 0, "")
            .add_file("/var/log/secure", "");
        host
    }

    #[tokio::test]
    async fn failing_group_does_not_affect_others() {
        let mut host = healthy_host();
        host.add_file("/proc/meminfo", "garbage without totals\n");

        let snapshot = collect_snapshot(&host, &CollectConfig::default(), captured_at()).await;

        assert!(snapshot.memory.error().is_some());
        assert_eq!(snapshot.failed_groups(), vec!["memory"]);
        assert!(snapshot.system.collected().is_some());
        assert!(snapshot.cpu.collected().is_some());
        assert!(snapshot.disk.collected().is_some());
        assert!(snapshot.network.collected().is_some());
        assert!(snapshot.services.collected().is_some());
        assert!(snapshot.security.collected().is_some());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["memory"]["error"].is_string());
        assert!(json["cpu"].get("error").is_none());
    }

    #[tokio::test]
    async fn healthy_host_collects_every_group() {
        let host = healthy_host();
        let snapshot = collect_snapshot(&host, &CollectConfig::default(), captured_at()).await;

        let cpu = snapshot.cpu.collected().expect("cpu");
        assert_eq!(cpu.usage_percent, 20.0);
        let memory = snapshot.memory.collected().expect("memory");
        assert_eq!(memory.usage_percent, 50.0);
        assert_eq!(memory.swap_usage_percent, 0.0);
        let system = snapshot.system.collected().expect("system");
        assert_eq!(system.uptime, "2d 7h");
        assert_eq!(system.fqdn, "web01.example.com");
    }

    #[tokio::test]
    async fn failed_command_marks_only_its_group() {
        let mut host = healthy_host();
        host.add_command("df -hP", 1, "");

        let snapshot = collect_snapshot(&host, &CollectConfig::default(), captured_at()).await;
        let err = snapshot.disk.error().expect("disk error");
        assert!(err.contains("df"));
        assert!(snapshot.memory.collected().is_some());
    }
}
