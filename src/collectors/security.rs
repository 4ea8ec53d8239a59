use super::host::Host;
use super::{run, CollectError};
use crate::config::CollectConfig;
use crate::snapshot::{Firewall, SecurityMetrics};
use chrono::NaiveDateTime;
use tracing::debug;

// `dnf`/`yum check-update` exit status meaning "updates are available".
const UPDATES_AVAILABLE: i32 = 100;
const OBSOLETING_HEADER: &str = "Obsoleting Packages";

pub async fn collect<H: Host>(
    host: &H,
    cfg: &CollectConfig,
    now: NaiveDateTime,
) -> Result<SecurityMetrics, CollectError> {
    let selinux = selinux_status(host).await;
    let firewall = firewall_status(host).await;
    let pending_updates = pending_updates(host).await;
    let failed_logins = failed_logins(host, &cfg.auth_logs, now).await;

    Ok(SecurityMetrics {
        selinux,
        firewall,
        pending_updates,
        failed_logins,
    })
}

async fn selinux_status<H: Host>(host: &H) -> Option<String> {
    match run(host, "getenforce", &[]).await {
        Ok(output) if output.success() => {
            let status = output.stdout.trim();
            (!status.is_empty()).then(|| status.to_string())
        }
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "getenforce unavailable");
            None
        }
    }
}

async fn firewall_status<H: Host>(host: &H) -> Firewall {
    for (unit, firewall) in [
        ("firewalld", Firewall::Firewalld),
        ("iptables", Firewall::Iptables),
    ] {
        match run(host, "systemctl", &["is-active", unit]).await {
            Ok(output) if output.success() => return firewall,
            Ok(_) => {}
            Err(err) => debug!(unit, error = %err, "firewall check failed"),
        }
    }
    Firewall::Inactive
}

async fn pending_updates<H: Host>(host: &H) -> Option<u32> {
    let manager = if host.path_exists("/usr/bin/dnf").await {
        "dnf"
    } else {
        "yum"
    };
    let output = match run(host, manager, &["check-update", "-q"]).await {
        Ok(output) => output,
        Err(err) => {
            debug!(manager, error = %err, "update check unavailable");
            return None;
        }
    };
    match output.code {
        Some(0) => Some(0),
        Some(UPDATES_AVAILABLE) => Some(count_update_rows(&output.stdout)),
        code => {
            debug!(manager, ?code, "update check failed");
            None
        }
    }
}

// Counts `name.arch version repo` rows of `check-update` output. A name too
// long for its column is printed alone with the rest on the next, indented
// line. Rows after `Obsoleting Packages` repeat packages already listed.
pub fn count_update_rows(text: &str) -> u32 {
    let mut count = 0;
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        if line.starts_with(OBSOLETING_HEADER) {
            break;
        }
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(package) = tokens.first() else {
            continue;
        };
        if !package.contains('.') {
            continue;
        }
        let wrapped = tokens.len() == 1
            && lines
                .peek()
                .is_some_and(|next| next.starts_with(char::is_whitespace) && !next.trim().is_empty());
        if tokens.len() == 3 || wrapped {
            count += 1;
        }
    }
    count
}

async fn failed_logins<H: Host>(host: &H, logs: &[String], now: NaiveDateTime) -> Option<u32> {
    for path in logs {
        match host.read_file(path).await {
            Ok(text) => return Some(count_failed_logins(&text, now)),
            Err(err) => debug!(path = %path, error = %err, "auth log unreadable"),
        }
    }
    None
}

// Counts `Failed password` entries from the month of `now`. Both the
// classic syslog stamp (`Mar 14 09:11:02`) and the RFC 3339 one written by
// newer rsyslog defaults (`2024-03-14T09:11:02+00:00`) are recognised.
pub fn count_failed_logins(text: &str, now: NaiveDateTime) -> u32 {
    let month = now.format("%b").to_string();
    let year_month = format!("{}-", now.format("%Y-%m"));
    text.lines()
        .filter(|l| {
            l.starts_with(&year_month) || l.split_whitespace().next() == Some(month.as_str())
        })
        .filter(|l| l.contains("Failed password"))
        .count() as u32
}
