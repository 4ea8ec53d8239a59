pub mod html;
mod sections;

use crate::snapshot::{Health, Snapshot, DISK_CRITICAL_PERCENT};

pub const CPU_ISSUE_PERCENT: f64 = 80.0;
pub const MEMORY_ISSUE_PERCENT: f64 = 85.0;

const STYLE: &str = include_str!("dashboard.css");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub health: Health,
    pub issues: Vec<String>,
}

// Groups that failed to collect contribute nothing.
pub fn assess(snapshot: &Snapshot) -> Assessment {
    let mut issues = Vec::new();
    let mut usage_issue = false;
    let mut disk_issue = false;

    if let Some(cpu) = snapshot.cpu.collected() {
        if cpu.usage_percent > CPU_ISSUE_PERCENT {
            usage_issue = true;
            issues.push("High CPU usage".to_string());
        }
    }
    if let Some(mem) = snapshot.memory.collected() {
        if mem.usage_percent > MEMORY_ISSUE_PERCENT {
            usage_issue = true;
            issues.push("High memory usage".to_string());
        }
    }
    if let Some(disk) = snapshot.disk.collected() {
        for fs in &disk.filesystems {
            if fs.usage_percent >= DISK_CRITICAL_PERCENT {
                disk_issue = true;
                issues.push(format!("Critical disk space on {}", fs.mountpoint));
            }
        }
    }

    let health = if disk_issue {
        Health::Critical
    } else if usage_issue {
        Health::Warning
    } else {
        Health::Ok
    };
    Assessment { health, issues }
}

pub fn render(snapshot: &Snapshot) -> String {
    let assessment = assess(snapshot);
    let title = match snapshot.system.collected() {
        Some(sys) => format!("System Health Dashboard - {}", html::escape(&sys.hostname)),
        None => "System Health Dashboard".to_string(),
    };

    let content = [
        sections::system_overview(&snapshot.system, &assessment),
        sections::performance(&snapshot.cpu, &snapshot.memory),
        sections::disk(&snapshot.disk),
        sections::network(&snapshot.network),
        sections::security(&snapshot.security),
        sections::services(&snapshot.services),
    ];

    let page = vec![
        "<!DOCTYPE html>".to_string(),
        r#"<html lang="en">"#.to_string(),
        "<head>".to_string(),
        r#"<meta charset="UTF-8">"#.to_string(),
        r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#.to_string(),
        format!("<title>{title}</title>"),
        format!("<style>\n{STYLE}</style>"),
        "</head>".to_string(),
        "<body>".to_string(),
        r#"<div class="dashboard">"#.to_string(),
        sections::header(&snapshot.system),
        r#"<div class="content">"#.to_string(),
        content.join("\n"),
        "</div>".to_string(),
        format!(
            r#"<div class="footer">Generated by healthdash {}</div>"#,
            env!("CARGO_PKG_VERSION")
        ),
        "</div>".to_string(),
        "</body>".to_string(),
        "</html>".to_string(),
    ];
    let mut out = page.join("\n");
    out.push('\n');
    out
}
