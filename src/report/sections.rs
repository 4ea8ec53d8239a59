use super::html::{
    card, escape, grid, placeholder, progress_bar, section_title, status_class, table, unavailable,
};
use super::Assessment;
use crate::snapshot::{
    CpuMetrics, DiskMetrics, DnsStatus, Group, Health, MemoryMetrics, NetworkMetrics,
    ProcessInfo, SecurityMetrics, ServiceMetrics, SystemInfo,
};

const TOP_PROCESS_ROWS: usize = 5;

pub fn header(system: &Group<SystemInfo>) -> String {
    let subtitle = match system.collected() {
        Some(sys) => format!("{} | {}", escape(&sys.hostname), escape(&sys.timestamp)),
        None => "unknown host".to_string(),
    };
    [
        r#"<div class="header">"#.to_string(),
        "<h1>System Health Dashboard</h1>".to_string(),
        format!(r#"<div class="subtitle">{subtitle}</div>"#),
        "</div>".to_string(),
    ]
    .join("\n")
}

fn health_banner(assessment: &Assessment) -> String {
    let (alert, text) = match assessment.health {
        Health::Ok => ("success", "Excellent"),
        Health::Warning => ("warning", "Needs Attention"),
        Health::Critical | Health::Unknown => ("danger", "Critical Issues"),
    };
    let details = if assessment.issues.is_empty() {
        "All systems operating normally".to_string()
    } else {
        let issues: Vec<String> = assessment.issues.iter().map(|i| escape(i)).collect();
        format!("Issues: {}", issues.join(", "))
    };
    format!(
        r#"<div class="alert alert-{alert}"><strong>Overall System Health: <span class="{}">{text}</span></strong><br>{details}</div>"#,
        status_class(assessment.health)
    )
}

pub fn system_overview(system: &Group<SystemInfo>, assessment: &Assessment) -> String {
    let mut lines = vec![health_banner(assessment)];
    let sys = match system {
        Group::Collected(sys) => sys,
        Group::Failed { error } => {
            lines.push(unavailable("System", error));
            return lines.join("\n");
        }
    };

    let info = format!(
        "<div class=\"info-list\">\n\
         <strong>Hostname:</strong> {}<br>\n\
         <strong>OS:</strong> {}<br>\n\
         <strong>Kernel:</strong> {}<br>\n\
         <strong>Architecture:</strong> {}<br>\n\
         <strong>Uptime:</strong> {} ({} days)<br>\n\
         <strong>CPU Cores:</strong> {}\n\
         </div>",
        escape(&sys.fqdn),
        escape(&sys.os_info),
        escape(&sys.kernel),
        escape(&sys.architecture),
        escape(&sys.uptime),
        sys.uptime_days(),
        sys.cpu_cores
    );
    let load = format!(
        "<div class=\"metric-value {}\">{:.2}</div>\n\
         <div class=\"metric-label\">1 Minute Average</div>\n\
         <div class=\"metric-detail\">5min: {:.2} | 15min: {:.2}</div>",
        status_class(sys.load_status()),
        sys.load_avg.one,
        sys.load_avg.five,
        sys.load_avg.fifteen
    );
    lines.push(grid(&[
        card("System Information", &info),
        card("Load Average", &load),
    ]));
    lines.join("\n")
}

fn usage_body(label: &str, percent: f64, health: Health, detail: String) -> Vec<String> {
    vec![
        format!(
            r#"<div class="metric-value {}">{:.1}%</div>"#,
            status_class(health),
            percent
        ),
        progress_bar(percent, health),
        format!(r#"<div class="metric-label">{}</div>"#, escape(label)),
        format!(r#"<div class="metric-detail">{detail}</div>"#),
    ]
}

pub fn top_processes(title: &str, processes: &[ProcessInfo]) -> String {
    if processes.is_empty() {
        return placeholder("No process data available");
    }
    let rows: Vec<Vec<String>> = processes
        .iter()
        .take(TOP_PROCESS_ROWS)
        .map(|p| {
            vec![
                escape(&p.user),
                escape(&p.pid),
                escape(&p.cpu),
                escape(&p.mem),
                format!("<code>{}</code>", escape(&p.command)),
            ]
        })
        .collect();
    format!(
        "<h4>{}</h4>\n{}",
        escape(title),
        table(&["User", "PID", "CPU%", "MEM%", "Command"], &rows)
    )
}

pub fn performance(cpu: &Group<CpuMetrics>, memory: &Group<MemoryMetrics>) -> String {
    let mut cards = Vec::with_capacity(3);

    match cpu {
        Group::Collected(cpu) => {
            let mut body = usage_body(
                "Processor Utilization",
                cpu.usage_percent,
                cpu.status(),
                escape(&cpu.model),
            );
            body.push(top_processes("Top CPU Processes", &cpu.top_processes));
            cards.push(card("CPU Usage", &body.join("\n")));
        }
        Group::Failed { error } => cards.push(card("CPU Usage", &unavailable("CPU", error))),
    }

    match memory {
        Group::Collected(mem) => {
            let mut ram = usage_body(
                "RAM Utilization",
                mem.usage_percent,
                mem.status(),
                format!(
                    "Used: {} / Total: {} (available {})",
                    mem.used_human(),
                    mem.total_human(),
                    mem.available_human()
                ),
            );
            ram.push(top_processes("Top Memory Processes", &mem.top_processes));
            cards.push(card("Memory Usage", &ram.join("\n")));

            let swap = usage_body(
                "Swap Utilization",
                mem.swap_usage_percent,
                mem.swap_status(),
                format!(
                    "Used: {} / Total: {}",
                    mem.swap_used_human(),
                    mem.swap_total_human()
                ),
            );
            cards.push(card("Swap Usage", &swap.join("\n")));
        }
        Group::Failed { error } => {
            cards.push(card("Memory Usage", &unavailable("Memory", error)));
        }
    }

    [section_title("Performance Metrics"), grid(&cards)].join("\n")
}

pub fn disk(disk: &Group<DiskMetrics>) -> String {
    let mut lines = vec![section_title("Disk Space Analysis")];
    let disk = match disk {
        Group::Collected(disk) => disk,
        Group::Failed { error } => {
            lines.push(unavailable("Disk", error));
            return lines.join("\n");
        }
    };

    let filesystems = if disk.filesystems.is_empty() {
        placeholder("No filesystem data available")
    } else {
        let rows: Vec<Vec<String>> = disk
            .filesystems
            .iter()
            .map(|fs| {
                let health = fs.status();
                vec![
                    escape(&fs.filesystem),
                    escape(&fs.size),
                    escape(&fs.used),
                    escape(&fs.available),
                    format!(
                        r#"{}<span class="{}">{}%</span>"#,
                        progress_bar(f64::from(fs.usage_percent), health),
                        status_class(health),
                        fs.usage_percent
                    ),
                    escape(&fs.mountpoint),
                    format!(r#"<span class="{}">&#9679;</span>"#, status_class(health)),
                ]
            })
            .collect();
        table(
            &["Filesystem", "Size", "Used", "Available", "Usage", "Mountpoint", "Status"],
            &rows,
        )
    };

    let inodes = if disk.inodes.is_empty() {
        placeholder("No inode data available")
    } else {
        let rows: Vec<Vec<String>> = disk
            .inodes
            .iter()
            .map(|i| {
                vec![
                    escape(&i.mountpoint),
                    escape(&i.total),
                    escape(&i.used),
                    escape(&i.available),
                    format!(
                        r#"<span class="{}">{}%</span>"#,
                        status_class(i.status()),
                        i.usage_percent
                    ),
                ]
            })
            .collect();
        table(&["Mountpoint", "Inodes", "Used", "Free", "Usage"], &rows)
    };

    let large_files = if disk.large_files.is_empty() {
        placeholder("No large files found")
    } else {
        let rows: Vec<Vec<String>> = disk
            .large_files
            .iter()
            .map(|f| {
                vec![
                    escape(&f.size),
                    escape(&f.date),
                    format!("<code>{}</code>", escape(&f.path)),
                ]
            })
            .collect();
        table(&["Size", "Date Modified", "File Path"], &rows)
    };

    let body = [
        filesystems,
        "<h4>Inode Usage</h4>".to_string(),
        inodes,
        "<h4>Large Files</h4>".to_string(),
        large_files,
    ]
    .join("\n");
    lines.push(card("Filesystem Usage", &body));
    lines.join("\n")
}

pub fn network(network: &Group<NetworkMetrics>) -> String {
    let mut lines = vec![section_title("Network Status")];
    let net = match network {
        Group::Collected(net) => net,
        Group::Failed { error } => {
            lines.push(unavailable("Network", error));
            return lines.join("\n");
        }
    };

    let interfaces = if net.interfaces.is_empty() {
        placeholder("No network interface data available")
    } else {
        net.interfaces
            .iter()
            .map(|iface| {
                let (state, health) = if iface.up {
                    ("UP", Health::Ok)
                } else {
                    ("DOWN", Health::Critical)
                };
                let addresses = if iface.addresses.is_empty() {
                    "No IP assigned".to_string()
                } else {
                    escape(&iface.addresses.join(", "))
                };
                format!(
                    r#"<div class="interface"><strong>{}</strong> <span class="{}">({state})</span><br><small>{addresses}</small></div>"#,
                    escape(&iface.name),
                    status_class(health)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let gateway = match &net.default_gateway {
        Some(gw) => format!(r#"<span class="status-ok">{}</span>"#, escape(gw)),
        None => r#"<span class="status-warning">Not configured</span>"#.to_string(),
    };
    let dns = match net.dns_status {
        DnsStatus::Ok => r#"<span class="status-ok">Working</span>"#,
        DnsStatus::Failed => r#"<span class="status-critical">Failed</span>"#,
    };
    let connectivity = format!(
        "<div class=\"info-list\">\n\
         <strong>Default Gateway:</strong> {gateway}<br>\n\
         <strong>DNS Resolution:</strong> {dns}<br>\n\
         <strong>Listening Services:</strong> <span class=\"status-ok\">{} ports</span>\n\
         </div>",
        net.listening_ports
    );

    lines.push(grid(&[
        card("Network Interfaces", &interfaces),
        card("Connectivity Status", &connectivity),
    ]));
    lines.join("\n")
}

fn status_card(title: &str, value: &str, health: Health, label: &str) -> String {
    card(
        title,
        &format!(
            "<div class=\"metric-value {}\">{}</div>\n<div class=\"metric-label\">{}</div>",
            status_class(health),
            escape(value),
            escape(label)
        ),
    )
}

fn count_or_unknown(value: Option<u32>) -> String {
    value.map_or_else(|| "Unknown".to_string(), |n| n.to_string())
}

pub fn security(security: &Group<SecurityMetrics>) -> String {
    let mut lines = vec![section_title("Security Status")];
    let sec = match security {
        Group::Collected(sec) => sec,
        Group::Failed { error } => {
            lines.push(unavailable("Security", error));
            return lines.join("\n");
        }
    };

    lines.push(grid(&[
        status_card(
            "SELinux Status",
            sec.selinux.as_deref().unwrap_or("Not available"),
            sec.selinux_health(),
            "Mandatory Access Control",
        ),
        status_card(
            "Firewall Status",
            sec.firewall.label(),
            sec.firewall_health(),
            "Network Protection",
        ),
        status_card(
            "System Updates",
            &count_or_unknown(sec.pending_updates),
            sec.updates_health(),
            "Available Updates",
        ),
        status_card(
            "Failed Logins",
            &count_or_unknown(sec.failed_logins),
            sec.failed_logins_health(),
            "This Month",
        ),
    ]));
    lines.join("\n")
}

pub fn services(services: &Group<ServiceMetrics>) -> String {
    let mut lines = vec![section_title("System Services")];
    let svc = match services {
        Group::Collected(svc) => svc,
        Group::Failed { error } => {
            lines.push(unavailable("Services", error));
            return lines.join("\n");
        }
    };

    let alert = if svc.failed_count == 0 { "success" } else { "warning" };
    lines.push(format!(
        r#"<div class="alert alert-{alert}"><strong>Service Status Summary:</strong> {} monitored services present, {} failed units detected</div>"#,
        svc.services.len(),
        svc.failed_count
    ));

    let body = if svc.services.is_empty() {
        placeholder("No monitored services found on this host")
    } else {
        let rows: Vec<Vec<String>> = svc
            .services
            .iter()
            .map(|s| {
                let health = status_class(s.health());
                let enabled = if s.is_enabled() {
                    Health::Ok
                } else {
                    Health::Warning
                };
                vec![
                    format!("<strong>{}</strong>", escape(&s.name)),
                    format!(r#"<span class="{health}">{}</span>"#, escape(&s.status)),
                    format!(
                        r#"<span class="{}">{}</span>"#,
                        status_class(enabled),
                        escape(&s.enabled)
                    ),
                    format!(r#"<span class="{health}">&#9679;</span>"#),
                ]
            })
            .collect();
        table(&["Service", "Status", "Enabled", "Health"], &rows)
    };
    lines.push(card("Monitored Services", &body));
    lines.join("\n")
}
