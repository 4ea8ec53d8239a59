use serde::Serialize;

pub const USAGE_WARNING_PERCENT: f64 = 75.0;
pub const USAGE_CRITICAL_PERCENT: f64 = 90.0;
pub const SWAP_WARNING_PERCENT: f64 = 25.0;
pub const SWAP_CRITICAL_PERCENT: f64 = 50.0;
pub const DISK_WARNING_PERCENT: u32 = 80;
pub const DISK_CRITICAL_PERCENT: u32 = 90;
pub const FAILED_LOGINS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Health {
    pub fn as_str(self) -> &'static str {
        match self {
            Health::Ok => "ok",
            Health::Warning => "warning",
            Health::Critical => "critical",
            Health::Unknown => "unknown",
        }
    }
}

// Result of collecting one metric group. A failed group serializes as
// `{"error": "..."}` and never affects its siblings.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Group<T> {
    Collected(T),
    Failed { error: String },
}

impl<T> Group<T> {
    pub fn collected(&self) -> Option<&T> {
        match self {
            Group::Collected(v) => Some(v),
            Group::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Group::Collected(_) => None,
            Group::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub system: Group<SystemInfo>,
    pub cpu: Group<CpuMetrics>,
    pub memory: Group<MemoryMetrics>,
    pub disk: Group<DiskMetrics>,
    pub network: Group<NetworkMetrics>,
    pub services: Group<ServiceMetrics>,
    pub security: Group<SecurityMetrics>,
}

impl Snapshot {
    pub fn failed_groups(&self) -> Vec<&'static str> {
        [
            ("system", self.system.error()),
            ("cpu", self.cpu.error()),
            ("memory", self.memory.error()),
            ("disk", self.disk.error()),
            ("network", self.network.error()),
            ("services", self.services.error()),
            ("security", self.security.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|_| name))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub fqdn: String,
    pub os_info: String,
    pub kernel: String,
    pub architecture: String,
    pub uptime_seconds: u64,
    pub uptime: String,
    pub load_avg: LoadAverage,
    pub cpu_cores: u32,
    pub timestamp: String,
}

impl SystemInfo {
    pub fn load_status(&self) -> Health {
        load_status(self.load_avg.one, self.cpu_cores)
    }

    pub fn uptime_days(&self) -> u64 {
        self.uptime_seconds / 86_400
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub user: String,
    pub pid: String,
    pub cpu: String,
    pub mem: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuMetrics {
    pub usage_percent: f64,
    pub model: String,
    pub top_processes: Vec<ProcessInfo>,
}

impl CpuMetrics {
    pub fn status(&self) -> Health {
        usage_status(self.usage_percent)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryMetrics {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub usage_percent: f64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    pub swap_usage_percent: f64,
    pub top_processes: Vec<ProcessInfo>,
}

impl MemoryMetrics {
    pub fn status(&self) -> Health {
        usage_status(self.usage_percent)
    }

    pub fn swap_status(&self) -> Health {
        classify(
            self.swap_usage_percent,
            SWAP_WARNING_PERCENT,
            SWAP_CRITICAL_PERCENT,
        )
    }

    pub fn total_human(&self) -> String {
        bytes_to_human(self.total_bytes)
    }

    pub fn used_human(&self) -> String {
        bytes_to_human(self.used_bytes)
    }

    pub fn available_human(&self) -> String {
        bytes_to_human(self.available_bytes)
    }

    pub fn swap_total_human(&self) -> String {
        bytes_to_human(self.swap_total_bytes)
    }

    pub fn swap_used_human(&self) -> String {
        bytes_to_human(self.swap_used_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filesystem {
    pub filesystem: String,
    pub size: String,
    pub used: String,
    pub available: String,
    pub usage_percent: u32,
    pub mountpoint: String,
}

impl Filesystem {
    pub fn status(&self) -> Health {
        filesystem_status(self.usage_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InodeUsage {
    pub mountpoint: String,
    pub total: String,
    pub used: String,
    pub available: String,
    pub usage_percent: u32,
}

impl InodeUsage {
    pub fn status(&self) -> Health {
        filesystem_status(self.usage_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargeFile {
    pub size: String,
    pub date: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskMetrics {
    pub filesystems: Vec<Filesystem>,
    pub inodes: Vec<InodeUsage>,
    pub large_files: Vec<LargeFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInterface {
    pub name: String,
    pub up: bool,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkMetrics {
    pub interfaces: Vec<NetworkInterface>,
    pub default_gateway: Option<String>,
    pub dns_status: DnsStatus,
    pub listening_ports: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceState {
    pub name: String,
    pub status: String,
    pub enabled: String,
}

impl ServiceState {
    pub fn health(&self) -> Health {
        if self.status == "active" {
            Health::Ok
        } else {
            Health::Critical
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled == "enabled"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceMetrics {
    pub services: Vec<ServiceState>,
    pub failed_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Firewall {
    Firewalld,
    Iptables,
    Inactive,
}

impl Firewall {
    pub fn label(self) -> &'static str {
        match self {
            Firewall::Firewalld => "active (firewalld)",
            Firewall::Iptables => "active (iptables)",
            Firewall::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityMetrics {
    pub selinux: Option<String>,
    pub firewall: Firewall,
    pub pending_updates: Option<u32>,
    pub failed_logins: Option<u32>,
}

impl SecurityMetrics {
    pub fn selinux_health(&self) -> Health {
        match self.selinux.as_deref() {
            Some("Enforcing") => Health::Ok,
            Some(_) => Health::Warning,
            None => Health::Unknown,
        }
    }

    pub fn firewall_health(&self) -> Health {
        match self.firewall {
            Firewall::Inactive => Health::Warning,
            _ => Health::Ok,
        }
    }

    pub fn updates_health(&self) -> Health {
        match self.pending_updates {
            Some(0) => Health::Ok,
            Some(_) => Health::Warning,
            None => Health::Unknown,
        }
    }

    pub fn failed_logins_health(&self) -> Health {
        match self.failed_logins {
            Some(n) if n < FAILED_LOGINS_LIMIT => Health::Ok,
            Some(_) => Health::Warning,
            None => Health::Unknown,
        }
    }
}

pub fn classify(value: f64, warning: f64, critical: f64) -> Health {
    if value >= critical {
        Health::Critical
    } else if value >= warning {
        Health::Warning
    } else {
        Health::Ok
    }
}

pub fn usage_status(percent: f64) -> Health {
    classify(percent, USAGE_WARNING_PERCENT, USAGE_CRITICAL_PERCENT)
}

pub fn filesystem_status(percent: u32) -> Health {
    if percent >= DISK_CRITICAL_PERCENT {
        Health::Critical
    } else if percent >= DISK_WARNING_PERCENT {
        Health::Warning
    } else {
        Health::Ok
    }
}

pub fn load_status(load: f64, cores: u32) -> Health {
    classify(load / f64::from(cores.max(1)), 1.0, 2.0)
}

pub fn bytes_to_human(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} PB")
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}
