use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_backup_reports")]
    pub backup_reports: bool,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_to_addresses")]
    pub to_addresses: Vec<String>,
    #[serde(default)]
    pub collect: CollectConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectConfig {
    #[serde(default = "default_services")]
    pub services: Vec<String>,
    #[serde(default = "default_large_file_dir")]
    pub large_file_dir: String,
    #[serde(default = "default_large_file_min_mb")]
    pub large_file_min_mb: u64,
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
    #[serde(default = "default_dns_probe_host")]
    pub dns_probe_host: String,
    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,
    #[serde(default = "default_auth_logs")]
    pub auth_logs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            backup_reports: default_backup_reports(),
            retention_days: default_retention_days(),
            email_enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            from_address: default_from_address(),
            to_addresses: default_to_addresses(),
            collect: CollectConfig::default(),
        }
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            large_file_dir: default_large_file_dir(),
            large_file_min_mb: default_large_file_min_mb(),
            top_processes: default_top_processes(),
            dns_probe_host: default_dns_probe_host(),
            dns_timeout_secs: default_dns_timeout_secs(),
            auth_logs: default_auth_logs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/var/www/html/metrics")
}

const fn default_backup_reports() -> bool {
    true
}

const fn default_retention_days() -> u32 {
    30
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

const fn default_smtp_port() -> u16 {
    25
}

fn default_from_address() -> String {
    "noreply@company.com".to_string()
}

fn default_to_addresses() -> Vec<String> {
    vec!["admin@company.com".to_string()]
}

fn default_services() -> Vec<String> {
    [
        "sshd",
        "NetworkManager",
        "chronyd",
        "rsyslog",
        "firewalld",
        "postfix",
        "httpd",
        "nginx",
        "mariadb",
        "postgresql",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_large_file_dir() -> String {
    "/var/log".to_string()
}

const fn default_large_file_min_mb() -> u64 {
    100
}

const fn default_top_processes() -> usize {
    5
}

fn default_dns_probe_host() -> String {
    "google.com".to_string()
}

const fn default_dns_timeout_secs() -> u64 {
    5
}

fn default_auth_logs() -> Vec<String> {
    vec!["/var/log/secure".to_string(), "/var/log/auth.log".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_yaml("email_enabled: true\nsmtp_port: 2525\n")
            .expect("partial config should parse");
        assert!(cfg.email_enabled);
        assert_eq!(cfg.smtp_port, 2525);
        assert_eq!(cfg.smtp_host, "localhost");
        assert_eq!(cfg.retention_days, 30);
        assert_eq!(cfg.collect.top_processes, 5);
        assert_eq!(cfg.collect.services.len(), 10);
    }

    #[test]
    fn empty_document_is_default() {
        let cfg = Config::from_yaml("  \n").expect("empty config");
        assert!(cfg.backup_reports);
        assert_eq!(cfg.collect.dns_timeout_secs, 5);
    }

    #[test]
    fn bundled_example_parses() {
        let cfg = Config::from_yaml(Config::example_yaml()).expect("example config");
        assert_eq!(cfg.collect.large_file_dir, "/var/log");
        assert_eq!(cfg.to_addresses, vec!["admin@company.com".to_string()]);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load_from_file("/nonexistent/healthdash.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err
            .to_string()
            .starts_with("failed to read config file /nonexistent/healthdash.yaml"));
    }

    #[test]
    fn bad_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "smtp_port: [1, 2\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse YAML in "));
    }

    #[test]
    fn nested_collect_section_overrides() {
        let cfg = Config::from_yaml("collect:\n  services: [nginx]\n  top_processes: 3\n")
            .expect("collect section");
        assert_eq!(cfg.collect.services, vec!["nginx".to_string()]);
        assert_eq!(cfg.collect.top_processes, 3);
        assert_eq!(cfg.collect.dns_probe_host, "google.com");
    }
}
