mod archive;
mod collectors;
mod config;
mod mail;
mod report;
mod snapshot;

use chrono::Local;
use clap::Parser;
use collectors::collect_snapshot;
use collectors::host::LocalHost;
use config::{Config, ConfigError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "healthdash")]
#[command(version, about = "Generate a static HTML dashboard of host health")]
struct Cli {
    #[arg(short, long, default_value = "/tmp/system-dashboard.html", help = "Where to write the HTML report")]
    output: PathBuf,
    #[arg(short, long, help = "YAML configuration, built-in defaults when omitted")]
    config: Option<PathBuf>,
    #[arg(long, help = "Mail the report when email_enabled is also set in the configuration")]
    email: bool,
    #[arg(short, long)]
    verbose: bool,
    #[arg(long, value_name = "PATH", help = "Also write the raw snapshot as JSON")]
    json: Option<PathBuf>,
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create output directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

// A DNS lookup that outlived its timeout keeps a blocking thread busy.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.print_default_config {
        print!("{}", Config::example_yaml());
        return;
    }

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start async runtime");
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(err) = result {
        error!(error = %err, "failed to generate dashboard");
        std::process::exit(1);
    }
}

fn build_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

async fn run(cli: Cli) -> Result<(), RunError> {
    if !is_root() {
        warn!("not running as root, some metrics may be unavailable");
    }

    let cfg = Config::load_or_default(cli.config.as_deref())?;
    let now = Local::now().naive_local();

    let host = LocalHost::new();
    let snapshot = collect_snapshot(&host, &cfg.collect, now).await;
    let html = report::render(&snapshot);

    write_file(&cli.output, html.as_bytes())?;
    info!(path = %cli.output.display(), bytes = html.len(), "report written");

    if let Some(json_path) = &cli.json {
        let json = serde_json::to_vec_pretty(&snapshot)?;
        write_file(json_path, &json)?;
        info!(path = %json_path.display(), "snapshot written");
    }

    let shown = fs::canonicalize(&cli.output).unwrap_or_else(|_| cli.output.clone());
    println!("System dashboard generated successfully");
    println!("Report saved to: {}", cli.output.display());
    println!("Open in browser: file://{}", shown.display());

    if cfg.backup_reports {
        if let Err(err) = archive::backup(&cfg.output_dir, cfg.retention_days, &html, now) {
            warn!(error = %err, "failed to archive report");
        }
    }

    if mail_requested(cli.email, &cfg) {
        let hostname = snapshot
            .system
            .collected()
            .map_or("unknown", |s| s.hostname.as_str());
        if deliver_report(&cfg, hostname, &html).await {
            println!("Email report sent");
        }
    } else if cli.email {
        warn!("--email ignored: email_enabled is false in the configuration");
    }

    Ok(())
}

fn mail_requested(cli_email: bool, cfg: &Config) -> bool {
    cli_email && cfg.email_enabled
}

// Mail failures are logged and never fail the run.
async fn deliver_report(cfg: &Config, hostname: &str, html: &str) -> bool {
    match mail::send_report(cfg, hostname, html).await {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "failed to send email report");
            false
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), RunError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RunError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| RunError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

// stdout only carries the result lines.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["healthdash"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("/tmp/system-dashboard.html"));
        assert!(cli.config.is_none());
        assert!(!cli.email);
        assert!(!cli.verbose);
        assert!(cli.json.is_none());
    }

    #[test]
    fn cli_short_flags() {
        let cli = Cli::try_parse_from([
            "healthdash",
            "-o",
            "/srv/report.html",
            "-c",
            "/etc/healthdash.yaml",
            "-v",
            "--email",
            "--json",
            "/srv/report.json",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from("/srv/report.html"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/healthdash.yaml")));
        assert!(cli.verbose);
        assert!(cli.email);
        assert_eq!(cli.json, Some(PathBuf::from("/srv/report.json")));
    }

    #[test]
    fn write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dashboard.html");
        write_file(&path, b"<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn write_file_reports_blocked_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = write_file(&blocker.join("dashboard.html"), b"x").unwrap_err();
        assert!(matches!(err, RunError::CreateDir { .. }));
    }

    #[test]
    fn missing_config_is_fatal() {
        let err = Config::load_or_default(Some(Path::new("/nonexistent/healthdash.yaml")))
            .map_err(RunError::from)
            .unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Read { .. })));
    }

    #[test]
    fn mail_needs_flag_and_config() {
        let enabled = Config {
            email_enabled: true,
            ..Config::default()
        };
        let disabled = Config::default();
        assert!(mail_requested(true, &enabled));
        assert!(!mail_requested(true, &disabled));
        assert!(!mail_requested(false, &enabled));
        assert!(!mail_requested(false, &disabled));
    }

    #[tokio::test]
    async fn mail_failure_is_not_fatal() {
        let cfg = Config {
            email_enabled: true,
            to_addresses: vec!["not an address".to_string()],
            ..Config::default()
        };
        assert!(!deliver_report(&cfg, "web01", "<p>report</p>").await);
    }

    #[test]
    fn shutdown_does_not_wait_for_stuck_lookups() {
        let runtime = build_runtime().unwrap();
        let started = std::time::Instant::now();
        runtime.block_on(async {
            let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(10)));
        });
        runtime.shutdown_timeout(Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
