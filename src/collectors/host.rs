use std::io;
use std::process::Stdio;
use std::time::Duration;
use sysinfo::{System, SystemExt};
use tokio::process::Command;
use tokio::time;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[allow(async_fn_in_trait)]
pub trait Host {
    async fn read_file(&self, path: &str) -> io::Result<String>;

    async fn path_exists(&self, path: &str) -> bool;

    // Runs `program` to completion. Only a failure to start it is an error;
    // a non-zero exit status is reported through `CommandOutput::code`.
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    async fn resolves(&self, name: &str, timeout: Duration) -> bool;

    fn host_name(&self) -> Option<String>;

    fn kernel_version(&self) -> Option<String>;

    fn long_os_version(&self) -> Option<String>;

    fn logical_cpus(&self) -> u32;
}

pub struct LocalHost {
    system: System,
}

impl LocalHost {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        Self { system }
    }
}

impl Host for LocalHost {
    async fn read_file(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn path_exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;
        debug!(program, ?args, code = ?output.status.code(), "command finished");

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    async fn resolves(&self, name: &str, timeout: Duration) -> bool {
        match time::timeout(timeout, tokio::net::lookup_host((name, 0))).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(err)) => {
                debug!(name, error = %err, "name resolution failed");
                false
            }
            Err(_elapsed) => {
                debug!(name, "name resolution timeout");
                false
            }
        }
    }

    fn host_name(&self) -> Option<String> {
        self.system.host_name()
    }

    fn kernel_version(&self) -> Option<String> {
        self.system.kernel_version()
    }

    fn long_os_version(&self) -> Option<String> {
        self.system.long_os_version()
    }

    fn logical_cpus(&self) -> u32 {
        let counted = self.system.cpus().len() as u32;
        if counted > 0 {
            return counted;
        }
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1)
    }
}
