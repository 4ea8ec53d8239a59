use super::host::{CommandOutput, Host};
use std::collections::{HashMap, HashSet};
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    files: HashMap<String, String>,
    commands: HashMap<String, CommandOutput>,
    resolvable: HashSet<String>,
    pub host_name: Option<String>,
    pub kernel_version: Option<String>,
    pub long_os_version: Option<String>,
    pub logical_cpus: u32,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            host_name: Some("web01".to_string()),
            kernel_version: Some("5.14.0-362.el9.x86_64".to_string()),
            long_os_version: Some("Linux 9.3 Rocky Linux".to_string()),
            logical_cpus: 4,
            ..Self::default()
        }
    }

    pub fn add_file(&mut self, path: &str, content: &str) -> &mut Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn add_command(&mut self, command_line: &str, code: i32, stdout: &str) -> &mut Self {
        self.commands.insert(
            command_line.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
            },
        );
        self
    }

    pub fn allow_resolve(&mut self, name: &str) -> &mut Self {
        self.resolvable.insert(name.to_string());
        self
    }
}

impl Host for FakeHost {
    async fn read_file(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path}: not found")))
    }

    async fn path_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    async fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let mut key = program.to_string();
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }
        self.commands
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{key}: not found")))
    }

    async fn resolves(&self, name: &str, _timeout: Duration) -> bool {
        self.resolvable.contains(name)
    }

    fn host_name(&self) -> Option<String> {
        self.host_name.clone()
    }

    fn kernel_version(&self) -> Option<String> {
        self.kernel_version.clone()
    }

    fn long_os_version(&self) -> Option<String> {
        self.long_os_version.clone()
    }

    fn logical_cpus(&self) -> u32 {
        self.logical_cpus
    }
}
