use super::host::Host;
use super::{run_ok, CollectError};
use crate::snapshot::ProcessInfo;

const COMMAND_MAX_CHARS: usize = 50;
const PS_COLUMNS: usize = 11;

#[derive(Debug, Clone, Copy)]
pub enum SortKey {
    Cpu,
    Memory,
}

impl SortKey {
    fn ps_arg(self) -> &'static str {
        match self {
            SortKey::Cpu => "--sort=-%cpu",
            SortKey::Memory => "--sort=-%mem",
        }
    }
}

pub async fn top_processes<H: Host>(
    host: &H,
    key: SortKey,
    limit: usize,
) -> Result<Vec<ProcessInfo>, CollectError> {
    let text = run_ok(host, "ps", &["aux", key.ps_arg(), "--no-headers"]).await?;
    Ok(parse_ps_aux(&text, limit))
}

pub fn parse_ps_aux(text: &str, limit: usize) -> Vec<ProcessInfo> {
    text.lines()
        .filter_map(parse_ps_line)
        .take(limit)
        .collect()
}

fn parse_ps_line(line: &str) -> Option<ProcessInfo> {
    let mut fields = Vec::with_capacity(PS_COLUMNS - 1);
    let mut rest = line.trim_start();
    while fields.len() < PS_COLUMNS - 1 {
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    let command = rest.trim_end();
    if command.is_empty() {
        return None;
    }

    Some(ProcessInfo {
        user: fields[0].to_string(),
        pid: fields[1].to_string(),
        cpu: fields[2].to_string(),
        mem: fields[3].to_string(),
        command: truncate_command(command),
    })
}

pub fn truncate_command(command: &str) -> String {
    if command.chars().count() <= COMMAND_MAX_CHARS {
        return command.to_string();
    }
    let mut out: String = command.chars().take(COMMAND_MAX_CHARS).collect();
    out.push_str("...");
    out
}
