use super::host::Host;
use super::{run, run_ok, CollectError};
use crate::config::CollectConfig;
use crate::snapshot::{DnsStatus, NetworkInterface, NetworkMetrics};
use std::time::Duration;
use tracing::debug;

pub async fn collect<H: Host>(
    host: &H,
    cfg: &CollectConfig,
) -> Result<NetworkMetrics, CollectError> {
    let addr = run_ok(host, "ip", &["addr", "show"]).await?;
    let interfaces = parse_ip_addr(&addr);

    let default_gateway = match run(host, "ip", &["route", "show", "default"]).await {
        Ok(output) if output.success() => parse_default_gateway(&output.stdout),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "default route lookup failed");
            None
        }
    };

    let timeout = Duration::from_secs(cfg.dns_timeout_secs);
    let dns_status = if host.resolves(&cfg.dns_probe_host, timeout).await {
        DnsStatus::Ok
    } else {
        DnsStatus::Failed
    };

    let sockets = run_ok(host, "ss", &["-tuln"]).await?;
    let listening_ports = count_listening(&sockets);

    Ok(NetworkMetrics {
        interfaces,
        default_gateway,
        dns_status,
        listening_ports,
    })
}

pub fn parse_ip_addr(text: &str) -> Vec<NetworkInterface> {
    let mut interfaces: Vec<NetworkInterface> = Vec::new();

    for line in text.lines() {
        if !line.starts_with(char::is_whitespace) && line.contains(':') {
            let mut parts = line.split_whitespace();
            let (Some(_index), Some(name)) = (parts.next(), parts.next()) else {
                continue;
            };
            let name = name.trim_end_matches(':');
            interfaces.push(NetworkInterface {
                name: name.to_string(),
                up: interface_flags(line).any(|f| f == "UP"),
                addresses: Vec::new(),
            });
            continue;
        }

        let Some(current) = interfaces.last_mut() else {
            continue;
        };
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("inet") {
            if let Some(address) = tokens.next() {
                current.addresses.push(address.to_string());
            }
        }
    }

    interfaces
}

fn interface_flags(line: &str) -> impl Iterator<Item = &str> {
    let flags = line
        .split_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map(|(flags, _)| flags)
        .unwrap_or("");
    flags.split(',').filter(|f| !f.is_empty())
}

pub fn parse_default_gateway(text: &str) -> Option<String> {
    text.lines()
        .filter(|l| l.starts_with("default"))
        .find_map(|l| {
            let mut tokens = l.split_whitespace();
            tokens.find(|t| *t == "via")?;
            tokens.next().map(str::to_string)
        })
}

pub fn count_listening(ss_output: &str) -> u32 {
    ss_output.lines().filter(|l| l.contains("LISTEN")).count() as u32
}
