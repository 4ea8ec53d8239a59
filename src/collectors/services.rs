use super::host::Host;
use super::{run, run_ok, CollectError};
use crate::snapshot::{ServiceMetrics, ServiceState};
use std::collections::HashSet;
use tracing::{debug, warn};

pub async fn collect<H: Host>(
    host: &H,
    monitored: &[String],
) -> Result<ServiceMetrics, CollectError> {
    let unit_files = match run_ok(
        host,
        "systemctl",
        &["list-unit-files", "--type=service", "--no-legend", "--no-pager"],
    )
    .await
    {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "unit file listing failed, no services considered installed");
            String::new()
        }
    };
    let installed = parse_unit_files(&unit_files);

    let mut services = Vec::new();
    for name in monitored {
        if !installed.contains(name.as_str()) {
            debug!(service = %name, "service not installed, skipping");
            continue;
        }
        match service_state(host, name).await {
            Ok(state) => services.push(state),
            Err(err) => warn!(service = %name, error = %err, "failed to query service"),
        }
    }

    let failed_count = match run_ok(
        host,
        "systemctl",
        &["list-units", "--failed", "--no-legend", "--plain", "--no-pager"],
    )
    .await
    {
        Ok(text) => count_failed_units(&text),
        Err(err) => {
            warn!(error = %err, "failed units query failed");
            0
        }
    };

    Ok(ServiceMetrics {
        services,
        failed_count,
    })
}

// `is-active` and `is-enabled` exit non-zero for inactive or disabled units;
// their stdout still carries the state.
async fn service_state<H: Host>(host: &H, name: &str) -> Result<ServiceState, CollectError> {
    let active = run(host, "systemctl", &["is-active", name]).await?;
    let enabled = run(host, "systemctl", &["is-enabled", name]).await?;
    Ok(ServiceState {
        name: name.to_string(),
        status: first_word(&active.stdout).unwrap_or("unknown").to_string(),
        enabled: first_word(&enabled.stdout).unwrap_or("unknown").to_string(),
    })
}

fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

pub fn parse_unit_files(text: &str) -> HashSet<&str> {
    text.lines()
        .filter_map(first_word)
        .filter_map(|unit| unit.strip_suffix(".service"))
        .collect()
}

pub fn count_failed_units(text: &str) -> u32 {
    text.lines().filter(|l| !l.trim().is_empty()).count() as u32
}
