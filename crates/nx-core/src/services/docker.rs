use std::collections::BTreeMap;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{NexusError, Result};
use crate::models::{ContainerDetail, ContainerSnapshot, ContainerState, Health};

/// Label compose stamps on every container it creates.
pub const PROJECT_LABEL: &str = "com.docker.compose.project";

async fn run_docker(args: &[&str]) -> Result<Vec<u8>> {
    tracing::debug!("docker {}", args.join(" "));
    let output = Command::new("docker")
        .args(args)
        .output()
        .await
        .map_err(|e| NexusError::external("docker", format!("failed to run docker: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NexusError::external(
            "docker",
            format!(
                "docker {} failed (exit {}): {}",
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }
    Ok(output.stdout)
}

/// One bulk query for every container the daemon knows about, in any state.
pub async fn list_containers() -> Result<Vec<ContainerSnapshot>> {
    let stdout = run_docker(&["ps", "--all", "--no-trunc", "--format", "{{json .}}"]).await?;
    parse_ps_output(&String::from_utf8_lossy(&stdout))
}

#[derive(Debug, Deserialize)]
struct PsRow {
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Labels", default)]
    labels: String,
}

/// Parse `docker ps --format '{{json .}}'` output, one JSON object per line.
///
/// Rows with a state outside the known set are skipped.
pub fn parse_ps_output(output: &str) -> Result<Vec<ContainerSnapshot>> {
    let mut containers = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let row: PsRow = serde_json::from_str(line)?;
        let Some(name) = row.names.split(',').next().map(str::trim) else {
            continue;
        };
        let state = match row.state.parse::<ContainerState>() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("skipping container {name}: {e}");
                continue;
            }
        };
        containers.push(ContainerSnapshot {
            name: name.to_string(),
            state,
            status: row.status,
            project: label_value(&row.labels, PROJECT_LABEL),
        });
    }
    Ok(containers)
}

/// Look up one key in the runtime's comma-separated `k=v` label string.
fn label_value(labels: &str, key: &str) -> Option<String> {
    labels
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Classify the health annotation embedded in a status string.
pub fn parse_health(status: &str) -> Health {
    if status.contains("(unhealthy)") {
        Health::Unhealthy
    } else if status.contains("(healthy)") {
        Health::Healthy
    } else if status.contains("health: starting") {
        Health::Starting
    } else {
        Health::None
    }
}

/// Duration from an `Up <duration>` status, without any parenthesized annotation.
pub fn parse_uptime(status: &str) -> Option<String> {
    let rest = status.trim().strip_prefix("Up ")?;
    let duration = match rest.find(" (") {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    let duration = duration.trim();
    (!duration.is_empty()).then(|| duration.to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectRecord {
    name: String,
    config: InspectConfig,
    state: InspectState,
    #[serde(default)]
    network_settings: InspectNetworkSettings,
    #[serde(default)]
    mounts: Vec<InspectMount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    #[serde(default)]
    image: String,
    #[serde(default)]
    env: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    status: String,
    #[serde(default)]
    health: Option<InspectHealth>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectHealth {
    status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectNetworkSettings {
    #[serde(default)]
    networks: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectMount {
    #[serde(default)]
    source: String,
    #[serde(default)]
    destination: String,
}

/// Inspect one container for networks, mounts and environment.
pub async fn inspect_container(name: &str) -> Result<ContainerDetail> {
    let stdout = run_docker(&["inspect", "--type", "container", name]).await?;
    parse_inspect_output(&String::from_utf8_lossy(&stdout))
}

pub fn parse_inspect_output(output: &str) -> Result<ContainerDetail> {
    let records: Vec<InspectRecord> = serde_json::from_str(output)?;
    let record = records
        .into_iter()
        .next()
        .ok_or_else(|| NexusError::external("docker", "inspect returned no containers"))?;

    let state = record
        .state
        .status
        .parse::<ContainerState>()
        .map_err(|e| NexusError::external("docker", e))?;
    let status = match &record.state.health {
        Some(health) => format!("{} ({})", record.state.status, health.status),
        None => record.state.status.clone(),
    };

    Ok(ContainerDetail {
        name: record.name.trim_start_matches('/').to_string(),
        image: record.config.image,
        state,
        status,
        project: record
            .config
            .labels
            .and_then(|labels| labels.get(PROJECT_LABEL).cloned()),
        networks: record
            .network_settings
            .networks
            .map(|n| n.into_keys().collect())
            .unwrap_or_default(),
        mounts: record
            .mounts
            .into_iter()
            .map(|m| format!("{}:{}", m.source, m.destination))
            .collect(),
        environment: record.config.env.unwrap_or_default(),
    })
}
