use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{NexusError, Result};
use crate::models::{DeclaredContainer, ServiceDefinition};

use super::catalog::{self, Labels};
use super::registry::ServiceRegistry;
use super::runner::{TaskOutcome, TaskRunner};

#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    services: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposeService {
    container_name: Option<String>,
    #[serde(default)]
    labels: Labels,
    healthcheck: Option<serde_yaml::Value>,
}

/// Extract the containers a service manifest declares, in declaration order.
///
/// A manifest that does not parse, or declares no containers, is a
/// `MalformedDefinition` for that service.
pub fn parse_manifest(service: &str, content: &str) -> Result<Vec<DeclaredContainer>> {
    let file: ComposeFile = serde_yaml::from_str(content)
        .map_err(|e| NexusError::malformed(service, format!("unparseable manifest: {e}")))?;

    let mut containers = Vec::new();
    for (key, value) in file.services.unwrap_or_default() {
        let Some(key) = key.as_str().map(str::to_string) else {
            return Err(NexusError::malformed(service, "service keys must be strings"));
        };
        let definition: ComposeService = match value {
            serde_yaml::Value::Null => ComposeService::default(),
            serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value).map_err(|e| {
                NexusError::malformed(service, format!("service '{key}': {e}"))
            })?,
            _ => {
                tracing::warn!("{service}: ignoring non-mapping service entry '{key}'");
                continue;
            }
        };

        let has_healthcheck = definition
            .healthcheck
            .as_ref()
            .is_some_and(|hc| hc.get("disable").and_then(|d| d.as_bool()) != Some(true));

        let mut description = catalog::description(&definition.labels);
        if description.is_empty() {
            description = catalog::comment_above(content, &key).unwrap_or_default();
        }

        containers.push(DeclaredContainer {
            name: definition.container_name.unwrap_or(key),
            has_healthcheck,
            description,
            url: catalog::public_url(&definition.labels),
        });
    }

    if containers.is_empty() {
        return Err(NexusError::malformed(service, "manifest declares no containers"));
    }
    Ok(containers)
}

/// Read a service's manifest and return its declared containers.
pub async fn container_names(definition: &ServiceDefinition) -> Result<Vec<DeclaredContainer>> {
    let content = tokio::fs::read_to_string(&definition.manifest_path)
        .await
        .map_err(|e| NexusError::malformed(&definition.name, format!("reading manifest: {e}")))?;
    parse_manifest(&definition.name, &content)
}

/// Container lifecycle operations forwarded to the compose interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Up,
    Down,
    Pull,
    Restart,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Up => "up",
            Lifecycle::Down => "down",
            Lifecycle::Pull => "pull",
            Lifecycle::Restart => "restart",
        }
    }

    fn subcommand(&self) -> &'static [&'static str] {
        match self {
            Lifecycle::Up => &["up", "--detach"],
            // `down` would also tear down networks shared with the rest of the project.
            Lifecycle::Down => &["rm", "--stop", "--force"],
            Lifecycle::Pull => &["pull"],
            Lifecycle::Restart => &["restart"],
        }
    }
}

fn base_args(definition: &ServiceDefinition, env_files: &[String]) -> Vec<String> {
    let mut args = vec!["compose".to_string()];
    for env_file in env_files {
        args.push("--env-file".into());
        args.push(env_file.clone());
    }
    args.push("-f".into());
    args.push(definition.manifest_ref.clone());
    if let Some(override_path) = &definition.override_path {
        args.push("-f".into());
        args.push(override_path.to_string_lossy().to_string());
    }
    args
}

/// Build the `docker compose ... config --quiet` argument list for one service.
pub fn validate_args(definition: &ServiceDefinition, env_files: &[String]) -> Vec<String> {
    let mut args = base_args(definition, env_files);
    args.extend(["config".to_string(), "--quiet".to_string()]);
    args
}

/// Build the argument list for a lifecycle operation on one service.
///
/// With `project` set, containers are created under that compose project so
/// they carry the same group label as the root manifest's.
pub fn lifecycle_args(
    definition: &ServiceDefinition,
    env_files: &[String],
    project: Option<&str>,
    action: Lifecycle,
) -> Vec<String> {
    let mut args = base_args(definition, env_files);
    if let Some(project) = project {
        args.push("--project-name".into());
        args.push(project.to_string());
    }
    args.extend(action.subcommand().iter().map(|a| a.to_string()));
    args
}

async fn run_compose(repo_root: &Path, service: &str, args: &[String]) -> Result<()> {
    tracing::debug!("{service}: docker {}", args.join(" "));

    let mut cmd = Command::new("docker");
    cmd.args(args).current_dir(repo_root);
    // Own process group: a terminal interrupt must not kill in-flight operations.
    #[cfg(unix)]
    cmd.process_group(0);

    let output = cmd
        .output()
        .await
        .map_err(|e| NexusError::external("docker compose", format!("failed to run docker: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(NexusError::external(
            "docker compose",
            format!("exit {}: {stderr}", output.status.code().unwrap_or(-1)),
        ));
    }
    Ok(())
}

/// Validate the resolved compose configuration of one service.
///
/// Stderr of a failing run is returned verbatim.
pub async fn validate(
    repo_root: &Path,
    definition: &ServiceDefinition,
    env_files: &[String],
) -> Result<()> {
    run_compose(repo_root, &definition.name, &validate_args(definition, env_files)).await
}

/// Apply a lifecycle operation to one service.
pub async fn apply(
    repo_root: &Path,
    definition: &ServiceDefinition,
    env_files: &[String],
    project: Option<&str>,
    action: Lifecycle,
) -> Result<()> {
    let args = lifecycle_args(definition, env_files, project, action);
    run_compose(repo_root, &definition.name, &args).await
}

/// Validate every given service through the runner, one outcome per service.
///
/// A manifest declaring no containers fails before compose is invoked.
pub async fn validate_services(
    registry: &ServiceRegistry,
    runner: &TaskRunner,
    definitions: Vec<ServiceDefinition>,
) -> BTreeMap<String, TaskOutcome<()>> {
    let tasks: Vec<_> = definitions
        .into_iter()
        .map(|definition| {
            let repo_root = registry.repo_root().to_path_buf();
            let env_files = registry.env_files_for(&definition.name);
            (definition.name.clone(), move || async move {
                container_names(&definition).await?;
                validate(&repo_root, &definition, &env_files).await
            })
        })
        .collect();
    runner.run(tasks).await
}

/// Apply `action` to every given service through the runner.
///
/// Malformed services fail before compose is invoked, as in [`validate_services`].
pub async fn apply_services(
    registry: &ServiceRegistry,
    runner: &TaskRunner,
    definitions: Vec<ServiceDefinition>,
    project: Option<&str>,
    action: Lifecycle,
) -> BTreeMap<String, TaskOutcome<()>> {
    let tasks: Vec<_> = definitions
        .into_iter()
        .map(|definition| {
            let repo_root = registry.repo_root().to_path_buf();
            let env_files = registry.env_files_for(&definition.name);
            let project = project.map(str::to_string);
            (definition.name.clone(), move || async move {
                container_names(&definition).await?;
                apply(&repo_root, &definition, &env_files, project.as_deref(), action).await
            })
        })
        .collect();
    runner.run(tasks).await
}
