use std::future::Future;

use color_eyre::Result;
use serde_json::{json, Value};

use nx_core::models::{AggregatedStatus, ContainerDetail, ContainerState};
use nx_core::services::snapshot::ContainerStateCache;
use nx_core::services::{aggregator, docker, resolver};
use nx_core::NexusError;

use crate::cli::OutputFormat;
use crate::render;
use crate::workspace::Workspace;

/// Rolled-up statuses of the requested services against one snapshot.
pub struct StatusReport {
    pub snapshot: ContainerStateCache,
    pub statuses: Vec<AggregatedStatus>,
    /// Services that could not be read during a fleet-wide scan.
    pub failures: Vec<(String, NexusError)>,
}

impl StatusReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self, details: &[ContainerDetail]) -> Value {
        let errors: Vec<_> = self
            .failures
            .iter()
            .map(|(name, error)| json!({ "service": name, "error": error.to_string() }))
            .collect();
        let mut report = json!({
            "takenAt": self.snapshot.taken_at().to_rfc3339(),
            "services": self.statuses,
            "errors": errors,
        });
        if !details.is_empty() {
            report["details"] = json!(details);
        }
        report
    }

    pub fn to_table(&self) -> String {
        let taken_at = self.snapshot.taken_at().with_timezone(&chrono::Local);
        format!(
            "{} containers in snapshot at {}\n{}\n",
            self.snapshot.len(),
            taken_at.format("%H:%M:%S"),
            render::status_table(&self.statuses)
        )
    }
}

/// Resolve the requested services, then take exactly one snapshot and
/// aggregate every service against it.
///
/// A single named service must resolve, so an unknown name fails before the
/// runtime is queried.
pub async fn collect<F, Fut>(
    workspace: &Workspace,
    service: Option<&str>,
    take_snapshot: F,
) -> Result<StatusReport>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = nx_core::Result<ContainerStateCache>>,
{
    let (services, failures) = match service {
        Some(name) => (
            vec![resolver::resolve(&workspace.registry, name).await?],
            Vec::new(),
        ),
        None => resolver::resolve_all(&workspace.registry).await?,
    };

    let snapshot = take_snapshot().await?;
    let statuses = services
        .iter()
        .map(|s| aggregator::aggregate(s.name(), &s.container_names(), &snapshot, workspace.project()))
        .collect();

    Ok(StatusReport {
        snapshot,
        statuses,
        failures,
    })
}

/// Inspect every present container of the reported services.
async fn inspect_present(report: &StatusReport) -> Vec<ContainerDetail> {
    let mut details = Vec::new();
    for status in &report.statuses {
        for container in &status.containers {
            if container.state == ContainerState::NotCreated {
                continue;
            }
            match docker::inspect_container(&container.name).await {
                Ok(detail) => details.push(detail),
                Err(e) => tracing::warn!("inspect {} failed: {e}", container.name),
            }
        }
    }
    details
}

/// Returns `Ok(false)` when some services could not be read.
pub async fn run(
    workspace: &Workspace,
    service: Option<&str>,
    format: OutputFormat,
    detail: bool,
) -> Result<bool> {
    let report = collect(workspace, service, ContainerStateCache::snapshot).await?;
    let details = if detail {
        inspect_present(&report).await
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.to_json(&details))?);
        }
        OutputFormat::Table => {
            print!("{}", report.to_table());
            if detail {
                for status in &report.statuses {
                    print!("{}", render::container_breakdown(status, &details));
                }
            }
        }
    }

    if !report.is_complete() {
        eprint!("{}", render::failures(&report.failures));
    }
    Ok(report.is_complete())
}
