use std::collections::BTreeMap;
use std::fmt::Write;

use comfy_table::{Cell, Color, Table};

use nx_core::models::{AggregatedStatus, ContainerDetail, ResolvedService, ServiceState};
use nx_core::services::runner::TaskOutcome;
use nx_core::services::synchronizer::{DriftReport, RemovalOutcome, SyncOutcome};
use nx_core::NexusError;

fn state_color(state: ServiceState) -> Color {
    match state {
        ServiceState::Running => Color::Green,
        ServiceState::Partial | ServiceState::Restarting | ServiceState::Created => Color::Yellow,
        ServiceState::Exited | ServiceState::Dead => Color::Red,
        ServiceState::NotCreated | ServiceState::Removing | ServiceState::Paused => Color::DarkGrey,
    }
}

fn health_color(status: &AggregatedStatus) -> Color {
    match status.healthy {
        Some(true) => Color::Green,
        Some(false) => Color::Red,
        None => Color::DarkGrey,
    }
}

pub fn status_table(statuses: &[AggregatedStatus]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["SERVICE", "STATE", "HEALTH", "UPTIME", "CONTAINERS"]);

    for status in statuses {
        let running = status
            .containers
            .iter()
            .filter(|c| c.state == nx_core::models::ContainerState::Running)
            .count();
        table.add_row(vec![
            Cell::new(&status.service),
            Cell::new(status.state).fg(state_color(status.state)),
            Cell::new(status.health_label()).fg(health_color(status)),
            Cell::new(status.uptime_label()),
            Cell::new(format!("{running}/{}", status.containers.len())),
        ]);
    }

    table.to_string()
}

/// Per-container breakdown for `status --detail`.
pub fn container_breakdown(status: &AggregatedStatus, details: &[ContainerDetail]) -> String {
    let mut out = String::new();
    for container in &status.containers {
        let _ = write!(out, "{}: {}", container.name, container.state);
        if container.health != nx_core::models::Health::None {
            let _ = write!(out, " ({})", container.health.as_str());
        }
        if container.foreign {
            out.push_str(" [owned by another project]");
        }
        out.push('\n');

        if let Some(detail) = details.iter().find(|d| d.name == container.name) {
            let _ = writeln!(out, "  image:    {}", detail.image);
            if !detail.networks.is_empty() {
                let _ = writeln!(out, "  networks: {}", detail.networks.join(", "));
            }
            for mount in &detail.mounts {
                let _ = writeln!(out, "  mount:    {mount}");
            }
            let _ = writeln!(out, "  env vars: {}", detail.environment.len());
        }
    }
    out
}

pub fn service_table(services: &[ResolvedService]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["SERVICE", "CONTAINERS", "HEALTHCHECKS", "DESCRIPTION", "URL"]);

    for service in services {
        let description = service
            .containers
            .iter()
            .map(|c| c.description.as_str())
            .find(|d| !d.is_empty())
            .unwrap_or("");
        let url = service
            .containers
            .iter()
            .find_map(|c| c.url.as_deref())
            .unwrap_or("");
        let checked = service.containers.iter().filter(|c| c.has_healthcheck).count();
        table.add_row(vec![
            Cell::new(service.name()),
            Cell::new(service.container_names().join(", ")),
            Cell::new(format!("{checked}/{}", service.containers.len())),
            Cell::new(description),
            Cell::new(url),
        ]);
    }

    table.to_string()
}

pub fn drift_report(report: &DriftReport) -> String {
    if report.is_consistent() {
        return format!(
            "Root manifest in sync ({} services)\n",
            report.consistent.len()
        );
    }

    let mut out = String::new();
    if !report.missing.is_empty() {
        let _ = writeln!(out, "Missing from manifest ({}):", report.missing.len());
        for name in &report.missing {
            let _ = writeln!(out, "  + {name}");
        }
    }
    if !report.orphans.is_empty() {
        let _ = writeln!(out, "Orphaned in manifest ({}):", report.orphans.len());
        for orphan in &report.orphans {
            let _ = writeln!(out, "  - {} ({})", orphan.service, orphan.path);
        }
    }
    out
}

pub fn sync_outcome(outcome: &SyncOutcome) -> String {
    let mut out = String::new();
    if outcome.added.is_empty() && outcome.rejected.is_empty() {
        out.push_str("Nothing to add\n");
    }
    for name in &outcome.added {
        let _ = writeln!(out, "added    {name}");
    }
    for (name, error) in &outcome.rejected {
        let _ = writeln!(out, "rejected {name}: {error}");
    }
    if outcome.written {
        out.push_str("Root manifest updated\n");
    }
    out
}

pub fn removal_outcome(outcome: &RemovalOutcome) -> String {
    let mut out = String::new();
    if outcome.removed.is_empty() {
        out.push_str("No orphaned entries\n");
    }
    for orphan in &outcome.removed {
        let _ = writeln!(out, "removed  {} ({})", orphan.service, orphan.path);
    }
    if outcome.written {
        out.push_str("Root manifest updated\n");
    }
    out
}

/// Every outcome in name order, then a one-line tally.
pub fn batch_summary(outcomes: &BTreeMap<String, TaskOutcome<()>>) -> String {
    let mut out = String::new();
    let (mut passed, mut failed, mut skipped) = (0, 0, 0);

    for (name, outcome) in outcomes {
        match outcome {
            TaskOutcome::Succeeded(()) => {
                passed += 1;
                let _ = writeln!(out, "ok      {name}");
            }
            TaskOutcome::Failed(detail) => {
                failed += 1;
                let _ = writeln!(out, "FAILED  {name}");
                for line in detail.lines() {
                    let _ = writeln!(out, "        {line}");
                }
            }
            TaskOutcome::Skipped => {
                skipped += 1;
                let _ = writeln!(out, "skipped {name}");
            }
        }
    }

    let _ = writeln!(out, "\n{passed} passed, {failed} failed, {skipped} skipped");
    out
}

/// Trailing summary of services that could not be resolved during a fleet-wide scan.
pub fn failures(failures: &[(String, NexusError)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} service(s) could not be read:", failures.len());
    for (name, error) in failures {
        let _ = writeln!(out, "  {name}: {error}");
    }
    out
}
