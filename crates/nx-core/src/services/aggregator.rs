use crate::models::{
    AggregatedStatus, ContainerState, ContainerStatus, Health, ServiceState,
};

use super::docker::{parse_health, parse_uptime};
use super::snapshot::ContainerStateCache;

/// Classify one declared container against the snapshot.
///
/// A container owned by another compose project counts as not created for
/// this service when `project` is set.
pub fn classify(name: &str, cache: &ContainerStateCache, project: Option<&str>) -> ContainerStatus {
    match cache.get(name) {
        Some(snapshot) if project.is_some() && snapshot.project.as_deref() != project => {
            ContainerStatus {
                name: name.to_string(),
                state: ContainerState::NotCreated,
                health: Health::None,
                status: snapshot.status.clone(),
                foreign: true,
            }
        }
        Some(snapshot) => ContainerStatus {
            name: name.to_string(),
            state: snapshot.state,
            health: parse_health(&snapshot.status),
            status: snapshot.status.clone(),
            foreign: false,
        },
        None => ContainerStatus {
            name: name.to_string(),
            state: ContainerState::NotCreated,
            health: Health::None,
            status: String::new(),
            foreign: false,
        },
    }
}

/// Roll a service's containers up into one status. Pure: same inputs, same output.
pub fn aggregate(
    service: &str,
    containers: &[String],
    cache: &ContainerStateCache,
    project: Option<&str>,
) -> AggregatedStatus {
    let statuses: Vec<ContainerStatus> = containers
        .iter()
        .map(|name| classify(name, cache, project))
        .collect();

    let total = statuses.len();
    let running = statuses
        .iter()
        .filter(|c| c.state == ContainerState::Running)
        .count();
    let checked = statuses.iter().filter(|c| c.health != Health::None).count();
    let healthy = statuses
        .iter()
        .filter(|c| c.health == Health::Healthy)
        .count();

    let (state, health) = if total == 1 {
        let only = &statuses[0];
        let health = (only.health != Health::None).then(|| only.health.as_str().to_string());
        (ServiceState::from(only.state), health)
    } else {
        let state = if total > 0 && running == total {
            ServiceState::Running
        } else if running > 0 {
            ServiceState::Partial
        } else {
            ServiceState::NotCreated
        };
        let health = (checked > 0).then(|| format!("{healthy}/{total}"));
        (state, health)
    };

    let uptime = statuses
        .iter()
        .find(|c| c.state == ContainerState::Running)
        .and_then(|c| parse_uptime(&c.status));

    AggregatedStatus {
        service: service.to_string(),
        state,
        health,
        uptime,
        healthy: (checked > 0).then_some(healthy == checked),
        containers: statuses,
    }
}
