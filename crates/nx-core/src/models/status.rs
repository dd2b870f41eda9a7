use std::fmt;

use serde::Serialize;

use super::container::{ContainerState, Health};

/// Placeholder rendered when a rolled-up value is undefined.
pub const UNDEFINED: &str = "—";

/// Service-level state after rollup.
///
/// Single-container services pass their container's state through; services
/// with several containers collapse to `Running`, `Partial` or `NotCreated`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceState {
    Running,
    Partial,
    NotCreated,
    Exited,
    Created,
    Restarting,
    Removing,
    Paused,
    Dead,
}

impl From<ContainerState> for ServiceState {
    fn from(state: ContainerState) -> Self {
        match state {
            ContainerState::Running => Self::Running,
            ContainerState::Exited => Self::Exited,
            ContainerState::Created => Self::Created,
            ContainerState::Restarting => Self::Restarting,
            ContainerState::Removing => Self::Removing,
            ContainerState::Paused => Self::Paused,
            ContainerState::Dead => Self::Dead,
            ContainerState::NotCreated => Self::NotCreated,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Partial => "partial",
            Self::NotCreated => "not created",
            Self::Exited => "exited",
            Self::Created => "created",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Paused => "paused",
            Self::Dead => "dead",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    pub state: ContainerState,
    pub health: Health,
    pub status: String,
    /// Present in the runtime but labelled with another compose project.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub foreign: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStatus {
    pub service: String,
    pub state: ServiceState,
    /// `healthy/total` for groups, the health word for a single container.
    pub health: Option<String>,
    pub uptime: Option<String>,
    /// True iff every health-checked container reports healthy.
    pub healthy: Option<bool>,
    pub containers: Vec<ContainerStatus>,
}

impl AggregatedStatus {
    pub fn health_label(&self) -> &str {
        self.health.as_deref().unwrap_or(UNDEFINED)
    }

    pub fn uptime_label(&self) -> &str {
        self.uptime.as_deref().unwrap_or(UNDEFINED)
    }
}
