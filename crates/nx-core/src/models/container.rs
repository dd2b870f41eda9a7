use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Run-state reported by the container runtime, plus the synthesized `NotCreated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerState {
    Running,
    Exited,
    Created,
    Restarting,
    Removing,
    Paused,
    Dead,
    NotCreated,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Exited => "exited",
            Self::Created => "created",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Paused => "paused",
            Self::Dead => "dead",
            Self::NotCreated => "not-created",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerState {
    type Err = String;

    /// Parses a runtime state. `not-created` is never a runtime value and is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "exited" => Ok(Self::Exited),
            "created" => Ok(Self::Created),
            "restarting" => Ok(Self::Restarting),
            "removing" => Ok(Self::Removing),
            "paused" => Ok(Self::Paused),
            "dead" => Ok(Self::Dead),
            other => Err(format!("unknown container state '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Health {
    Healthy,
    Unhealthy,
    Starting,
    None,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Starting => "starting",
            Self::None => "none",
        }
    }
}

/// Point-in-time view of one container from the bulk runtime query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSnapshot {
    pub name: String,
    pub state: ContainerState,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// Single-container inspect result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetail {
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub networks: Vec<String>,
    pub mounts: Vec<String>,
    pub environment: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_runtime_states() {
        assert_eq!("running".parse::<ContainerState>(), Ok(ContainerState::Running));
        assert_eq!("Exited".parse::<ContainerState>(), Ok(ContainerState::Exited));
        assert_eq!(" paused ".parse::<ContainerState>(), Ok(ContainerState::Paused));
    }

    #[test]
    fn not_created_is_not_a_runtime_state() {
        assert!("not-created".parse::<ContainerState>().is_err());
        assert!("bogus".parse::<ContainerState>().is_err());
    }

    #[test]
    fn state_serializes_kebab_case() {
        let json = serde_json::to_string(&ContainerState::NotCreated).unwrap();
        assert_eq!(json, "\"not-created\"");
    }
}
