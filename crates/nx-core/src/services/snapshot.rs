use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::ContainerSnapshot;

use super::docker;

/// Immutable, point-in-time map of every container known to the runtime.
///
/// Built from a single bulk query; callers that need state for many services
/// share one value. A later snapshot is a new value, never a merge.
#[derive(Debug, Clone)]
pub struct ContainerStateCache {
    taken_at: DateTime<Utc>,
    containers: HashMap<String, ContainerSnapshot>,
}

impl ContainerStateCache {
    /// Query the runtime once and index the result by container name.
    pub async fn snapshot() -> Result<Self> {
        let containers = docker::list_containers().await?;
        tracing::debug!("snapshot captured {} containers", containers.len());
        Ok(Self::from_containers(containers))
    }

    pub fn from_containers(containers: impl IntoIterator<Item = ContainerSnapshot>) -> Self {
        Self {
            taken_at: Utc::now(),
            containers: containers
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
        }
    }

    /// `None` means the container was never created.
    pub fn get(&self, name: &str) -> Option<&ContainerSnapshot> {
        self.containers.get(name)
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
