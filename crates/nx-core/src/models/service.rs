use std::path::PathBuf;

use serde::Serialize;

/// A service directory under the services root that holds a recognized manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
    /// Manifest path relative to the repo root, as referenced by the root manifest.
    pub manifest_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_path: Option<PathBuf>,
}

/// One container declared by a service manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredContainer {
    pub name: String,
    pub has_healthcheck: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedService {
    pub definition: ServiceDefinition,
    pub containers: Vec<DeclaredContainer>,
}

impl ResolvedService {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers.iter().map(|c| c.name.clone()).collect()
    }
}
