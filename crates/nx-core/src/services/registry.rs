use std::path::{Path, PathBuf};

use crate::error::{NexusError, Result};
use crate::models::{NexusConfig, ServiceDefinition};

/// Read-only view of the services root: one directory per logical service.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    repo_root: PathBuf,
    services_dir: String,
    manifest_names: Vec<String>,
    override_name: String,
    global_env_file: String,
    service_env_file: String,
}

impl ServiceRegistry {
    pub fn new(repo_root: &Path, config: &NexusConfig) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            services_dir: normalize_relative(&config.services_dir),
            manifest_names: config.manifest_names.clone(),
            override_name: config.override_name.clone(),
            global_env_file: normalize_relative(&config.global_env_file),
            service_env_file: config.service_env_file.clone(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn services_root(&self) -> PathBuf {
        self.repo_root.join(&self.services_dir)
    }

    /// Services root as written in root manifest references.
    pub fn services_dir(&self) -> &str {
        &self.services_dir
    }

    /// Names of every service with a recognized manifest, sorted by name.
    pub async fn list(&self) -> Result<Vec<String>> {
        let root = self.services_root();
        if !root.is_dir() {
            tracing::warn!("services root {} does not exist", root.display());
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            // `metadata` follows symlinks, so linked stacks count as directories.
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if name.starts_with('.') || !is_dir {
                continue;
            }
            if self.find_manifest(&entry.path()).is_some() {
                names.push(name);
            } else {
                tracing::debug!("skipping {name}: no recognized manifest");
            }
        }

        names.sort();
        Ok(names)
    }

    /// Definitions for every listed service, in name order.
    pub async fn definitions(&self) -> Result<Vec<ServiceDefinition>> {
        let names = self.list().await?;
        let mut definitions = Vec::with_capacity(names.len());
        for name in names {
            definitions.push(self.resolve(&name).await?);
        }
        Ok(definitions)
    }

    /// Exact-name lookup. Fails with `ServiceNotFound` when no manifest exists.
    pub async fn resolve(&self, name: &str) -> Result<ServiceDefinition> {
        if !is_valid_name(name) {
            return Err(NexusError::ServiceNotFound(name.to_string()));
        }
        let directory = self.services_root().join(name);
        let manifest_file = self
            .find_manifest(&directory)
            .ok_or_else(|| NexusError::ServiceNotFound(name.to_string()))?;

        let override_path = directory.join(&self.override_name);
        Ok(ServiceDefinition {
            name: name.to_string(),
            manifest_path: directory.join(&manifest_file),
            manifest_ref: format!("{}/{name}/{manifest_file}", self.services_dir),
            override_path: override_path.is_file().then_some(override_path),
            directory,
        })
    }

    /// Env files for a service's manifest entry: the global file, then the
    /// service's own file when it exists on disk.
    pub fn env_files_for(&self, name: &str) -> Vec<String> {
        let mut files = vec![self.global_env_file.clone()];
        let service_env = self.services_root().join(name).join(&self.service_env_file);
        if service_env.is_file() {
            files.push(format!(
                "{}/{name}/{}",
                self.services_dir, self.service_env_file
            ));
        }
        files
    }

    /// Service name for a root-manifest path of the form `<services_dir>/<name>/<file>`.
    pub fn service_for_ref(&self, manifest_ref: &str) -> Option<String> {
        let normalized = normalize_relative(manifest_ref);
        let rest = normalized
            .strip_prefix(&self.services_dir)?
            .strip_prefix('/')?;
        let (name, file) = rest.split_once('/')?;
        if file.is_empty() || file.contains('/') || !is_valid_name(name) {
            return None;
        }
        Some(name.to_string())
    }

    fn find_manifest(&self, directory: &Path) -> Option<String> {
        self.manifest_names
            .iter()
            .find(|candidate| directory.join(candidate).is_file())
            .cloned()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
}

/// Strip surrounding whitespace, a leading `./` and trailing slashes.
pub(crate) fn normalize_relative(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    trimmed.strip_prefix("./").unwrap_or(trimmed).to_string()
}
