use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{NexusError, Result};
use crate::models::{ManifestEntry, NexusConfig, RootManifest};

use super::manifest;
use super::registry::{normalize_relative, ServiceRegistry};
use super::resolver;

/// A root-manifest entry whose service directory no longer exists.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Orphan {
    pub service: String,
    pub path: String,
}

/// Comparison of the services on disk with the entries of the root manifest.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DriftReport {
    pub consistent: Vec<String>,
    pub missing: Vec<String>,
    pub orphans: Vec<Orphan>,
}

impl DriftReport {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty()
    }

    pub fn orphan_names(&self) -> Vec<String> {
        self.orphans.iter().map(|o| o.service.clone()).collect()
    }

    /// `Drift` error when the two sides disagree.
    pub fn into_result(self) -> Result<Self> {
        if self.is_consistent() {
            Ok(self)
        } else {
            Err(NexusError::Drift {
                missing: self.missing.clone(),
                orphans: self.orphan_names(),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub added: Vec<String>,
    pub rejected: Vec<(String, NexusError)>,
    pub written: bool,
}

#[derive(Debug, Default)]
pub struct RemovalOutcome {
    pub removed: Vec<Orphan>,
    pub written: bool,
}

/// Compute consistent, missing and orphaned services. Pure and order-independent.
///
/// `disk` maps each service on disk to its manifest reference. A tracked entry
/// naming a service on disk but a different manifest file is an orphan, and the
/// service counts as missing until an entry with the right path exists.
pub fn compare<F>(disk: &BTreeMap<String, String>, root: &RootManifest, service_of: F) -> DriftReport
where
    F: Fn(&str) -> Option<String>,
{
    let mut referenced = BTreeSet::new();
    let mut orphans = Vec::new();

    for path in root.paths() {
        let Some(service) = service_of(path) else {
            continue;
        };
        match disk.get(&service) {
            Some(manifest_ref) if normalize_relative(path) == *manifest_ref => {
                referenced.insert(service);
            }
            _ => {
                let orphan = Orphan {
                    service,
                    path: path.to_string(),
                };
                if !orphans.contains(&orphan) {
                    orphans.push(orphan);
                }
            }
        }
    }
    orphans.sort_by(|a, b| a.service.cmp(&b.service).then(a.path.cmp(&b.path)));

    let (consistent, missing): (Vec<String>, Vec<String>) = disk
        .keys()
        .cloned()
        .partition(|name| referenced.contains(name));

    DriftReport {
        consistent,
        missing,
        orphans,
    }
}

/// Keeps the root include-manifest in step with the services directory.
///
/// Edits are read-whole-file, compute, write-whole-file; concurrent runs
/// against one manifest are not supported.
pub struct ManifestSynchronizer {
    registry: ServiceRegistry,
    manifest_path: PathBuf,
}

impl ManifestSynchronizer {
    pub fn new(registry: ServiceRegistry, config: &NexusConfig) -> Self {
        let manifest_path = registry.repo_root().join(&config.root_manifest);
        Self {
            registry,
            manifest_path,
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    fn service_of(&self) -> impl Fn(&str) -> Option<String> + '_ {
        |path| self.registry.service_for_ref(path)
    }

    /// Every service on disk with the manifest reference its entry must carry.
    async fn disk_refs(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .registry
            .definitions()
            .await?
            .into_iter()
            .map(|d| (d.name, d.manifest_ref))
            .collect())
    }

    /// Read-only drift report.
    pub async fn check(&self) -> Result<DriftReport> {
        let (_, root) = manifest::read(&self.manifest_path).await?;
        let disk = self.disk_refs().await?;
        Ok(compare(&disk, &root, self.service_of()))
    }

    /// Add an entry for every service on disk that the manifest lacks.
    ///
    /// Services that fail to resolve are rejected, not added. A missing
    /// manifest file is created.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let (original, mut root) = match manifest::read(&self.manifest_path).await {
            Ok(read) => read,
            Err(NexusError::ManifestNotFound(_)) => (String::new(), RootManifest::default()),
            Err(e) => return Err(e),
        };
        let disk = self.disk_refs().await?;
        let report = compare(&disk, &root, self.service_of());

        let mut outcome = SyncOutcome::default();
        for name in report.missing {
            let service = match resolver::resolve(&self.registry, &name).await {
                Ok(service) => service,
                Err(e) => {
                    tracing::warn!("not adding {name}: {e}");
                    outcome.rejected.push((name, e));
                    continue;
                }
            };
            let entry = ManifestEntry::new(
                service.definition.manifest_ref.clone(),
                self.registry.env_files_for(&name),
            );
            root.insert_sorted(entry, &name, self.service_of());
            tracing::debug!("added {name} to root manifest");
            outcome.added.push(name);
        }

        outcome.written = manifest::write_if_changed(&self.manifest_path, &original, &root).await?;
        Ok(outcome)
    }

    /// Delete the manifest entry of every orphaned service.
    ///
    /// Callers are responsible for obtaining operator confirmation first.
    pub async fn remove_orphans(&self) -> Result<RemovalOutcome> {
        let (original, mut root) = manifest::read(&self.manifest_path).await?;
        let disk = self.disk_refs().await?;
        let report = compare(&disk, &root, self.service_of());

        let mut outcome = RemovalOutcome::default();
        for orphan in report.orphans {
            if root.remove_path(&orphan.path) > 0 {
                tracing::debug!("removed orphan {} ({})", orphan.service, orphan.path);
                outcome.removed.push(orphan);
            }
        }

        outcome.written = manifest::write_if_changed(&self.manifest_path, &original, &root).await?;
        Ok(outcome)
    }
}
