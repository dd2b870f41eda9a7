use std::path::{Path, PathBuf};

use nx_core::models::NexusConfig;
use nx_core::services::config_loader;
use nx_core::services::registry::ServiceRegistry;
use nx_core::services::synchronizer::ManifestSynchronizer;

/// Repository root plus everything derived from its config, built once per invocation.
pub struct Workspace {
    pub root: PathBuf,
    pub config: NexusConfig,
    pub registry: ServiceRegistry,
}

impl Workspace {
    pub fn open(root: &Path) -> nx_core::Result<Self> {
        let config = config_loader::load(root)?;
        let registry = ServiceRegistry::new(root, &config);
        Ok(Self {
            root: root.to_path_buf(),
            config,
            registry,
        })
    }

    pub fn synchronizer(&self) -> ManifestSynchronizer {
        ManifestSynchronizer::new(self.registry.clone(), &self.config)
    }

    pub fn project(&self) -> Option<&str> {
        self.config.project.as_deref()
    }
}
