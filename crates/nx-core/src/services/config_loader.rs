use std::path::Path;

use crate::error::{NexusError, Result};
use crate::models::NexusConfig;

pub const CONFIG_FILENAME: &str = ".nexus.yaml";

/// Load `.nexus.yaml` from the repo root. A missing file yields the defaults.
pub fn load(repo_root: &Path) -> Result<NexusConfig> {
    let config_path = repo_root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        tracing::debug!("no {CONFIG_FILENAME} in {}, using defaults", repo_root.display());
        return Ok(NexusConfig::default());
    }
    let contents = std::fs::read_to_string(&config_path)?;
    if contents.trim().is_empty() {
        return Ok(NexusConfig::default());
    }
    let config: NexusConfig = serde_yaml::from_str(&contents)
        .map_err(|e| NexusError::InvalidConfig(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &NexusConfig) -> Result<()> {
    if config.jobs == 0 {
        return Err(NexusError::InvalidConfig("jobs must be at least 1".into()));
    }
    if config.manifest_names.is_empty() {
        return Err(NexusError::InvalidConfig(
            "manifest_names must list at least one file name".into(),
        ));
    }
    if config.services_dir.trim().is_empty() {
        return Err(NexusError::InvalidConfig("services_dir is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
services_dir: apps
root_manifest: docker-compose.yaml
manifest_names:
  - compose.yaml
global_env_file: shared.env
project: homelab
jobs: 2
"#;
        fs::write(dir.path().join(CONFIG_FILENAME), yaml).unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config.services_dir, "apps");
        assert_eq!(config.root_manifest, "docker-compose.yaml");
        assert_eq!(config.manifest_names, vec!["compose.yaml".to_string()]);
        assert_eq!(config.global_env_file, "shared.env");
        assert_eq!(config.service_env_file, ".env");
        assert_eq!(config.project.as_deref(), Some("homelab"));
        assert_eq!(config.jobs, 2);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(dir.path()).unwrap();
        assert_eq!(config.services_dir, "stacks");
        assert_eq!(config.root_manifest, "compose.yaml");
        assert!(config.jobs >= 1);
        assert!(config.project.is_none());
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "jobs: 0\n").unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(NexusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unparseable_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "jobs: [oops\n").unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(NexusError::InvalidConfig(_))
        ));
    }
}
