use serde::Deserialize;

/// Repository layout and defaults, read from `.nexus.yaml` at the repo root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    pub services_dir: String,
    pub root_manifest: String,
    pub manifest_names: Vec<String>,
    pub override_name: String,
    pub global_env_file: String,
    pub service_env_file: String,
    /// Expected `com.docker.compose.project` label on containers we own.
    pub project: Option<String>,
    pub jobs: usize,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            services_dir: "stacks".into(),
            root_manifest: "compose.yaml".into(),
            manifest_names: vec![
                "compose.yaml".into(),
                "compose.yml".into(),
                "docker-compose.yaml".into(),
                "docker-compose.yml".into(),
            ],
            override_name: "compose.override.yaml".into(),
            global_env_file: ".env".into(),
            service_env_file: ".env".into(),
            project: None,
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
