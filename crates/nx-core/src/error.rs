use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NexusError {
    #[error("service '{0}' not found")]
    ServiceNotFound(String),

    #[error("service '{service}' has a malformed definition: {reason}")]
    MalformedDefinition { service: String, reason: String },

    #[error("manifest out of sync (missing: [{}], orphans: [{}])", .missing.join(", "), .orphans.join(", "))]
    Drift {
        missing: Vec<String>,
        orphans: Vec<String>,
    },

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("root manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    #[error("invalid root manifest: {0}")]
    InvalidManifest(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl NexusError {
    pub(crate) fn external(tool: &str, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(service: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NexusError>;
