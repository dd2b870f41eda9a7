pub mod config;
pub mod container;
pub mod manifest;
pub mod service;
pub mod status;

pub use config::NexusConfig;
pub use container::{ContainerDetail, ContainerSnapshot, ContainerState, Health};
pub use manifest::{ManifestEntry, RootManifest};
pub use service::{DeclaredContainer, ResolvedService, ServiceDefinition};
pub use status::{AggregatedStatus, ContainerStatus, ServiceState};
