use crate::error::{NexusError, Result};
use crate::models::ResolvedService;

use super::compose;
use super::registry::ServiceRegistry;

/// Map a logical service name to its definition and declared containers.
pub async fn resolve(registry: &ServiceRegistry, name: &str) -> Result<ResolvedService> {
    let definition = registry.resolve(name).await?;
    let containers = compose::container_names(&definition).await?;
    Ok(ResolvedService {
        definition,
        containers,
    })
}

/// Resolve every service in the registry.
///
/// A service that fails to resolve does not stop the scan; its error is
/// returned alongside the services that did resolve.
pub async fn resolve_all(
    registry: &ServiceRegistry,
) -> Result<(Vec<ResolvedService>, Vec<(String, NexusError)>)> {
    let mut resolved = Vec::new();
    let mut failures = Vec::new();
    for name in registry.list().await? {
        match resolve(registry, &name).await {
            Ok(service) => resolved.push(service),
            Err(e) => {
                tracing::warn!("failed to resolve {name}: {e}");
                failures.push((name, e));
            }
        }
    }
    Ok((resolved, failures))
}
