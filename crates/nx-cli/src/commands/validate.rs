use color_eyre::Result;

use nx_core::services::compose;
use nx_core::services::runner::TaskRunner;

use crate::render;
use crate::workspace::Workspace;

pub async fn run(workspace: &Workspace, service: Option<&str>, jobs: Option<usize>) -> Result<bool> {
    let definitions = match service {
        Some(name) => vec![workspace.registry.resolve(name).await?],
        None => workspace.registry.definitions().await?,
    };

    let runner = TaskRunner::new(jobs.unwrap_or(workspace.config.jobs));
    tracing::debug!(
        "validating {} services with {} jobs",
        definitions.len(),
        runner.jobs()
    );

    let listener = super::spawn_interrupt_listener(&runner);
    let outcomes = compose::validate_services(&workspace.registry, &runner, definitions).await;
    listener.abort();

    print!("{}", render::batch_summary(&outcomes));
    Ok(outcomes.values().all(|o| o.is_success()))
}
