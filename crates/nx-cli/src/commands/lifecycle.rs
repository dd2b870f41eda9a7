use color_eyre::Result;

use nx_core::services::compose::{self, Lifecycle};
use nx_core::services::runner::TaskRunner;

use crate::cli::LifecycleArgs;
use crate::render;
use crate::workspace::Workspace;

pub async fn run(workspace: &Workspace, action: Lifecycle, args: &LifecycleArgs) -> Result<bool> {
    let definitions = if args.services.is_empty() {
        if action == Lifecycle::Down
            && !args.yes
            && !super::confirm(
                format!(
                    "Stop and remove every service under {}/?",
                    workspace.registry.services_dir()
                ),
                "--yes",
            )?
        {
            println!("Aborted; no containers touched");
            return Ok(false);
        }
        workspace.registry.definitions().await?
    } else {
        // Resolve every name up front so a typo fails before anything runs.
        let mut definitions = Vec::with_capacity(args.services.len());
        for name in &args.services {
            definitions.push(workspace.registry.resolve(name).await?);
        }
        definitions
    };

    let runner = TaskRunner::new(args.jobs.unwrap_or(workspace.config.jobs));
    tracing::debug!(
        "{} on {} services with {} jobs",
        action.as_str(),
        definitions.len(),
        runner.jobs()
    );

    let listener = super::spawn_interrupt_listener(&runner);
    let outcomes = compose::apply_services(
        &workspace.registry,
        &runner,
        definitions,
        workspace.project(),
        action,
    )
    .await;
    listener.abort();

    print!("{}", render::batch_summary(&outcomes));
    Ok(outcomes.values().all(|o| o.is_success()))
}
