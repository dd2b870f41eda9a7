use color_eyre::Result;

use crate::cli::SyncMode;
use crate::render;
use crate::workspace::Workspace;

/// Returns `Ok(false)` when drift remains (check mode, rejected services, declined removal).
pub async fn run(workspace: &Workspace, mode: SyncMode, assume_yes: bool) -> Result<bool> {
    let synchronizer = workspace.synchronizer();

    match mode {
        SyncMode::Check => {
            let report = synchronizer.check().await?;
            print!("{}", render::drift_report(&report));
            match report.into_result() {
                Ok(_) => Ok(true),
                Err(drift) => {
                    tracing::debug!("{drift}");
                    Ok(false)
                }
            }
        }
        SyncMode::Sync => {
            let outcome = synchronizer.sync().await?;
            print!("{}", render::sync_outcome(&outcome));
            Ok(outcome.rejected.is_empty())
        }
        SyncMode::RemoveOrphans => {
            let report = synchronizer.check().await?;
            if report.orphans.is_empty() {
                println!("No orphaned entries");
                return Ok(true);
            }
            print!("{}", render::drift_report(&report));

            if !assume_yes && !confirm_removal(report.orphans.len())? {
                println!("Aborted; root manifest unchanged");
                return Ok(false);
            }

            let outcome = synchronizer.remove_orphans().await?;
            print!("{}", render::removal_outcome(&outcome));
            Ok(true)
        }
    }
}

fn confirm_removal(count: usize) -> Result<bool> {
    let noun = if count == 1 { "entry" } else { "entries" };
    super::confirm(format!("Remove {count} orphaned manifest {noun}?"), "--yes")
}
