pub mod lifecycle;
pub mod list;
pub mod status;
pub mod sync;
pub mod validate;

use std::io::IsTerminal;
use std::sync::atomic::Ordering;

use color_eyre::eyre::bail;
use color_eyre::Result;
use dialoguer::Confirm;
use tokio::task::JoinHandle;

use nx_core::services::runner::TaskRunner;

/// Ask before a destructive edit. Without a terminal there is nobody to ask.
fn confirm(prompt: String, flag_hint: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("refusing to continue without confirmation; pass {flag_hint}");
    }
    let confirmed = Confirm::new().with_prompt(prompt).default(false).interact()?;
    Ok(confirmed)
}

/// Ctrl-C stops new launches; operations already running are left to finish.
fn spawn_interrupt_listener(runner: &TaskRunner) -> JoinHandle<()> {
    let interrupted = runner.interrupt_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted; waiting for running operations to finish");
            interrupted.store(true, Ordering::SeqCst);
        }
    })
}
