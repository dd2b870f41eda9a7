mod common;

use nx_cli::cli::LifecycleArgs;
use nx_cli::commands::lifecycle;
use nx_cli::workspace::Workspace;
use nx_core::services::compose::Lifecycle;

use common::Fleet;

fn args(services: &[&str]) -> LifecycleArgs {
    LifecycleArgs {
        services: services.iter().map(|s| s.to_string()).collect(),
        jobs: Some(2),
        yes: false,
    }
}

#[tokio::test]
async fn unknown_service_fails_before_anything_runs() {
    let fleet = Fleet::new();
    fleet.service("alpha", &["alpha"]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    let err = lifecycle::run(&workspace, Lifecycle::Up, &args(&["alpha", "ghost"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("service 'ghost' not found"));
}

#[tokio::test]
async fn malformed_service_is_reported_as_failed() {
    let fleet = Fleet::new();
    fleet.service("hollow", &[]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    let ok = lifecycle::run(&workspace, Lifecycle::Restart, &args(&["hollow"]))
        .await
        .unwrap();
    assert!(!ok);
}
