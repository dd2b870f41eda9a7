mod common;

use nx_cli::cli::SyncMode;
use nx_cli::commands::sync;
use nx_cli::workspace::Workspace;

use common::{include_for, Fleet};

#[tokio::test]
async fn check_reports_drift_without_writing() {
    let fleet = Fleet::new();
    fleet
        .service("alpha", &["alpha"])
        .service("beta", &["beta"])
        .manifest(&include_for(&["alpha", "delta"]));
    let before = fleet.read_manifest();

    let workspace = Workspace::open(fleet.root()).unwrap();
    let clean = sync::run(&workspace, SyncMode::Check, false).await.unwrap();

    assert!(!clean);
    assert_eq!(fleet.read_manifest(), before);
}

#[tokio::test]
async fn sync_then_check_is_clean() {
    let fleet = Fleet::new();
    fleet
        .service("alpha", &["alpha"])
        .service("beta", &["beta", "beta-worker"])
        .manifest(&include_for(&["alpha"]));

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(sync::run(&workspace, SyncMode::Sync, false).await.unwrap());
    assert!(fleet.read_manifest().contains("stacks/beta/compose.yaml"));
    assert!(sync::run(&workspace, SyncMode::Check, false).await.unwrap());
}

#[tokio::test]
async fn sync_reports_rejected_services() {
    let fleet = Fleet::new();
    fleet
        .service("alpha", &["alpha"])
        .service("hollow", &[])
        .manifest(&include_for(&["alpha"]));

    let workspace = Workspace::open(fleet.root()).unwrap();
    let clean = sync::run(&workspace, SyncMode::Sync, false).await.unwrap();

    assert!(!clean);
    assert!(!fleet.read_manifest().contains("hollow"));
}

#[tokio::test]
async fn remove_orphans_with_yes_drops_entries() {
    let fleet = Fleet::new();
    fleet
        .service("alpha", &["alpha"])
        .manifest(&include_for(&["alpha", "delta"]));

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(sync::run(&workspace, SyncMode::RemoveOrphans, true).await.unwrap());
    assert_eq!(fleet.read_manifest(), include_for(&["alpha"]));
}

#[tokio::test]
async fn remove_orphans_without_orphans_leaves_manifest_alone() {
    let fleet = Fleet::new();
    fleet
        .service("alpha", &["alpha"])
        .manifest(&include_for(&["alpha"]));
    let before = fleet.read_manifest();

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(sync::run(&workspace, SyncMode::RemoveOrphans, false).await.unwrap());
    assert_eq!(fleet.read_manifest(), before);
}

#[tokio::test]
async fn check_without_manifest_is_an_error() {
    let fleet = Fleet::new();
    fleet.service("alpha", &["alpha"]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    let err = sync::run(&workspace, SyncMode::Check, false).await.unwrap_err();
    assert!(err.to_string().contains("root manifest not found"));
}
