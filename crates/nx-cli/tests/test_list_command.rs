mod common;

use nx_cli::cli::OutputFormat;
use nx_cli::commands::list;
use nx_cli::workspace::Workspace;

use common::Fleet;

#[tokio::test]
async fn list_succeeds_for_well_formed_services() {
    let fleet = Fleet::new();
    fleet.service("alpha", &["alpha"]).service("beta", &["beta"]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(list::run(&workspace, None, OutputFormat::Json).await.unwrap());
}

#[tokio::test]
async fn list_fails_when_a_service_is_malformed() {
    let fleet = Fleet::new();
    fleet.service("alpha", &["alpha"]).service("hollow", &[]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(!list::run(&workspace, None, OutputFormat::Table).await.unwrap());
}

#[tokio::test]
async fn filter_hides_failures_of_other_services() {
    let fleet = Fleet::new();
    fleet.service("alpha", &["alpha"]).service("hollow", &[]);

    let workspace = Workspace::open(fleet.root()).unwrap();
    assert!(list::run(&workspace, Some("alp"), OutputFormat::Table).await.unwrap());
}
