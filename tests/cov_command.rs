mod common;

use devbin::cli::{CommonArgs, CovArgs, TestArgs};
use devbin::commands::cov;
use devbin::supervisor::Supervisor;
use devbin_test_utils::ProjectBuilder;
use serde_json::json;

fn dry_run_args() -> CovArgs {
    CovArgs {
        test: TestArgs {
            common: CommonArgs {
                no_typescript: true,
                dry_run: true,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn stale_coverage_output_is_removed_before_the_run() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .module_file("mocha/bin/_mocha")
        .module_file("c8/bin/c8.js")
        .test_file("a.test.js")
        .file("coverage/lcov.info", "stale\n")
        .file("node_modules/.c8_output/stale.json", "{}\n")
        .build();
    let ctx = project.context();

    let supervisor = Supervisor::new();
    cov::run(&ctx, &supervisor, &dry_run_args()).await.unwrap();

    assert!(!project.path().join("coverage").exists());
    assert!(!project.path().join("node_modules/.c8_output").exists());
    assert!(supervisor.registry().is_empty());
}

#[tokio::test]
async fn no_test_files_short_circuits_before_the_coverage_tool() {
    common::init_tracing();

    // No c8 entry installed: resolution would fail if the command got
    // that far, so the early exit must come first.
    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .module_file("mocha/bin/_mocha")
        .build();
    let ctx = project.context();

    let supervisor = Supervisor::new();
    cov::run(&ctx, &supervisor, &dry_run_args()).await.unwrap();
    assert!(supervisor.registry().is_empty());
}
