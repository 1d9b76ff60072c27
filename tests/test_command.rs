mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use devbin::cli::TestArgs;
use devbin::commands::test;
use devbin::context::InvocationContext;
use devbin::errors::DevbinError;
use devbin::supervisor::Supervisor;
use devbin_test_utils::ProjectBuilder;
use serde_json::json;

fn plain_js_args() -> TestArgs {
    TestArgs {
        common: devbin::cli::CommonArgs {
            no_typescript: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn missing_base_dir_is_a_distinct_error() {
    common::init_tracing();

    let ctx = InvocationContext::new(
        PathBuf::from("/definitely/not/a/real/base"),
        HashMap::new(),
        std::env::temp_dir(),
    );

    let err = test::prepare(&ctx, &plain_js_args()).await.unwrap_err();
    assert!(matches!(err, DevbinError::BaseDirMissing(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn no_test_files_is_an_early_success() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .file("test/helper.js", "// not a test\n")
        .build();
    let ctx = project.context();

    let invocation = test::prepare(&ctx, &plain_js_args()).await.unwrap();
    assert!(invocation.is_none());
}

#[tokio::test]
async fn prepared_invocation_places_files_after_flags() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .module_file("mocha/bin/_mocha")
        .test_file("a.test.js")
        .test_file("b.test.js")
        .build();
    let ctx = project.context();

    let invocation = test::prepare(&ctx, &plain_js_args())
        .await
        .unwrap()
        .expect("invocation");

    assert!(invocation.mocha_file.ends_with("node_modules/mocha/bin/_mocha"));
    let args = &invocation.runner_args;
    assert_eq!(args[0], "--exit");
    assert!(args.contains(&"--timeout=60000".to_string()));
    assert_eq!(
        &args[args.len() - 2..],
        ["test/a.test.js".to_string(), "test/b.test.js".to_string()]
    );
}

#[tokio::test]
async fn manifest_requires_and_mock_registration_are_appended() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .tool_section(json!({ "require": "./test/helper.js" }))
        .module_file("mocha/bin/_mocha")
        .module_file("devbin-mock/register.js")
        .test_file("a.test.js")
        .build();
    let ctx = project.context();

    let invocation = test::prepare(&ctx, &plain_js_args())
        .await
        .unwrap()
        .expect("invocation");

    let requires: Vec<&String> = invocation
        .runner_args
        .iter()
        .filter(|arg| arg.starts_with("--require="))
        .collect();
    assert_eq!(requires.len(), 2);
    assert_eq!(requires[0], "--require=./test/helper.js");
    assert!(requires[1].ends_with("node_modules/devbin-mock/register.js"));
}

#[tokio::test]
async fn plugins_do_not_get_the_mock_registration() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("plugin"))
        .manifest_field("devbinPlugin", json!({ "name": "plugin" }))
        .module_file("mocha/bin/_mocha")
        .module_file("devbin-mock/register.js")
        .test_file("a.test.js")
        .build();
    let ctx = project.context();

    let invocation = test::prepare(&ctx, &plain_js_args())
        .await
        .unwrap()
        .expect("invocation");

    assert!(
        !invocation
            .runner_args
            .iter()
            .any(|arg| arg.starts_with("--require="))
    );
}

#[tokio::test]
async fn reporter_env_override_wins() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .module_file("mocha/bin/_mocha")
        .test_file("a.test.js")
        .build();
    let ctx = project.context_with_env(&[("TEST_REPORTER", "spec")]);

    let invocation = test::prepare(&ctx, &plain_js_args())
        .await
        .unwrap()
        .expect("invocation");

    assert!(
        invocation
            .runner_args
            .contains(&"--reporter=spec".to_string())
    );
    assert!(
        !invocation
            .runner_args
            .iter()
            .any(|arg| arg.starts_with("--reporter-options="))
    );
}

#[tokio::test]
async fn mocha_file_env_override_wins() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .test_file("a.test.js")
        .build();
    let ctx = project.context_with_env(&[("MOCHA_FILE", "/opt/custom/_mocha")]);

    let invocation = test::prepare(&ctx, &plain_js_args())
        .await
        .unwrap()
        .expect("invocation");
    assert_eq!(invocation.mocha_file, PathBuf::from("/opt/custom/_mocha"));
}

#[tokio::test]
async fn dry_run_prepares_without_spawning() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .manifest_field("name", json!("app"))
        .module_file("mocha/bin/_mocha")
        .test_file("a.test.js")
        .build();
    let ctx = project.context();

    let mut args = plain_js_args();
    args.common.dry_run = true;

    let supervisor = Supervisor::new();
    test::run(&ctx, &supervisor, &args).await.unwrap();
    assert!(supervisor.registry().is_empty());
}
