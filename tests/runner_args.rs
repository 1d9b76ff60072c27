mod common;

use devbin::targets::{
    Reporter, RunnerArgsSpec, Timeout, build_runner_args, resolve_timeout,
};

#[test]
fn arguments_come_in_the_documented_order() {
    common::init_tracing();

    let spec = RunnerArgsSpec {
        dry_run: true,
        bail: true,
        grep: vec!["login".to_string(), "logout".to_string()],
        timeout: Timeout::Millis(5000),
        parallel: true,
        jobs: Some(4),
        reporter: Some(Reporter {
            module: "awesome-reporter".to_string(),
            options: Some("reportDir=reports".to_string()),
        }),
        requires: vec!["./helper.js".to_string()],
        files: vec!["test/a.test.js".to_string(), "test/b.test.js".to_string()],
    };

    assert_eq!(
        build_runner_args(&spec),
        vec![
            "--dry-run",
            "--exit",
            "--bail",
            "--grep=login",
            "--grep=logout",
            "--timeout=5000",
            "--parallel",
            "--jobs=4",
            "--reporter=awesome-reporter",
            "--reporter-options=reportDir=reports",
            "--require=./helper.js",
            "test/a.test.js",
            "test/b.test.js",
        ]
    );
}

#[test]
fn zero_timeout_means_unlimited() {
    common::init_tracing();

    let spec = RunnerArgsSpec {
        timeout: Timeout::Millis(0),
        ..Default::default()
    };
    let args = build_runner_args(&spec);
    assert!(args.contains(&"--no-timeout".to_string()));
    assert!(!args.iter().any(|arg| arg.starts_with("--timeout=")));
}

#[test]
fn jobs_are_only_emitted_in_parallel_mode() {
    common::init_tracing();

    let spec = RunnerArgsSpec {
        jobs: Some(4),
        ..Default::default()
    };
    let args = build_runner_args(&spec);
    assert!(!args.contains(&"--parallel".to_string()));
    assert!(!args.iter().any(|arg| arg.starts_with("--jobs=")));
}

#[test]
fn reporter_options_require_a_reporter() {
    common::init_tracing();

    let spec = RunnerArgsSpec::default();
    let args = build_runner_args(&spec);
    assert!(!args.iter().any(|arg| arg.starts_with("--reporter")));
}

#[test]
fn timeout_precedence_flag_env_default() {
    common::init_tracing();

    assert_eq!(
        resolve_timeout(false, Some(1500), Some("9000"), false),
        Timeout::Millis(1500)
    );
    assert_eq!(
        resolve_timeout(false, None, Some("9000"), false),
        Timeout::Millis(9000)
    );
    assert_eq!(
        resolve_timeout(false, None, Some("not-a-number"), false),
        Timeout::Millis(60_000)
    );
    assert_eq!(resolve_timeout(false, None, None, false), Timeout::Millis(60_000));
    assert_eq!(resolve_timeout(true, Some(1500), None, false), Timeout::Disabled);
}

#[test]
fn inspector_override_beats_everything() {
    common::init_tracing();

    assert_eq!(
        resolve_timeout(false, Some(1500), Some("9000"), true),
        Timeout::Disabled
    );
}
