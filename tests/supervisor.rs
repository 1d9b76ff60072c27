mod common;

use std::collections::HashMap;

use devbin::errors::DevbinError;
use devbin::supervisor::{ChildCommand, LaunchOptions, Supervisor};

fn options(dry_run: bool) -> LaunchOptions {
    let env: HashMap<String, String> = std::env::vars().collect();
    LaunchOptions {
        cwd: std::env::current_dir().expect("cwd"),
        env,
        dry_run,
    }
}

#[tokio::test]
async fn dry_run_never_touches_the_registry() {
    common::init_tracing();

    let supervisor = Supervisor::new();
    let cmd = ChildCommand::new("definitely-not-a-real-binary", vec!["--flag".to_string()]);

    supervisor.launch(&cmd, &options(true)).await.unwrap();
    assert!(supervisor.registry().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn zero_exit_resolves_ok() {
    common::init_tracing();

    let supervisor = Supervisor::new();
    let cmd = ChildCommand::new("sh", vec!["-c".to_string(), "exit 0".to_string()]);

    common::with_timeout(supervisor.launch(&cmd, &options(false)))
        .await
        .unwrap();
    assert!(supervisor.registry().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn nonzero_exit_code_is_preserved() {
    common::init_tracing();

    let supervisor = Supervisor::new();
    let cmd = ChildCommand::new("sh", vec!["-c".to_string(), "exit 7".to_string()]);

    let err = common::with_timeout(supervisor.launch(&cmd, &options(false)))
        .await
        .unwrap_err();
    match err {
        DevbinError::ChildProcessFailure { command, code } => {
            assert_eq!(code, Some(7));
            assert!(command.starts_with("sh -c"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(supervisor.registry().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn signal_termination_reports_a_null_code() {
    common::init_tracing();

    let supervisor = Supervisor::new();
    let cmd = ChildCommand::new("sh", vec!["-c".to_string(), "kill -TERM $$".to_string()]);

    let err = common::with_timeout(supervisor.launch(&cmd, &options(false)))
        .await
        .unwrap_err();
    match err {
        DevbinError::ChildProcessFailure { code, .. } => assert_eq!(code, None),
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn spawn_failure_surfaces_immediately() {
    common::init_tracing();

    let supervisor = Supervisor::new();
    let cmd = ChildCommand::new("definitely-not-a-real-binary", vec![]);

    let err = common::with_timeout(supervisor.launch(&cmd, &options(false))).await;
    assert!(err.is_err());
    assert!(supervisor.registry().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn kill_all_reaches_every_registered_child_once() {
    common::init_tracing();

    common::with_timeout(async {
        let supervisor = Supervisor::new();

        let mut handles = Vec::new();
        for _ in 0..2 {
            let supervisor = supervisor.clone();
            handles.push(tokio::spawn(async move {
                let cmd = ChildCommand::new("sleep", vec!["30".to_string()]);
                supervisor.launch(&cmd, &options(false)).await
            }));
        }

        while supervisor.registry().len() < 2 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let killed = supervisor.registry().kill_all();
        assert_eq!(killed, 2);
        assert!(supervisor.registry().is_empty());

        for handle in handles {
            let result = handle.await.expect("launch task");
            match result {
                Err(DevbinError::ChildProcessFailure { code, .. }) => assert_eq!(code, None),
                other => panic!("expected signal failure, got {other:?}"),
            }
        }
    })
    .await;
}
