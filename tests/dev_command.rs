mod common;

use devbin::runtime::resolve_port;
use devbin_test_utils::ProjectBuilder;

#[tokio::test]
async fn explicit_port_flag_wins() {
    common::init_tracing();

    let project = ProjectBuilder::new().build();
    let ctx = project.context();

    assert_eq!(resolve_port(&ctx, Some(8080)).await, 8080);
}

#[tokio::test]
async fn configured_port_is_read_from_the_local_config() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .file(
            "config/config.local.json",
            r#"{ "cluster": { "listen": { "port": 7100 } } }"#,
        )
        .build();
    let ctx = project.context();

    assert_eq!(resolve_port(&ctx, None).await, 7100);
}

#[tokio::test]
async fn broken_local_config_is_swallowed() {
    common::init_tracing();

    let project = ProjectBuilder::new()
        .file("config/config.local.json", "{ not json")
        .build();
    // Default port pushed far away from common dev servers so the
    // detection path has a realistic chance of an immediate hit.
    let ctx = project.context_with_env(&[("DEVBIN_DEFAULT_PORT", "39170")]);

    let port = resolve_port(&ctx, None).await;
    assert!(port >= 39170);
}

#[tokio::test]
async fn busy_default_port_moves_to_a_free_one() {
    common::init_tracing();

    let project = ProjectBuilder::new().build();

    // Hold a port, then declare it the default.
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("binding probe listener");
    let busy = listener.local_addr().expect("local addr").port();

    let default = busy.to_string();
    let ctx = project.context_with_env(&[("DEVBIN_DEFAULT_PORT", default.as_str())]);

    let port = resolve_port(&ctx, None).await;
    assert_ne!(port, busy);
    assert!(port > busy);
}
