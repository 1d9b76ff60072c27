// src/runtime/port.rs

//! Dev-server port resolution.

use std::path::Path;

use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::context::InvocationContext;

pub const DEFAULT_PORT: u16 = 7001;
pub const DEFAULT_PORT_ENV: &str = "DEVBIN_DEFAULT_PORT";
const LOCAL_CONFIG: &str = "config/config.local.json";
const PORT_SCAN_LIMIT: u16 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalConfig {
    cluster: ClusterConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClusterConfig {
    listen: ListenConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListenConfig {
    port: Option<u16>,
}

/// Decide the dev-server port: the explicit flag, then the project's
/// local configuration, then the first free port at or above the
/// default.
pub async fn resolve_port(ctx: &InvocationContext, explicit: Option<u16>) -> u16 {
    if let Some(port) = explicit {
        return port;
    }

    if let Some(port) = configured_port(ctx.base()).await {
        debug!(port, "using port from local configuration");
        return port;
    }

    let default = ctx
        .env_var(DEFAULT_PORT_ENV)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let port = detect_free_port(default).await;
    if port != default {
        warn!(
            wanted = default,
            using = port,
            "server port is unavailable, switched to a free one"
        );
    }
    port
}

/// Configuration read errors are swallowed on purpose: a missing or
/// broken local config just means falling through to port detection.
async fn configured_port(base: &Path) -> Option<u16> {
    let path = base.join(LOCAL_CONFIG);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no local configuration");
            return None;
        }
    };
    match serde_json::from_str::<LocalConfig>(&contents) {
        Ok(config) => config.cluster.listen.port,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "ignoring unparseable local configuration");
            None
        }
    }
}

async fn detect_free_port(start: u16) -> u16 {
    let mut port = start;
    loop {
        if TcpListener::bind(("127.0.0.1", port)).await.is_ok() {
            return port;
        }
        if port.wrapping_sub(start) >= PORT_SCAN_LIMIT {
            // Nothing free in a reasonable range; let the bind in the
            // child report the real error.
            return start;
        }
        port = port.saturating_add(1);
    }
}
