use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tenantgate_api::config::{GateConfig, RegistrySource};
use tenantgate_auth::{SharedGate, TenantGate};
use tenantgate_events::{BoundedSink, TracingSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tenantgate_observability::init();

    let config = GateConfig::from_env().context("invalid configuration")?;

    let sink = Arc::new(
        BoundedSink::spawn(config.event_queue_capacity, TracingSink::new())
            .context("failed to start security event sink")?,
    );

    // Fail closed: a registry error yields a gate that denies everything.
    let gate = TenantGate::from_registry(config.registry.load(), sink.clone());
    let shared = Arc::new(SharedGate::new(gate));

    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(Arc::clone(&shared), config.registry.clone()));

    let app = tenantgate_api::app::build_app(shared);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sink.shutdown();
    if sink.lost() > 0 {
        warn!(events_lost = sink.lost(), "security events were lost during this run");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Re-read the registry on SIGHUP and swap it in.
#[cfg(unix)]
async fn reload_on_hangup(shared: Arc<SharedGate>, source: RegistrySource) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "SIGHUP registry reload disabled");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        info!("SIGHUP received; reloading tenant registry");
        // Failure is logged inside reload; the active registry stays.
        let _ = shared.reload(source.load());
    }
}
