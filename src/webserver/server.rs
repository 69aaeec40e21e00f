/// Axum webserver implementation
///
/// `bind` runs during service start, `serve` inside the spawned task.
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::futures::OwnedNotified;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::{
    config::WebserverConfig,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Bind the configured address
pub async fn bind(config: &WebserverConfig) -> Result<TcpListener, String> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another subnet-monitor instance is probably running.\n\
             Stop it or set [webserver] port in the config file.",
            addr
        ),
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Port {} requires elevated privileges on this system.\n\
             Consider using a port above 1024.",
            addr, config.port
        ),
        _ => format!("Failed to bind to {}: {}", addr, e),
    })
}

/// Serve until `shutdown` fires
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: OwnedNotified,
) -> Result<(), String> {
    if let Ok(addr) = listener.local_addr() {
        logger::info(
            LogTag::Webserver,
            &format!("Dashboard available at http://{}", addr),
        );
        logger::debug(
            LogTag::Webserver,
            &format!("API endpoints available at http://{}/api", addr),
        );
    }

    let shutdown_signal = async move {
        shutdown.await;
        logger::debug(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::debug(LogTag::Webserver, "✅ Webserver stopped gracefully");
    Ok(())
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state).layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
