/// Axum webserver lifecycle: bind, serve, shut down on Ctrl-C
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

pub const BIND_HOST: &str = "0.0.0.0";

/// Start the webserver
///
/// Blocks until Ctrl-C is received and in-flight requests have finished.
pub async fn start_server(state: Arc<AppState>, port: u16) -> Result<(), String> {
    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", BIND_HOST, port)
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let listener = TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another process is listening on port {}. Stop it or set PORT / --port.",
            addr, port
        ),
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Port {} requires elevated privileges on this system.\n\
             Consider using a port above 1024.",
            addr, port
        ),
        _ => format!("Failed to bind to {}: {}", addr, e),
    })?;

    logger::info(
        LogTag::Webserver,
        &format!("Towns bot started on port {}", port),
    );
    logger::debug(
        LogTag::Webserver,
        &format!("Webhook endpoint: http://{}/webhook", addr),
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::error(
                LogTag::Webserver,
                &format!("Failed to listen for shutdown signal: {}", e),
            );
            std::future::pending::<()>().await;
        }
        logger::info(LogTag::Webserver, "Received shutdown signal, stopping webserver...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::info(LogTag::Webserver, "Webserver stopped gracefully");
    Ok(())
}
