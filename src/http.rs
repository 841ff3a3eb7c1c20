//! Optional HTTP endpoint served next to the gateway connection.
//!
//! The server binds only when the bot has both an address and a router. Stopping it
//! triggers axum's graceful shutdown and waits for in-flight requests to finish.

use std::net::SocketAddr;

use axum::Router;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::Result;

pub struct HttpServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl HttpServer {
    /// Binds `address` and serves `router` on a background task.
    ///
    /// # Arguments
    /// - `address` - Address to bind, port `0` picks a free port
    /// - `router` - Application routes, wrapped in a request trace layer
    ///
    /// # Returns
    /// - `Ok(HttpServer)` - Listening
    /// - `Err(BotError::IoErr)` - The address could not be bound
    pub async fn start(address: SocketAddr, router: Router) -> Result<Self> {
        let listener = TcpListener::bind(address).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let app = router.layer(TraceLayer::new_for_http());
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                signal.await.ok();
            });

            if let Err(e) = server.await {
                error!("HTTP server error: {}", e);
            }
        });

        info!("HTTP server listening on {}", local_addr);

        Ok(Self {
            local_addr,
            shutdown,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signals graceful shutdown and waits for the server task to end.
    pub async fn stop(self) {
        self.shutdown.send(()).ok();

        if let Err(e) = self.task.await {
            error!("HTTP server task failed: {}", e);
        }

        info!("HTTP server on {} stopped", self.local_addr);
    }
}
