use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::ServerConfig;
use crate::router::RouteTable;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A bound, not yet serving, HTTP endpoint.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    app_name: String,
    shutdown: Arc<Notify>,
}

/// Stops a running [`Server`]. In-flight requests are allowed to finish.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<Notify>,
}

impl ShutdownHandle {
    /// Request shutdown. Calling this before `start` makes the server stop as
    /// soon as it starts.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let addr = config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            app_name: config.app_name.clone(),
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Actual bound address (resolves port `0`).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Serve `routes` until [`ShutdownHandle::stop`] is called.
    pub async fn start(self, routes: RouteTable) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        tracing::info!(app = %self.app_name, %addr, routes = routes.len(), "listening");

        let shutdown = self.shutdown.clone();
        axum::serve(self.listener, routes.into_axum())
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await?;

        tracing::info!(app = %self.app_name, "server stopped");
        Ok(())
    }
}
