//! API server lifecycle: bind, spawn the axum server in a background
//! task, return a handle with a shutdown channel.

use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Signal graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait for the server task to exit.
    pub async fn wait(self) -> Result<(), ServerError> {
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))
    }
}

/// Bind `bind` (e.g. `127.0.0.1:8000`, port 0 for ephemeral) and serve `app`.
pub async fn start_api_server(bind: &str, app: Router) -> Result<ApiServer, ServerError> {
    let bind_err = |source| ServerError::Bind {
        addr: bind.to_string(),
        source,
    };
    let listener = tokio::net::TcpListener::bind(bind).await.map_err(bind_err)?;
    let addr = listener.local_addr().map_err(bind_err)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn start_and_stop_server() {
        let app = Router::new().route("/ping", get(|| async { "pong" }));
        let mut server = start_api_server("127.0.0.1:0", app)
            .await
            .expect("server should start");
        assert!(server.addr.port() > 0);

        let url = format!("http://{}/ping", server.addr);
        let body = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert_eq!(body, "pong");

        server.shutdown();
        server.wait().await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let first = start_api_server("127.0.0.1:0", Router::new()).await.unwrap();
        let taken = first.addr.to_string();
        let result = start_api_server(&taken, Router::new()).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
