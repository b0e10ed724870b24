//! Webhook HTTP server lifecycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::{router, AppState, JobProcessor, JobQueue, WebhookError};
use crate::config::WebhookConfig;

/// Delay between shutdown attempts while the server is still starting.
const STOP_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Webhook server owning its job queue.
pub struct WebhookServer {
    config: WebhookConfig,
    queue: Arc<JobQueue>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl WebhookServer {
    /// Creates a server; nothing is bound until [`start`](Self::start).
    pub fn new(config: WebhookConfig, processor: Arc<dyn JobProcessor>) -> Self {
        let queue = Arc::new(JobQueue::new(config.max_workers, processor));
        Self {
            config,
            queue,
            shutdown: Mutex::new(None),
        }
    }

    /// Address the server binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// The server's job queue.
    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    /// Router with CORS, tracing and request timeout layers.
    pub fn app(&self) -> Router {
        let timeout = Duration::from_secs(self.config.read_timeout + self.config.write_timeout);
        router(AppState {
            queue: Arc::clone(&self.queue),
            secret: Arc::from(self.config.secret.as_str()),
        })
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
    }

    /// Starts the queue, binds and serves until [`stop`](Self::stop).
    pub async fn start(&self) -> Result<(), WebhookError> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| WebhookError::Bind {
                addr: addr.clone(),
                source,
            })?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener until [`stop`](Self::stop).
    pub async fn serve(&self, listener: TcpListener) -> Result<(), WebhookError> {
        self.queue.start()?;

        let (tx, rx) = oneshot::channel();
        if let Ok(mut shutdown) = self.shutdown.lock() {
            *shutdown = Some(tx);
        }

        if let Ok(local) = listener.local_addr() {
            info!(addr = %local, "Webhook server listening");
        }

        let served = axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
            .map_err(WebhookError::Serve);

        self.queue.stop().await?;
        info!("Webhook server stopped");
        served
    }

    /// Requests a graceful shutdown.
    pub fn stop(&self) -> Result<(), WebhookError> {
        let sender = self
            .shutdown
            .lock()
            .map_err(|_| WebhookError::NotRunning)?
            .take()
            .ok_or(WebhookError::NotRunning)?;
        // The receiver is gone only if the server already exited.
        let _ = sender.send(());
        Ok(())
    }

    /// Requests a graceful shutdown, waiting for [`serve`](Self::serve) to
    /// begin if it has not yet.
    pub async fn stop_when_running(&self) {
        while let Err(e) = self.stop() {
            debug!(error = %e, "Server not accepting shutdown yet; retrying");
            tokio::time::sleep(STOP_RETRY_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::DetectionJobProcessor;

    fn server() -> Arc<WebhookServer> {
        let config = WebhookConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..WebhookConfig::default()
        };
        Arc::new(WebhookServer::new(
            config,
            Arc::new(DetectionJobProcessor::default()),
        ))
    }

    #[test]
    fn stop_before_start_is_error() {
        assert!(matches!(server().stop(), Err(WebhookError::NotRunning)));
    }

    #[tokio::test]
    async fn serves_health_and_stops() {
        let server = server();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let running = Arc::clone(&server);
        let handle = tokio::spawn(async move { running.serve(listener).await });

        let url = format!("http://{addr}/health");
        let mut body = None;
        for _ in 0..50 {
            if let Ok(response) = reqwest::get(&url).await {
                body = Some(response.text().await.unwrap());
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(body.unwrap().contains("\"ok\""));

        server.stop_when_running().await;
        handle.await.unwrap().unwrap();
        assert!(!server.queue().is_running());
    }

    #[tokio::test]
    async fn shutdown_requested_before_serving_is_not_lost() {
        let server = server();
        let stopper = Arc::clone(&server);
        let stop = tokio::spawn(async move { stopper.stop_when_running().await });
        tokio::time::sleep(STOP_RETRY_INTERVAL * 2).await;
        assert!(!stop.is_finished());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), server.serve(listener))
            .await
            .expect("server ignored the pending shutdown")
            .unwrap();
        stop.await.unwrap();
        assert!(!server.queue().is_running());
    }

    #[tokio::test]
    async fn bind_failure_is_wrapped() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let server = WebhookServer::new(
            WebhookConfig {
                host: "127.0.0.1".to_string(),
                port,
                ..WebhookConfig::default()
            },
            Arc::new(DetectionJobProcessor::default()),
        );
        let err = server.start().await.unwrap_err();
        assert!(matches!(err, WebhookError::Bind { .. }));
        assert!(err.to_string().contains(&port.to_string()));
    }
}
