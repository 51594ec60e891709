//! HTTP server for the web front end

use crate::downloader::Downloader;
use crate::utils::error::{Result, TubegrabError};
use crate::web::handler::{handle_request, WebState};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub struct WebServer {
    addr: SocketAddr,
    state: Arc<WebState>,
    semaphore: Arc<Semaphore>,
}

impl WebServer {
    pub fn new(
        addr: SocketAddr,
        downloader: Arc<Downloader>,
        scratch_dir: PathBuf,
        default_quality: String,
        max_connections: usize,
    ) -> Self {
        let state = Arc::new(WebState {
            downloader,
            scratch_dir,
            default_quality,
        });
        Self {
            addr,
            state,
            semaphore: Arc::new(Semaphore::new(max_connections.max(1))),
        }
    }

    /// Bind the configured address and serve until the task is dropped
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr()?;
        info!("Web front end running at http://{}", local);
        info!("Max concurrent connections: {}", self.semaphore.available_permits());

        loop {
            // Wait for a free slot before accepting so excess clients queue in the backlog
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|e| TubegrabError::Config(format!("connection limiter closed: {}", e)))?;

            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            debug!("Connection from {}", peer);

            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                let _permit = permit;
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle_request(req, Arc::clone(&state)));
                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection from {} ended with error: {}", peer, e);
                }
            });
        }
    }
}
