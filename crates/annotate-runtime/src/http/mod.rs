//! HTTP transport for the annotation page.
//!
//! Endpoints:
//! - GET  /  - the current page
//! - POST /  - submit the form (`application/x-www-form-urlencoded`)
//!
//! Both respond with `text/html`. The router runs on a dedicated background
//! thread that owns its own tokio runtime, so callers of
//! [`AnnotationServer::ask`] can stay plain blocking threads.

mod html;

pub use html::{render_document, ERROR_CLASS};

use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use annotate_core::DraftAnswer;

use crate::config::ServerConfig;
use crate::server::AnnotationServer;
use crate::RuntimeError;

/// Build the router over a shared annotation server.
pub fn router(server: Arc<AnnotationServer>) -> Router {
    Router::new()
        .route("/", get(handle_get).post(handle_post))
        .with_state(server)
}

/// GET /
async fn handle_get(State(server): State<Arc<AnnotationServer>>) -> Html<String> {
    debug!("Rendering current page");
    Html(render_document(&server.render_current_page()))
}

/// POST /
async fn handle_post(
    State(server): State<Arc<AnnotationServer>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Html<String> {
    debug!(fields = fields.len(), "Form submitted");
    let draft: DraftAnswer = fields.into_iter().collect();
    Html(render_document(&server.handle_submission(draft)))
}

/// Starts the transport thread.
pub struct HttpServer;

impl HttpServer {
    /// Bind the configured address and serve on a background thread.
    ///
    /// Binding happens before returning, so an unavailable port is reported
    /// here rather than lost on the background thread.
    pub fn start(
        config: &ServerConfig,
        server: Arc<AnnotationServer>,
    ) -> Result<ServerHandle, RuntimeError> {
        let addr = config.socket_addr()?;
        let listener = std::net::TcpListener::bind(addr)
            .map_err(|source| RuntimeError::Bind { addr, source })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("annotate-http")
            .enable_all()
            .build()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(server);

        let thread = std::thread::Builder::new()
            .name("annotate-server".to_string())
            .spawn(move || -> std::io::Result<()> {
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener)?;
                    axum::serve(listener, app)
                        .with_graceful_shutdown(async {
                            let _ = shutdown_rx.await;
                        })
                        .await
                })
            })?;

        info!(addr = %local_addr, "Annotation server started");

        Ok(ServerHandle {
            local_addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

/// Running transport. Stops on [`stop`](Self::stop) or drop.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    /// The bound address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL a human can open, with unspecified hosts shown as localhost.
    pub fn url(&self) -> String {
        if self.local_addr.ip().is_unspecified() {
            format!("http://localhost:{}/", self.local_addr.port())
        } else {
            format!("http://{}/", self.local_addr)
        }
    }

    /// Shut down gracefully and join the server thread.
    pub fn stop(mut self) -> Result<(), RuntimeError> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> Result<(), RuntimeError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.thread.take() {
            Some(thread) => {
                let result = thread.join().map_err(|_| RuntimeError::ServerPanicked)?;
                info!(addr = %self.local_addr, "Annotation server stopped");
                result.map_err(RuntimeError::from)
            }
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown_and_join() {
            error!(error = %e, "Annotation server did not stop cleanly");
        }
    }
}
