//! # annotate-runtime
//!
//! Lets a human stand in for a prediction model.
//!
//! [`AnnotationServer::ask`] posts a question to a single shared web page and
//! blocks the calling thread until the human submits an answer that
//! validates. The HTTP transport in [`http`] serves that page from a
//! background thread.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use annotate_core::{Field, FieldType, InputValues, Signature};
//! use annotate_runtime::{AnnotationServer, HttpServer, HumanAnswerer, Predictor, ServerConfig};
//!
//! let signature = Arc::new(
//!     Signature::new("Rate Topic")
//!         .input(Field::new("topic", FieldType::String))
//!         .output(Field::new("rating", FieldType::one_of(["A", "B", "C"])))
//!         .build()?,
//! );
//!
//! let server = Arc::new(AnnotationServer::default());
//! let handle = HttpServer::start(&ServerConfig::with_port(8000), Arc::clone(&server))?;
//! println!("Open {}", handle.url());
//!
//! let answerer = HumanAnswerer::new(signature, server);
//! let prediction = answerer.predict(InputValues::new().with("topic", "cats"))?;
//! println!("rating = {}", prediction.get("rating").unwrap());
//! ```

pub mod answerer;
pub mod config;
pub mod gate;
pub mod http;
pub mod server;

pub use answerer::{HumanAnswerer, Predictor};
pub use config::{ConfigError, ServerConfig};
pub use gate::{GateLatch, SynchronizationGate};
pub use http::{HttpServer, ServerHandle};
pub use server::{AnnotationServer, QuestionStatus};

use std::net::SocketAddr;
use thiserror::Error;

/// Errors from starting or stopping the transport.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server thread panicked")]
    ServerPanicked,
}
