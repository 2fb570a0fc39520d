use crate::http::protocol::HttpProtocolError;
use thiserror::Error;

/// Error types for the webecho library
#[derive(Error, Debug)]
pub enum WebEchoError {
    /// Socket errors (bind, accept, read, write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP framing errors raised while decoding or encoding a connection
    #[error("HTTP protocol error: {0}")]
    Protocol(#[from] HttpProtocolError),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for the webecho library
pub type Result<T> = std::result::Result<T, WebEchoError>;

pub mod common;
pub mod http;

// Re-export main types for convenience
pub use crate::common::{Responder, ServerTrait};
pub use crate::http::{
    HttpCodec, HttpConfig, HttpServer, Router, RouterBuilder, VersionResponder, create_server,
    echo, version,
};
