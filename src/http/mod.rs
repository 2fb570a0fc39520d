//! HTTP echo server implementation
//!
//! This module provides the echo and version responders, the router that
//! maps them to paths, and the HTTP/1.1 transport that serves them.

pub mod config;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;


pub use config::HttpConfig;
pub use handlers::{
    ECHO_PATH, VERSION_CONTENT_TYPE, VERSION_PATH, VersionResponder, echo, format_echo_body,
    version,
};
pub use protocol::{HttpCodec, HttpProtocolError};
pub use router::{Router, RouterBuilder};
pub use server::{HttpServer, create_server};
