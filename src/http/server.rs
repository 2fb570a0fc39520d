use super::handlers::{ECHO_PATH, VERSION_PATH, echo, version};
use super::protocol::{HttpCodec, HttpProtocolError};
use super::{HttpConfig, Router};
use crate::common::ServerTrait;
use crate::{Result, WebEchoError};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use http::{HeaderValue, Method, Request, Response, StatusCode, Version};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::{signal, time::timeout};
use tokio_util::codec::Framed;
use tracing::{Instrument, error, info, warn};

/// Builds the echo server for `addr`
///
/// The echo responder is mounted at `/` and a version responder reporting
/// `version` at `/version`. Nothing is bound until [`ServerTrait::run`] is
/// called.
///
/// ```
/// let server = webecho::create_server("localhost:3000", "1.0.0");
/// assert_eq!(server.addr(), "localhost:3000");
/// assert!(!server.router().is_empty());
/// ```
pub fn create_server(addr: &str, version_string: &str) -> HttpServer {
    let router = Router::builder()
        .route(ECHO_PATH, echo)
        .route(VERSION_PATH, version(version_string))
        .build();

    HttpServer::new(addr, router)
}

/// HTTP/1.1 server that hands every request to a [`Router`]
///
/// # Examples
///
/// ```no_run
/// use webecho::{ServerTrait, create_server};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = create_server("127.0.0.1:8080", "1.0.0");
///     server.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct HttpServer {
    addr: String,
    router: Arc<Router>,
    config: Arc<HttpConfig>,
    shutdown_signal: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl HttpServer {
    /// Creates a server for `addr` with the default transport settings
    pub fn new(addr: impl Into<String>, router: Router) -> Self {
        let (shutdown_signal, _) = tokio::sync::broadcast::channel(1);
        Self {
            addr: addr.into(),
            router: Arc::new(router),
            config: Arc::new(HttpConfig::default()),
            shutdown_signal: Arc::new(shutdown_signal),
        }
    }

    /// Replaces the transport settings
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// The listen address, exactly as given
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Binds a listener on the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind(self.addr.as_str())
            .await
            .map_err(|e| WebEchoError::Config(format!("Failed to bind {}: {e}", self.addr)))
    }

    /// Accepts connections on `listener` until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, routes = ?self.router.paths(), "HTTP server listening");

        let mut shutdown_rx = self.shutdown_signal.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            info!(%addr, "Accepted connection");

                            let router = self.router.clone();
                            let config = self.config.clone();
                            let span = tracing::info_span!("connection", %addr);

                            tokio::spawn(async move {
                                let result = handle_connection(stream, addr, router, config).instrument(span).await;
                                if let Err(e) = result {
                                    error!(%addr, error = %e, "Error handling connection");
                                }
                                info!(%addr, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Received shutdown signal, stopping server");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal, stopping server");
                    break;
                }
            }
        }

        info!("HTTP server stopped");
        Ok(())
    }
}

#[async_trait]
impl ServerTrait for HttpServer {
    async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()> {
        self.shutdown_signal.as_ref().clone()
    }
}

/// Serves requests on one connection until it closes, errors or idles out
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    router: Arc<Router>,
    config: Arc<HttpConfig>,
) -> Result<()> {
    let mut framed = Framed::new(stream, HttpCodec::new(config.max_request_size));

    loop {
        let request = match timeout(config.read_timeout, framed.next()).await {
            Ok(Some(Ok(request))) => request,
            Ok(Some(Err(HttpProtocolError::Io(e)))) => return Err(e.into()),
            Ok(Some(Err(HttpProtocolError::IncompleteRequest))) => {
                info!(%addr, "Client closed connection mid-request");
                break;
            }
            Ok(Some(Err(e))) => {
                warn!(%addr, error = %e, "Rejecting malformed request");
                let response = finish_response(bad_request(&e), &config, false, Version::HTTP_11);
                // The peer may already be gone; the decode error is what gets reported.
                let _ = timeout(config.write_timeout, framed.send(response)).await;
                return Err(e.into());
            }
            Ok(None) => {
                info!(%addr, "Client closed connection");
                break;
            }
            Err(_) => {
                warn!(%addr, "Read timeout");
                break;
            }
        };

        let keep_alive = wants_keep_alive(&request);
        let response = router.dispatch(&request);
        info!(
            %addr,
            method = %request.method(),
            uri = %request.uri(),
            status = response.status().as_u16(),
            "Handled request"
        );

        let mut response = finish_response(response, &config, keep_alive, request.version());
        if request.method() == Method::HEAD {
            response = without_body(response);
        }
        match timeout(config.write_timeout, framed.send(response)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(%addr, "Write timeout");
                return Err(WebEchoError::Timeout(format!("Writing response to {addr}")));
            }
        }

        if !keep_alive {
            break;
        }
    }

    Ok(())
}

/// HTTP/1.1 persists unless told to close; HTTP/1.0 closes unless told to keep alive
fn wants_keep_alive(request: &Request<Bytes>) -> bool {
    let connection = request
        .headers()
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .collect::<Vec<_>>();

    if connection.iter().any(|token| token == "close") {
        return false;
    }

    match request.version() {
        Version::HTTP_10 => connection.iter().any(|token| token == "keep-alive"),
        _ => true,
    }
}

/// Fills in the headers the transport owns
fn finish_response(
    mut response: Response<Bytes>,
    config: &HttpConfig,
    keep_alive: bool,
    version: Version,
) -> Response<Bytes> {
    let headers = response.headers_mut();

    if !headers.contains_key(CONTENT_TYPE) {
        if let Some(value) = config
            .default_content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            headers.insert(CONTENT_TYPE, value);
        }
    }

    if let Some(value) = config
        .server_name
        .as_deref()
        .and_then(|name| HeaderValue::from_str(name).ok())
    {
        headers.insert(SERVER, value);
    }

    if !keep_alive {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
    } else if version == Version::HTTP_10 {
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    }

    response
}

/// Drops the body of a HEAD response but keeps the length it would have had
fn without_body(response: Response<Bytes>) -> Response<Bytes> {
    let (mut parts, body) = response.into_parts();
    if !parts.headers.contains_key(CONTENT_LENGTH) {
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    Response::from_parts(parts, Bytes::new())
}

fn bad_request(err: &HttpProtocolError) -> Response<Bytes> {
    let status = match err {
        HttpProtocolError::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    let mut response = Response::new(Bytes::from(format!(
        "{} {}\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Bad Request")
    )));
    *response.status_mut() = status;
    response
}
