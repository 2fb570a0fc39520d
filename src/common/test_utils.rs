use crate::common::ServerTrait;
use crate::http::create_server;
use crate::{Result, WebEchoError};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Starts the factory-built server on an ephemeral loopback port
///
/// Returns the serving task, the bound address and the server's shutdown
/// sender. The listener is bound before the task is spawned, so the address
/// accepts connections as soon as this returns.
pub async fn spawn_test_server(
    version: &str,
) -> Result<(JoinHandle<Result<()>>, SocketAddr, broadcast::Sender<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = create_server(&addr.to_string(), version);
    let shutdown = server.shutdown_signal();

    let server_handle = tokio::spawn(async move { server.serve(listener).await });

    Ok((server_handle, addr, shutdown))
}

/// Writes `request` verbatim and reads until the server closes the connection
pub async fn send_raw_request(addr: SocketAddr, request: &str) -> Result<RawResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    RawResponse::parse(&raw)
}

/// Reads exactly one response off a connection that stays open
///
/// The body is taken to be `content-length` bytes, or empty without one.
pub async fn read_response(stream: &mut TcpStream) -> Result<RawResponse> {
    let mut raw = Vec::new();
    let mut buffer = [0u8; 1024];

    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            return Err(WebEchoError::Config(
                "Connection closed before a full response arrived".to_string(),
            ));
        }
        raw.extend_from_slice(&buffer[..n]);

        if let Ok(response) = RawResponse::parse(&raw) {
            let expected = response
                .header("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if response.body.len() >= expected {
                return Ok(response);
            }
        }
    }
}

/// A response read off the wire, split into its parts
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    /// Parses a single response, taking everything after the head as the body
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut res = httparse::Response::new(&mut headers);

        let head_len = match res.parse(raw) {
            Ok(httparse::Status::Complete(n)) => n,
            Ok(httparse::Status::Partial) => {
                return Err(WebEchoError::Config("Incomplete HTTP response".to_string()));
            }
            Err(e) => {
                return Err(WebEchoError::Config(format!("Failed to parse response: {e}")));
            }
        };

        let status = res
            .code
            .ok_or_else(|| WebEchoError::Config("Response has no status code".to_string()))?;
        let headers = res
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_ascii_lowercase(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect();

        Ok(Self {
            status,
            headers,
            body: String::from_utf8_lossy(&raw[head_len..]).into_owned(),
        })
    }

    /// Returns the first value of header `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}
