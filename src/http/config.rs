use std::time::Duration;

/// Transport settings for the HTTP server
///
/// These settings belong to the listener, not to the responders: they bound
/// how long a connection may sit idle, how large a request may be, and which
/// headers are filled in when a responder leaves them unset.
///
/// # Examples
///
/// ```rust
/// use webecho::http::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig {
///     read_timeout: Duration::from_secs(5),
///     server_name: Some("webecho/0.1".to_string()),
///     ..HttpConfig::default()
/// };
/// assert_eq!(config.max_request_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Maximum time to wait for the next request on a connection
    pub read_timeout: Duration,
    /// Maximum time to spend writing a response
    pub write_timeout: Duration,
    /// Largest accepted request, head and body together, in bytes
    pub max_request_size: usize,
    /// Value of the `Server` header added to responses (optional)
    pub server_name: Option<String>,
    /// Content type used when a responder sets none
    pub default_content_type: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            max_request_size: 1024 * 1024, // 1MB
            server_name: None,
            default_content_type: Some("text/plain; charset=utf-8".to_string()),
        }
    }
}
