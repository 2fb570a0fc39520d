use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};

/// Maps an inbound request to an outbound response
///
/// Responders are invoked concurrently from many connection tasks, so they
/// must not hold mutable state. Anything they need is captured when they are
/// built.
///
/// Plain functions and closures with the right signature are responders:
///
/// ```
/// use bytes::Bytes;
/// use http::{Request, Response};
/// use webecho::Responder;
///
/// fn hello(_req: &Request<Bytes>) -> Response<Bytes> {
///     Response::new(Bytes::from_static(b"hello"))
/// }
///
/// let req = Request::new(Bytes::new());
/// assert_eq!(hello.respond(&req).body(), "hello");
/// ```
pub trait Responder: Send + Sync {
    /// Produces the response for `request`
    fn respond(&self, request: &Request<Bytes>) -> Response<Bytes>;
}

impl<F> Responder for F
where
    F: Fn(&Request<Bytes>) -> Response<Bytes> + Send + Sync,
{
    fn respond(&self, request: &Request<Bytes>) -> Response<Bytes> {
        self(request)
    }
}

/// Common trait for servers
#[async_trait]
pub trait ServerTrait {
    /// Binds the configured address and serves until shut down
    async fn run(&self) -> Result<()>;

    /// Returns a shutdown signal sender that can be used to stop the accept loop
    fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()>;
}
