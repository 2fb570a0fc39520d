use crate::common::Responder;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Immutable mapping from request paths to responders
///
/// A pattern matches a path exactly. A pattern ending in `/` also matches
/// every path below it, with longer patterns winning, so `/` catches
/// whatever nothing else claims.
///
/// # Examples
///
/// ```
/// use webecho::http::{Router, echo, version};
///
/// let router = Router::builder()
///     .route("/", echo)
///     .route("/version", version("1.2.3"))
///     .build();
///
/// assert!(router.resolve("/version").is_some());
/// assert!(router.resolve("/anything/else").is_some());
/// ```
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<String, Arc<dyn Responder>>,
}

impl Router {
    /// Starts an empty router builder
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Finds the responder for `path`
    pub fn resolve(&self, path: &str) -> Option<&Arc<dyn Responder>> {
        if let Some(responder) = self.routes.get(path) {
            return Some(responder);
        }

        self.routes
            .iter()
            .filter(|(pattern, _)| pattern.ends_with('/') && path.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, responder)| responder)
    }

    /// Routes `request` by path and returns the responder's answer
    ///
    /// The method is not considered. Unmatched paths get `404 Not Found`.
    pub fn dispatch(&self, request: &Request<Bytes>) -> Response<Bytes> {
        match self.resolve(request.uri().path()) {
            Some(responder) => responder.respond(request),
            None => not_found(),
        }
    }

    /// Number of registered patterns
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no pattern is registered
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered patterns in sorted order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("paths", &self.paths()).finish()
    }
}

/// Collects routes for a [`Router`]
#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<String, Arc<dyn Responder>>,
}

impl RouterBuilder {
    /// Registers `responder` at `path`, replacing any earlier registration
    pub fn route<R>(mut self, path: impl Into<String>, responder: R) -> Self
    where
        R: Responder + 'static,
    {
        self.routes.insert(path.into(), Arc::new(responder));
        self
    }

    /// Freezes the routes
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
        }
    }
}

fn not_found() -> Response<Bytes> {
    let mut response = Response::new(Bytes::from_static(b"404 page not found\n"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
