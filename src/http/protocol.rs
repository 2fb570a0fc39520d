use bytes::{BufMut, Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{Request, Response, Version};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum number of request headers the codec accepts
pub const MAX_HEADERS: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum HttpProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP parsing error: {0}")]
    HttpParse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },
    #[error("Incomplete request")]
    IncompleteRequest,
}

/// HTTP/1.x framing for the server side of a connection
///
/// Decodes requests (head plus a `Content-Length` body) into
/// `http::Request<Bytes>` and encodes `http::Response<Bytes>` onto the wire.
/// Meant to be driven by `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct HttpCodec {
    max_request_size: usize,
}

impl HttpCodec {
    pub fn new(max_request_size: usize) -> Self {
        Self { max_request_size }
    }
}

impl Decoder for HttpCodec {
    type Item = Request<Bytes>;
    type Error = HttpProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        let head_len = match req.parse(src) {
            Ok(httparse::Status::Complete(parsed_len)) => parsed_len,
            Ok(httparse::Status::Partial) => {
                if src.len() > self.max_request_size {
                    return Err(HttpProtocolError::RequestTooLarge {
                        limit: self.max_request_size,
                    });
                }
                return Ok(None);
            }
            Err(e) => {
                return Err(HttpProtocolError::HttpParse(format!(
                    "Failed to parse request head: {e}"
                )));
            }
        };

        let method = req
            .method
            .ok_or_else(|| HttpProtocolError::HttpParse("Missing method".to_string()))?;
        let path = req
            .path
            .ok_or_else(|| HttpProtocolError::HttpParse("Missing request target".to_string()))?;
        let version = match req.version {
            Some(0) => Version::HTTP_10,
            _ => Version::HTTP_11,
        };

        let mut builder = Request::builder().method(method).uri(path).version(version);
        let mut content_length = 0usize;

        for header in req.headers.iter() {
            if header.name.eq_ignore_ascii_case(TRANSFER_ENCODING.as_str()) {
                return Err(HttpProtocolError::InvalidRequest(
                    "Transfer-Encoding bodies are not supported".to_string(),
                ));
            }
            if header.name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str()) {
                content_length = std::str::from_utf8(header.value)
                    .ok()
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .ok_or_else(|| {
                        HttpProtocolError::InvalidRequest("Invalid Content-Length".to_string())
                    })?;
            }
            builder = builder.header(header.name, header.value);
        }

        let total_len = head_len.saturating_add(content_length);
        if total_len > self.max_request_size {
            return Err(HttpProtocolError::RequestTooLarge {
                limit: self.max_request_size,
            });
        }

        if src.len() < total_len {
            // Wait for the rest of the body
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let _head = src.split_to(head_len);
        let body = src.split_to(content_length).freeze();

        builder
            .body(body)
            .map(Some)
            .map_err(|e| HttpProtocolError::InvalidRequest(e.to_string()))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(request) => Ok(Some(request)),
            None if buf.is_empty() => Ok(None),
            // Peer hung up part way through a request
            None => Err(HttpProtocolError::IncompleteRequest),
        }
    }
}

impl Encoder<Response<Bytes>> for HttpCodec {
    type Error = HttpProtocolError;

    fn encode(&mut self, response: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (parts, body) = response.into_parts();
        let status = parts.status;

        let status_line = format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
        dst.reserve(status_line.len() + body.len() + 256);
        dst.put_slice(status_line.as_bytes());

        for (name, value) in parts.headers.iter() {
            dst.put_slice(name.as_str().as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }

        if !parts.headers.contains_key(CONTENT_LENGTH) {
            dst.put_slice(format!("content-length: {}\r\n", body.len()).as_bytes());
        }

        dst.put_slice(b"\r\n");
        dst.put_slice(&body);
        Ok(())
    }
}
