//! Incoming HTTP request type.
//!
//! The body is a single-consumption value: [`Request::take_body`] hands it out
//! once and leaves an empty body behind. Code that needs to look at the bytes
//! and still pass them on collects the body, then puts the buffered bytes back
//! with [`Request::set_body`].

use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

use crate::error::{BoxError, Error};

// ── Body ──────────────────────────────────────────────────────────────────────

/// A request body: still on the wire, already buffered in memory, or known
/// to have failed while being read.
pub struct Body(Inner);

enum Inner {
    Empty,
    Buffered(Bytes),
    Streaming(UnsyncBoxBody<Bytes, BoxError>),
    Failed(BoxError),
}

impl Body {
    pub fn empty() -> Self {
        Self(Inner::Empty)
    }

    /// Wraps any `http_body::Body` yielding [`Bytes`], e.g. hyper's `Incoming`.
    pub fn streaming<B>(body: B) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(Inner::Streaming(body.map_err(Into::into).boxed_unsync()))
    }

    /// A body whose read already failed; [`collect`](Body::collect) returns
    /// the error again.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self(Inner::Failed(err.into()))
    }

    /// `true` when there is nothing left to read.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Inner::Empty => true,
            Inner::Buffered(bytes) => bytes.is_empty(),
            Inner::Streaming(body) => hyper::body::Body::is_end_stream(body),
            Inner::Failed(_) => false,
        }
    }

    /// Reads the whole body into memory, consuming it.
    pub async fn collect(self) -> Result<Bytes, Error> {
        match self.0 {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Buffered(bytes) => Ok(bytes),
            Inner::Streaming(body) => {
                let collected = body.collect().await.map_err(Error::Body)?;
                Ok(collected.to_bytes())
            }
            Inner::Failed(err) => Err(Error::Body(err)),
        }
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self { Self(Inner::Buffered(bytes)) }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self { Self(Inner::Buffered(bytes.into())) }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self { Self(Inner::Buffered(Bytes::from_static(s.as_bytes()))) }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// An incoming HTTP request.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Builds a request from `http` parts. `remote_addr` is the transport
    /// peer, when there is one.
    pub fn from_http<B>(req: http::Request<B>, remote_addr: Option<SocketAddr>) -> Self
    where
        B: Into<Body>,
    {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
            remote_addr,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Raw query string without the leading `?`.
    pub fn query_string(&self) -> Option<&str> { self.uri.query() }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Decoded query pairs in the order they appear.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query_string()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Takes the body out of the request, leaving an empty one in its place.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Attaches a new body, e.g. bytes buffered by an earlier reader.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }
}

impl From<hyper::body::Incoming> for Body {
    fn from(body: hyper::body::Incoming) -> Self {
        Self::streaming(body)
    }
}
