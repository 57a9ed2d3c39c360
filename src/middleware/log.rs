//! Per-request access logging.
//!
//! [`logging`] wraps a handler and emits one `tracing` event per request on the
//! `shelf::access` target. The request body is read in full before the wrapped
//! handler runs, then reattached as buffered bytes, so the handler sees exactly
//! what the client sent. If the read fails, the handler gets a body that fails
//! with the same error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Local};
use http::{HeaderMap, Method, StatusCode};
use tracing::{info, warn};

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::request::{Body, Request};
use crate::response::Response;

/// Wraps `next` so every request through it is logged.
pub fn logging(next: impl Handler) -> Logger {
    Logger { next: next.into_boxed_handler() }
}

/// A handler that logs around another handler. Build with [`logging`].
pub struct Logger {
    next: BoxedHandler,
}

impl private::Sealed for Logger {}

impl Handler for Logger {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl ErasedHandler for Logger {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            let (response, entry) = observe(next, req).await;
            entry.emit();
            response
        })
    }
}

/// One access-log record.
#[derive(Clone, Debug)]
pub struct RequestLog {
    pub timestamp: DateTime<Local>,
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub duration: Duration,
    pub ip: String,
    pub user_agent: String,
    /// Query parameters as a pretty-printed JSON object of name → values.
    pub query: String,
    /// Request headers as a pretty-printed JSON object of name → values.
    pub headers: String,
    /// Request body, lossily decoded as UTF-8.
    pub body: String,
}

impl RequestLog {
    pub fn emit(&self) {
        info!(
            target: "shelf::access",
            time = %self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            method = %self.method,
            url = %self.url,
            status = self.status.as_u16(),
            duration = ?self.duration,
            ip = %self.ip,
            user_agent = %self.user_agent,
            query = %self.query,
            headers = %self.headers,
            body = %self.body,
            "request"
        );
    }
}

/// Runs `next` on `req` and records what happened.
async fn observe(next: BoxedHandler, mut req: Request) -> (Response, RequestLog) {
    let start = Instant::now();
    let timestamp = Local::now();

    let ip = client_ip(&req);
    let headers = to_pretty_json(&header_values(req.headers()));
    let query = to_pretty_json(&query_values(req.query_pairs()));
    let method = req.method().clone();
    let url = req.uri().to_string();
    let user_agent = req.user_agent().unwrap_or_default().to_owned();

    let body = if req.has_body() {
        match req.take_body().collect().await {
            Ok(bytes) => {
                req.set_body(bytes.clone());
                bytes
            }
            Err(e) => {
                warn!(error = %e, url = %url, "could not buffer request body");
                req.set_body(match e {
                    Error::Body(source) => Body::failed(source),
                    other => Body::failed(other.to_string()),
                });
                Bytes::new()
            }
        }
    } else {
        Bytes::new()
    };

    let response = next.call(req).await;

    let entry = RequestLog {
        timestamp,
        method,
        url,
        status: response.status_code(),
        duration: start.elapsed(),
        ip,
        user_agent,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    (response, entry)
}

/// Client address: `X-Real-IP`, then `X-Forwarded-For`, then the peer address.
///
/// Header values are taken verbatim; a multi-hop `X-Forwarded-For` list is not
/// split.
pub fn client_ip(req: &Request) -> String {
    let header = |name| req.header(name).filter(|v| !v.is_empty());
    header("x-real-ip")
        .or_else(|| header("x-forwarded-for"))
        .map(str::to_owned)
        .or_else(|| req.remote_addr().map(|a| a.to_string()))
        .unwrap_or_default()
}

fn header_values(headers: &HeaderMap) -> BTreeMap<&str, Vec<String>> {
    let mut out: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        out.entry(name.as_str())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

fn query_values(pairs: Vec<(String, String)>) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in pairs {
        out.entry(k).or_default().push(v);
    }
    out
}

fn to_pretty_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
