//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) and is itself a handler, so
//! layers compose by plain function application:
//!
//! ```rust,no_run
//! use shelf::{Router, middleware};
//! # async fn items(_: shelf::Request) -> shelf::Response { shelf::Response::text("") }
//!
//! let app = middleware::logging(Router::new().get("/api/items", items));
//! ```

mod log;

pub use log::{Logger, RequestLog, client_ip, logging};
