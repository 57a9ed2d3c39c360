//! # shelf
//!
//! A small catalog service. One JSON file of items is loaded at startup; an
//! HTTP API filters it by name, price range and year. Every request is logged.
//!
//! ## Routes
//!
//! | Route | Answer |
//! |---|---|
//! | `GET /` | the HTML page from the template file |
//! | `GET /api/items?name=&minPrice=&maxPrice=&year=` | JSON array of matching items |
//!
//! ## Startup
//!
//! The catalog is read before the listener binds. If it is missing or
//! malformed, [`run`] returns the error and no connection is ever accepted.
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), shelf::Error> {
//!     shelf::run(shelf::Config::load()?).await
//! }
//! ```
//!
//! ## Pieces
//!
//! The HTTP layer is a thin framework over hyper: a [`Router`] of typed
//! [`Handler`]s, wrapped by [`middleware::logging`], served by [`Server`].
//! [`app`] assembles the two routes over a shared, immutable [`Catalog`].

mod api;
mod catalog;
mod config;
mod error;
mod handler;
mod page;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

use std::sync::Arc;

use tracing::info;

pub use catalog::{Catalog, Criteria, Item};
pub use config::Config;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use request::{Body, Request};
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

/// The full application: both routes behind the request logger.
pub fn app(catalog: Arc<Catalog>, config: &Config) -> middleware::Logger {
    let template = Arc::new(config.template_path.clone());

    let router = Router::new()
        .get("/", move |req| page::index(Arc::clone(&template), req))
        .get("/api/items", move |req| api::items(Arc::clone(&catalog), req));

    middleware::logging(router)
}

/// Loads the catalog, then serves until a shutdown signal.
///
/// Catalog errors are returned before anything is bound.
pub async fn run(config: Config) -> Result<(), Error> {
    let catalog = Catalog::load(&config.catalog_path).await?;
    info!(
        path = %config.catalog_path.display(),
        items = catalog.len(),
        "catalog loaded"
    );

    Server::bind(config.addr)
        .serve(app(Arc::new(catalog), &config))
        .await
}
