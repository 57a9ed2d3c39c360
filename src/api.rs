//! `GET /api/items` — the catalog query endpoint.

use std::sync::Arc;

use crate::catalog::{Catalog, Criteria};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};

/// Filters `catalog` by the `name`, `minPrice`, `maxPrice` and `year` query
/// parameters and answers with a JSON array of the matches.
pub async fn items(catalog: Arc<Catalog>, req: Request) -> Response {
    let pairs = req.query_pairs();
    let criteria = Criteria::from_query(|key| {
        pairs.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    });
    Json(catalog.filter(&criteria)).into_response()
}
