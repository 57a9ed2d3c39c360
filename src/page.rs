//! The HTML landing page.

use std::path::PathBuf;
use std::sync::Arc;

use http::StatusCode;
use minijinja::{Environment, context};
use tracing::error;

use crate::request::Request;
use crate::response::Response;

/// `GET /` — renders the page template with an empty context.
///
/// The template is read from disk on every request, so edits show up without
/// a restart. A missing or broken template is a `500`.
pub async fn index(template: Arc<PathBuf>, _req: Request) -> Response {
    let source = match tokio::fs::read_to_string(template.as_path()).await {
        Ok(source) => source,
        Err(e) => {
            error!(path = %template.display(), error = %e, "failed to read page template");
            return template_error();
        }
    };

    match render(&source) {
        Ok(html) => Response::html(html),
        Err(e) => {
            error!(path = %template.display(), error = %e, "failed to render page template");
            template_error()
        }
    }
}

fn render(source: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index", source)?;
    env.get_template("index")?.render(context! {})
}

fn template_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .text("template error")
}
