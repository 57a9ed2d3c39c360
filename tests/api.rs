//! End-to-end tests: a real server on an ephemeral port, driven over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use shelf::{Catalog, Config, Item, Server};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<Result<(), shelf::Error>>,
}

impl TestServer {
    async fn start(catalog: Catalog, template_path: PathBuf) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = Config { addr, template_path, ..Config::default() };
        let app = shelf::app(Arc::new(catalog), &config);

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            Server::from_listener(listener)
                .serve_with_shutdown(app, async move {
                    let _ = stopped.await;
                })
                .await
        });
        Self { addr, stop: Some(stop), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not drain in time")
            .unwrap()
            .unwrap();
    }
}

fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        Item { name: "Widget A".into(), size: 1, price: 15, year: 2020, sku: 1 },
        Item { name: "Gadget B".into(), size: 2, price: 25, year: 2021, sku: 2 },
    ])
}

fn client() -> reqwest::Client {
    // Keep-alive connections would hold the drain open; close after each call.
    reqwest::Client::builder().pool_max_idle_per_host(0).build().unwrap()
}

#[tokio::test]
async fn name_query_returns_matching_items() {
    let server = TestServer::start(sample_catalog(), PathBuf::from("templates/index.html")).await;

    let res = client().get(server.url("/api/items?name=widget")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(
        res.text().await.unwrap(),
        r#"[{"name":"Widget A","size":1,"price":15,"year":2020,"sku":1}]"#
    );

    server.shutdown().await;
}

#[tokio::test]
async fn filters_combine() {
    let server = TestServer::start(sample_catalog(), PathBuf::from("templates/index.html")).await;
    let http = client();

    let all: Value = http.get(server.url("/api/items")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let priced: Value = http
        .get(server.url("/api/items?minPrice=15&maxPrice=25&year=2021"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(priced, json!([{ "name": "Gadget B", "size": 2, "price": 25, "year": 2021, "sku": 2 }]));

    let none: Value = http.get(server.url("/api/items?name=zzz")).send().await.unwrap().json().await.unwrap();
    assert_eq!(none, json!([]));

    server.shutdown().await;
}

#[tokio::test]
async fn index_page_renders_and_missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("index.html");
    std::fs::write(&template, "<h1>Catalog</h1>").unwrap();

    let server = TestServer::start(sample_catalog(), template.clone()).await;
    let http = client();

    let res = http.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(res.text().await.unwrap(), "<h1>Catalog</h1>");

    std::fs::remove_file(&template).unwrap();
    let res = http.get(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_routes() {
    let server = TestServer::start(sample_catalog(), PathBuf::from("templates/index.html")).await;
    let http = client();

    let res = http.get(server.url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = http.post(server.url("/api/items")).body("{}").send().await.unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"], "GET, HEAD");

    server.shutdown().await;
}

#[tokio::test]
async fn head_requests_get_headers_only() {
    let server = TestServer::start(sample_catalog(), PathBuf::from("templates/index.html")).await;
    let http = client();

    let res = http.head(server.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/html"));
    assert!(res.bytes().await.unwrap().is_empty());

    let res = http.head(server.url("/api/items")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");

    server.shutdown().await;
}

/// An address nothing is listening on once this returns.
fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

#[tokio::test]
async fn missing_catalog_fails_before_binding() {
    let dir = tempfile::tempdir().unwrap();
    let addr = unused_addr();
    let config = Config {
        addr,
        catalog_path: dir.path().join("data.json"),
        ..Config::default()
    };

    let result = tokio::time::timeout(Duration::from_secs(5), shelf::run(config))
        .await
        .expect("run should fail fast instead of serving");
    assert!(matches!(result, Err(shelf::Error::CatalogRead { .. })));
    assert!(tokio::net::TcpStream::connect(addr).await.is_err(), "{addr} is accepting connections");
}

#[tokio::test]
async fn malformed_catalog_fails_before_binding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "[{\"name\": 1}").unwrap();
    let addr = unused_addr();
    let config = Config { addr, catalog_path: path, ..Config::default() };

    let result = tokio::time::timeout(Duration::from_secs(5), shelf::run(config))
        .await
        .expect("run should fail fast instead of serving");
    assert!(matches!(result, Err(shelf::Error::CatalogParse { .. })));
    assert!(tokio::net::TcpStream::connect(addr).await.is_err(), "{addr} is accepting connections");
}

#[tokio::test]
async fn bundled_catalog_loads() {
    let catalog = Catalog::load("data.json").await.unwrap();
    assert!(!catalog.is_empty());
}
