//! Shared harness for HTTP API tests.
//!
//! [`TestApp`] wires the real router to an in-memory store and a static
//! token verifier, then drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use tower::ServiceExt;

use folio::auth::StaticTokenVerifier;
use folio::catalog::Catalog;
use folio::http::{AppState, router};
use folio::store::DocStore;

pub const TOKEN: &str = "owner-token-0123456789abcdef";
pub const OWNER: &str = "owner";

pub struct TestApp {
    router: Router,
    pub catalog: Catalog,
}

impl TestApp {
    pub fn new() -> Self {
        let catalog = Catalog::new(DocStore::memory());
        let verifier = StaticTokenVerifier::new(vec![(OWNER.to_string(), TOKEN.to_string())]);
        let handle = PrometheusBuilder::new().build_recorder().handle();
        // Upstream fetches only ever target local origins
        let http_client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to build HTTP client");
        let state = AppState::new(catalog.clone(), Arc::new(verifier))
            .with_metrics(handle)
            .with_http_client(http_client);

        Self {
            router: router(Arc::new(state)),
            catalog,
        }
    }

    /// Unauthenticated GET returning the raw status, headers and body.
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        (status, headers, bytes)
    }

    /// Send a request and return the status and JSON body (`Null` if empty,
    /// a JSON string if the body isn't JSON).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(TOKEN), body).await
    }

    /// Register one image with a fixed id and url through the API.
    pub async fn register_image(&self, id: &str, url: &str) {
        let (status, _) = self
            .admin(
                Method::POST,
                "/api/images",
                Some(json!({
                    "id": id,
                    "url": url,
                    "file_id": format!("f-{id}"),
                    "file_name": format!("{id}.jpg"),
                    "file_size": 4096,
                    "file_type": "image/jpeg",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seeding {id}");
    }

    /// Register images with fixed ids through the API.
    pub async fn seed_images(&self, ids: &[&str]) {
        for id in ids {
            self.register_image(id, &format!("https://cdn.test/{id}.jpg"))
                .await;
        }
    }

    pub async fn assign(&self, id: &str, slug: &str) {
        let (status, body) = self
            .admin(
                Method::PUT,
                "/api/category",
                Some(json!({"op": "assign", "id": id, "slug": slug})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
}

/// Serve `routes` on an ephemeral local port and return its base URL.
pub async fn spawn_origin(routes: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind origin");
    let addr = listener.local_addr().expect("Failed to read origin address");
    tokio::spawn(async move {
        axum::serve(listener, routes)
            .await
            .expect("Origin server failed");
    });
    format!("http://{addr}")
}

/// Ids of a category's `images` array.
pub fn photo_ids(category: &Value) -> Vec<String> {
    category["images"]
        .as_array()
        .map(|images| {
            images
                .iter()
                .filter_map(|p| p["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
