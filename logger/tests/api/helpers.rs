use axum::{body::Body, response::Response, Router};
use hyper::http::{header::CONTENT_TYPE, Request, StatusCode};
use logbook_logger::{api::make_router, Dal, LogRepository, Store};
use serde_json::Value;
use tower::ServiceExt;

pub(crate) struct TestApp {
    pub router: Router,
    pub store: Store,
}

/// Initialize a router with an in-memory sqlite database for each test.
pub(crate) async fn app() -> TestApp {
    let store = Store::in_memory().await.unwrap();
    let repository = LogRepository::new(store.clone());
    repository.migrate().await.unwrap();

    TestApp {
        router: make_router(repository),
        store,
    }
}

impl TestApp {
    pub async fn send_request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_log(&self, body: Value) -> Response {
        self.post_raw_log(body.to_string()).await
    }

    pub async fn post_raw_log(&self, body: impl Into<Body>) -> Response {
        let request = Request::builder()
            .uri("/api/logs")
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();

        self.send_request(request).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        self.send_request(request).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();

        self.send_request(request).await
    }

    /// Create a log and return its id
    pub async fn create(&self, service_name: &str, level: &str, message: &str) -> u64 {
        let response = self
            .post_log(serde_json::json!({
                "service_name": service_name,
                "level": level,
                "message": message,
            }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        json_body(response).await["id"].as_u64().unwrap()
    }
}

pub(crate) async fn json_body(response: Response) -> Value {
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();

    serde_json::from_slice(&body).unwrap()
}
