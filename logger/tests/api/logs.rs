use axum::body::Body;
use chrono::DateTime;
use hyper::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::helpers::{app, json_body};

#[tokio::test]
async fn create_log() {
    let app = app().await;

    let response = app
        .post_log(json!({
            "service_name": "auth",
            "level": "error",
            "message": "login failed",
            "metadata": {"user": "42", "attempts": 3},
        }))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let log = json_body(response).await;

    assert_eq!(log["id"], 1);
    assert_eq!(log["service_name"], "auth");
    assert_eq!(log["level"], "error");
    assert_eq!(log["message"], "login failed");
    assert_eq!(log["metadata"], json!({"user": "42", "attempts": 3}));
    assert!(log.get("metadata_unparseable").is_none());
    assert_eq!(log["created_at"], log["updated_at"]);
    assert!(DateTime::parse_from_rfc3339(log["created_at"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_log_without_metadata() {
    let app = app().await;

    let id = app.create("auth", "info", "no metadata").await;

    let log = json_body(app.get(&format!("/api/logs/{id}")).await).await;
    assert_eq!(log["metadata"], Value::Null);
}

#[tokio::test]
async fn invalid_logs_are_rejected() {
    let app = app().await;

    for body in [
        json!({"service_name": "auth", "level": "fatal", "message": "boom"}),
        json!({"service_name": "auth", "level": "INFO", "message": "boom"}),
        json!({"service_name": "", "level": "info", "message": "boom"}),
        json!({"service_name": "auth", "level": "info", "message": ""}),
        json!({"service_name": "auth", "level": "info"}),
        json!({"service_name": "auth", "level": "info", "message": "boom", "metadata": [1, 2]}),
    ] {
        let response = app.post_log(body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

        let error = json_body(response).await;
        assert_eq!(error["status_code"], 400);
        assert!(error["message"].is_string());
    }

    let response = app.post_raw_log("{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send_request(
            Request::builder()
                .uri("/api/logs")
                .method("POST")
                .body(Body::from(r#"{"service_name":"a","level":"info","message":"b"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing reached the database
    let logs = json_body(app.get("/api/logs").await).await;
    assert_eq!(logs["total"], 0);
}

#[tokio::test]
async fn unknown_level_message_names_the_level() {
    let app = app().await;

    let response = app
        .post_log(json!({"service_name": "auth", "level": "fatal", "message": "boom"}))
        .await;

    let error = json_body(response).await;
    assert!(error["message"].as_str().unwrap().contains("fatal"));
}

#[tokio::test]
async fn get_log() {
    let app = app().await;

    let id = app.create("billing", "warn", "card declined").await;

    let response = app.get(&format!("/api/logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let log = json_body(response).await;
    assert_eq!(log["id"], id);
    assert_eq!(log["service_name"], "billing");
    assert_eq!(log["level"], "warn");
    assert_eq!(log["message"], "card declined");

    let response = app.get("/api/logs/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({"message": "log not found", "status_code": 404})
    );

    let response = app.get("/api/logs/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["status_code"], 400);
}

#[tokio::test]
async fn get_logs() {
    let app = app().await;

    for (service_name, level) in [
        ("auth", "info"),
        ("auth", "error"),
        ("billing", "error"),
        ("auth", "error"),
    ] {
        app.create(service_name, level, "message").await;
    }

    let response = app.get("/api/logs").await;
    assert_eq!(response.status(), StatusCode::OK);

    let logs = json_body(response).await;
    assert_eq!(logs["total"], 4);
    assert_eq!(logs["limit"], 50);
    assert_eq!(logs["offset"], 0);

    let ids: Vec<_> = logs["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, [4, 3, 2, 1]);

    let logs = json_body(app.get("/api/logs?service_name=auth&level=error").await).await;
    assert_eq!(logs["total"], 2);
    for log in logs["data"].as_array().unwrap() {
        assert_eq!(log["service_name"], "auth");
        assert_eq!(log["level"], "error");
    }

    let logs = json_body(app.get("/api/logs?service_name=auth&limit=1&offset=1").await).await;
    assert_eq!(logs["total"], 3);
    assert_eq!(logs["limit"], 1);
    assert_eq!(logs["offset"], 1);
    assert_eq!(logs["data"].as_array().unwrap().len(), 1);
    assert_eq!(logs["data"][0]["id"], 2);

    let logs = json_body(app.get("/api/logs?limit=0").await).await;
    assert_eq!(logs["limit"], 50);

    let logs = json_body(app.get("/api/logs?service_name=nobody").await).await;
    assert_eq!(logs["total"], 0);
    assert_eq!(logs["data"], json!([]));
}

#[tokio::test]
async fn bad_paging_is_rejected() {
    let app = app().await;

    for uri in ["/api/logs?limit=ten", "/api/logs?offset=-1", "/api/logs?limit=1.5"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json_body(response).await["status_code"], 400);
    }
}

#[tokio::test]
async fn delete_log() {
    let app = app().await;

    let id = app.create("auth", "error", "login failed").await;

    let response = app.delete(&format!("/api/logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "log deleted successfully"})
    );

    let response = app.get(&format!("/api/logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let logs = json_body(app.get("/api/logs?service_name=auth").await).await;
    assert_eq!(logs["total"], 0);

    // Deleting again is not found
    let response = app.delete(&format!("/api/logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete("/api/logs/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn corrupt_metadata_is_flagged() {
    let app = app().await;

    let id = app.create("auth", "info", "still here").await;

    sqlx::query("UPDATE logs SET metadata = 'not json' WHERE id = ?1")
        .bind(id as i64)
        .execute(app.store.pool())
        .await
        .unwrap();

    let response = app.get(&format!("/api/logs/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let log = json_body(response).await;
    assert_eq!(log["message"], "still here");
    assert_eq!(log["metadata"], Value::Null);
    assert_eq!(log["metadata_unparseable"], true);
}

#[tokio::test]
async fn storage_failures_are_internal_errors() {
    let app = app().await;

    app.store.close().await;

    let response = app.get("/api/logs").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = json_body(response).await;
    assert_eq!(error["status_code"], 500);
    assert_eq!(
        error["message"],
        "our server was unable to handle your request"
    );

    let response = app.delete("/api/logs/1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cors_preflight() {
    let app = app().await;

    let response = app
        .send_request(
            Request::builder()
                .uri("/api/logs")
                .method(Method::OPTIONS)
                .header("origin", "http://dashboard.example")
                .header("access-control-request-method", "DELETE")
                .header("access-control-request-headers", CONTENT_TYPE.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    assert!(response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("DELETE"));
}
