mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::*;
use kitchen_server::api::build_service;
use serde_json::{Value, json};
use shared::models::{Source, Station, Ticket};
use tower::ServiceExt;

async fn call(env: &TestEnv, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = build_service(env.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoints() {
    let env = setup().await;
    for uri in ["/health", "/api/health"] {
        let (status, body) = call(&env, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }
}

#[tokio::test]
async fn ticket_routes_follow_the_lifecycle() {
    let env = setup().await;
    let item = add_item(&env, "C1", Station::Fryer, &[("2", 480)]).await;

    let (status, body) = call(
        &env,
        Method::POST,
        "/api/tickets",
        Some(json!({ "menuItemId": item.id, "batchSize": "2", "source": "drive_thru" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Ticket = serde_json::from_value(body).unwrap();
    assert_eq!(created.source, Source::DriveThru);
    assert_eq!(created.duration_snapshot, 480);

    let (status, body) = call(&env, Method::POST, &format!("/api/tickets/{}/start", created.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "started");
    assert_eq!(body["startedAt"], 1_000);
    assert_eq!(body["durationSeconds"], 480);

    let (status, body) = call(&env, Method::POST, &format!("/api/tickets/{}/start", created.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    let (status, body) = call(&env, Method::POST, &format!("/api/tickets/{}/extend", created.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["durationSeconds"], 490);

    let (status, body) = call(
        &env,
        Method::PATCH,
        &format!("/api/tickets/{}/priority", created.id),
        Some(json!({ "priority": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority"], true);

    let (status, body) = call(&env, Method::GET, "/api/tickets?station=fryer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = call(&env, Method::POST, &format!("/api/tickets/{}/complete", created.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "completed");

    let (status, _) = call(&env, Method::DELETE, &format!("/api/tickets/{}", created.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn ticket_route_errors() {
    let env = setup().await;

    let (status, body) = call(&env, Method::GET, "/api/tickets", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
    assert_eq!(body["message"], "station query required");

    let (status, body) = call(&env, Method::POST, "/api/tickets/77/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn cancel_route_returns_no_content() {
    let env = setup().await;
    let item = add_item(&env, "V1", Station::Stirfry, &[("1", 180)]).await;
    let t = create_ticket(&env, &item, "1", Source::Foh).await;

    let (status, body) = call(&env, Method::DELETE, &format!("/api/tickets/{}", t.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn menu_routes() {
    let env = setup().await;

    let (status, body) = call(
        &env,
        Method::POST,
        "/api/menu",
        Some(json!({
            "code": "F4",
            "title": "Honey Walnut Shrimp",
            "station": "fryer",
            "batchSizes": ["1"],
            "cookTimes": { "1": 180 },
            "color": "orange"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["enabled"], true);
    assert_eq!(body["holdTime"], 600);

    let (status, body) = call(&env, Method::PATCH, &format!("/api/menu/{id}"), Some(json!({ "enabled": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);
    assert_eq!(body["color"], "orange");

    let (status, body) = call(&env, Method::GET, "/api/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["menuVersion"], 3);
    assert_eq!(body["items"][0]["code"], "F4");

    let (status, _) = call(&env, Method::DELETE, &format!("/api/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&env, Method::DELETE, &format!("/api/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_referenced_menu_item_is_a_conflict() {
    let env = setup().await;
    let item = add_item(&env, "C1", Station::Fryer, &[("2", 480)]).await;
    create_ticket(&env, &item, "2", Source::Foh).await;

    let (status, body) = call(&env, Method::DELETE, &format!("/api/menu/{}", item.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");

    let (status, body) = call(
        &env,
        Method::PATCH,
        &format!("/api/menu/{}", item.id),
        Some(json!({ "color": null, "nutrition": "520 kcal" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["color"], Value::Null);
    assert_eq!(body["nutrition"], "520 kcal");
}
