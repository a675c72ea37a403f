use axum::Router;
use axum::http::{Method, StatusCode, header};
use chrono::{DateTime, Utc};
use insta::assert_json_snapshot;
use serde_json::json;
use std::time::Duration;
use todo_server::config::Environment;

mod common;

use common::{JsonResponseSnapshot, empty_request, json_request, send};

/// Setup function for endpoint tests; the returned context keeps the container alive.
async fn setup_app(environment: Environment) -> (common::TestContext, Router) {
    let state = common::setup().await.expect("Failed to setup test context");
    let config = common::test_config(&state.db_url, environment);
    let db = sea_orm::Database::connect(&state.db_url)
        .await
        .expect("Failed to connect to database");
    let app = todo_server::web::create_app(&config, db).expect("Failed to create app");
    (state, app)
}

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp should be a string")
        .parse()
        .expect("timestamp should be RFC 3339")
}

#[tokio::test]
async fn can_walk_through_todo_lifecycle() {
    let (_state, app) = setup_app(Environment::Production).await;

    // Create
    let (status, headers, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/todo",
            json!({ "title": "Buy milk", "status": "todo", "priority": "low" }),
        ),
    )
    .await;
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/api/todo/1");
    assert_eq!(body["createdAt"], body["updatedAt"]);
    insta::with_settings!({ sort_maps => true }, {
        assert_json_snapshot!(JsonResponseSnapshot::new(status, body.clone()), {
            ".body.dueDate" => "[timestamp]",
            ".body.createdAt" => "[timestamp]",
            ".body.updatedAt" => "[timestamp]",
        }, @r#"
        {
          "body": {
            "categoryId": "",
            "createdAt": "[timestamp]",
            "description": "",
            "dueDate": "[timestamp]",
            "id": 1,
            "priority": "low",
            "status": "todo",
            "title": "Buy milk",
            "updatedAt": "[timestamp]"
          },
          "status": 201
        }
        "#);
    });
    let created_at = timestamp(&body["createdAt"]);

    tokio::time::sleep(Duration::from_millis(10)).await;

    // Update
    let (status, _, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/todo/1",
            json!({ "id": 1, "title": "Buy milk and eggs", "status": "todo", "priority": "low" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["title"], "Buy milk and eggs");
    assert_eq!(timestamp(&body["createdAt"]), created_at);
    assert!(timestamp(&body["updatedAt"]) > created_at);

    // Delete
    let (status, _, body) = send(&app, empty_request(Method::DELETE, "/api/todo/1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);

    // Fetch after delete
    let (status, _, body) = send(&app, empty_request(Method::GET, "/api/todo/1")).await;
    insta::with_settings!({ sort_maps => true }, {
        assert_json_snapshot!(JsonResponseSnapshot::new(status, body), @r#"
        {
          "body": {
            "error": "NOT_FOUND",
            "message": "Todo item 1 not found"
          },
          "status": 404
        }
        "#);
    });
}

#[tokio::test]
async fn can_fetch_created_todo_item_by_id() {
    let (_state, app) = setup_app(Environment::Production).await;
    let (_, _, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/todo",
            json!({
                "title": "Test",
                "description": "Test Description",
                "priority": "P1",
                "categoryId": "Work",
                "dueDate": "2030-01-01T09:30:00Z"
            }),
        ),
    )
    .await;

    let uri = format!("/api/todo/{}", created["id"]);
    let (status, _, fetched) = send(&app, empty_request(Method::GET, &uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["dueDate"], "2030-01-01T09:30:00Z");
}

#[tokio::test]
async fn can_list_all_todo_items() {
    let (_state, app) = setup_app(Environment::Production).await;
    for title in ["Buy milk", "Walk dog"] {
        let (status, _, _) = send(
            &app,
            json_request(Method::POST, "/api/todo", json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = send(&app, empty_request(Method::GET, "/api/todo")).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("body should be an array");
    let titles: Vec<&str> = items
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Buy milk", "Walk dog"]);
}

#[tokio::test]
async fn can_list_empty_todo_items() {
    let (_state, app) = setup_app(Environment::Production).await;

    let (status, _, body) = send(&app, empty_request(Method::GET, "/api/todo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn cannot_update_todo_item_with_mismatched_id() {
    let (_state, app) = setup_app(Environment::Production).await;
    send(
        &app,
        json_request(Method::POST, "/api/todo", json!({ "title": "Buy milk" })),
    )
    .await;

    let (status, _, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/todo/1",
            json!({ "id": 2, "title": "Sneaky" }),
        ),
    )
    .await;

    insta::with_settings!({ sort_maps => true }, {
        assert_json_snapshot!(JsonResponseSnapshot::new(status, body), @r#"
        {
          "body": {
            "error": "ID_MISMATCH",
            "message": "Path ID 1 does not match payload ID 2"
          },
          "status": 400
        }
        "#);
    });

    let (_, _, unchanged) = send(&app, empty_request(Method::GET, "/api/todo/1")).await;
    assert_eq!(unchanged["title"], "Buy milk");
}

#[tokio::test]
async fn can_return_not_found_when_updating_missing_todo_item() {
    let (_state, app) = setup_app(Environment::Production).await;

    let (status, _, body) = send(
        &app,
        json_request(Method::PUT, "/api/todo/77", json!({ "title": "Ghost" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
    let (_, _, items) = send(&app, empty_request(Method::GET, "/api/todo")).await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn can_delete_missing_todo_item_with_no_content() {
    let (_state, app) = setup_app(Environment::Production).await;

    let (status, _, _) = send(&app, empty_request(Method::DELETE, "/api/todo/404")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn can_ignore_client_supplied_timestamps_on_create() {
    let (_state, app) = setup_app(Environment::Production).await;

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/todo",
            json!({
                "title": "Backdated",
                "createdAt": "1999-01-01T00:00:00Z",
                "updatedAt": "1999-01-01T00:00:00Z"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(timestamp(&body["createdAt"]).timestamp() > 946_684_800);
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn can_pretty_print_responses_in_development() {
    let state = common::setup().await.expect("Failed to setup test context");
    let config = common::test_config(&state.db_url, Environment::Development);
    let db = sea_orm::Database::connect(&state.db_url)
        .await
        .expect("Failed to connect to database");
    let app = todo_server::web::create_app(&config, db).expect("Failed to create app");

    let response = tower::ServiceExt::oneshot(
        app,
        json_request(Method::POST, "/api/todo", json!({ "title": "Pretty" })),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_text = std::str::from_utf8(&body).unwrap();
    assert!(body_text.starts_with("{\n  \"id\": 1,"));
}
