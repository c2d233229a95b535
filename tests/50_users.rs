mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn user_lifecycle_with_permission_replacement() {
    let app = common::test_app().await;

    let (status, created) = common::request(
        &app,
        "POST",
        "/api/users",
        Some(json!({
            "username": "sara",
            "password": "secret",
            "full_name": "Sara K",
            "role": "user",
            "permissions": ["receipts", "view_contracts", "receipts"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "user create failed: {created}");
    let user_id = created["id"].as_i64().unwrap();

    // Duplicates in the submitted list collapse to one grant
    let (status, user) =
        common::request(&app, "GET", &format!("/api/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let mut permissions: Vec<String> = user["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap().to_string())
        .collect();
    permissions.sort();
    assert_eq!(permissions, vec!["receipts", "view_contracts"]);
    assert!(user.get("password").is_none(), "password must not leak");

    // A submitted permission list replaces the stored one wholesale
    let (status, _body) = common::request(
        &app,
        "PUT",
        &format!("/api/users/{user_id}"),
        Some(json!({ "permissions": ["company_work"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, user) = common::request(&app, "GET", &format!("/api/users/{user_id}"), None).await;
    assert_eq!(user["permissions"], json!(["company_work"]));

    let (status, _body) =
        common::request(&app, "DELETE", &format!("/api/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _user) =
        common::request(&app, "GET", &format!("/api/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let app = common::test_app().await;

    let body = json!({
        "username": "sara",
        "password": "secret",
        "full_name": "Sara K"
    });
    let (status, _created) = common::request(&app, "POST", "/api/users", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, error) = common::request(&app, "POST", "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"]
        .as_str()
        .unwrap()
        .contains("username already exists"));
}

#[tokio::test]
async fn deactivated_users_lose_their_session() {
    let app = common::test_app().await;

    let (_, created) = common::request(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "username": "sara", "password": "secret", "full_name": "Sara K" })),
    )
    .await;
    let user_id = created["id"].as_i64().unwrap();

    // The fresh user's id works as a token
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/contracts")
        .header("Authorization", user_id.to_string())
        .body(axum::body::Body::empty())
        .unwrap();
    let status = tower::ServiceExt::oneshot(app.clone(), request)
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = common::request(
        &app,
        "PUT",
        &format!("/api/users/{user_id}"),
        Some(json!({ "is_active": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/contracts")
        .header("Authorization", user_id.to_string())
        .body(axum::body::Body::empty())
        .unwrap();
    let status = tower::ServiceExt::oneshot(app.clone(), request)
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn building_mutation_is_owner_or_admin_only() {
    let app = common::test_app().await;

    // Admin creates the building
    let (_, building) = common::request(
        &app,
        "POST",
        "/api/buildings",
        Some(json!({ "name": "Marina Tower" })),
    )
    .await;
    let building_id = building["id"].as_i64().unwrap();

    // A plain user who does not own it gets 403
    let (_, created) = common::request(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "username": "sara", "password": "secret", "full_name": "Sara K" })),
    )
    .await;
    let user_id = created["id"].as_i64().unwrap();

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/buildings/{building_id}"))
        .header("Authorization", user_id.to_string())
        .body(axum::body::Body::empty())
        .unwrap();
    let status = tower::ServiceExt::oneshot(app.clone(), request)
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin owner can delete
    let (status, _body) = common::request(
        &app,
        "DELETE",
        &format!("/api/buildings/{building_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
