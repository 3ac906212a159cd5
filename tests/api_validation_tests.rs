// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation security tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{authed_request, body_json, create_test_app, create_test_jwt};

#[tokio::test]
async fn test_notes_too_long() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/periods",
            "alice",
            Some(json!({ "startDate": "2024-01-01", "notes": "a".repeat(1001) })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_start_date_too_long() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/periods",
            "alice",
            Some(json!({ "startDate": format!("2024-01-01{}", "0".repeat(40)) })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_flow_is_rejected() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/periods",
            "alice",
            Some(json!({ "startDate": "2024-01-01", "flow": "torrential" })),
        ))
        .await
        .unwrap();

    // Rejected by the JSON extractor before reaching the handler
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _) = create_test_app();
    let token = create_test_jwt("alice");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/periods")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"startDate\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_update_unknown_period() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request(
            "PUT",
            "/api/periods/does-not-exist",
            "alice",
            Some(json!({ "startDate": "2024-01-01" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_too_many_symptoms() {
    let (app, _) = create_test_app();
    let symptoms: Vec<String> = (0..51).map(|i| format!("symptom-{}", i)).collect();

    let response = app
        .oneshot(authed_request(
            "PUT",
            "/api/symptoms/2024-01-01",
            "alice",
            Some(json!({ "symptoms": symptoms })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_path_date_must_be_a_date() {
    let (app, _) = create_test_app();

    for uri in ["/api/symptoms/yesterday", "/api/moods/2024-13-01"] {
        let response = app
            .clone()
            .oneshot(authed_request("GET", uri, "alice", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_profile_rejects_bad_dates() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request(
            "PUT",
            "/api/profile",
            "alice",
            Some(json!({ "lastPeriodStart": "2024-02-31" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_period_list_limit_is_clamped() {
    let (app, _) = create_test_app();

    for start in ["2024-01-01", "2024-01-29", "2024-02-26"] {
        let response = app
            .clone()
            .oneshot(authed_request(
                "POST",
                "/api/periods",
                "alice",
                Some(json!({ "startDate": start, "duration": 5 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // limit=0 is raised to 1
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/periods?limit=0", "alice", None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["startDate"], "2024-02-26");

    let response = app
        .oneshot(authed_request("GET", "/api/periods?limit=5000", "alice", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
}
