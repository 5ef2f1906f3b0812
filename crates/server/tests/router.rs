use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use engine::{Engine, NewProfile, Role};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, TokenIdentity, router};
use tower::ServiceExt;

struct Fixture {
    app: Router,
    admin_token: String,
    member_token: String,
    member_id: String,
}

async fn setup() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Arc::new(Engine::builder().database(db).build().await.unwrap());

    let admin = engine
        .create_profile(NewProfile {
            name: "Alex Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            ..Default::default()
        })
        .await
        .unwrap();
    let member = engine
        .create_profile(NewProfile {
            name: "Sam Member".to_string(),
            email: "sam@example.com".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let admin_token = engine.issue_access_token(&admin.id).await.unwrap();
    let member_token = engine.issue_access_token(&member.id).await.unwrap();

    let state = ServerState {
        engine: engine.clone(),
        identity: Arc::new(TokenIdentity::new(engine)),
    };
    Fixture {
        app: router(state),
        admin_token,
        member_token,
        member_id: member.id,
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn slot_start(hours_from_base: i64) -> String {
    let base = (Utc::now() + Duration::days(2))
        .date_naive()
        .and_hms_opt(8, 0, 0)
        .unwrap()
        .and_utc();
    (base + Duration::hours(hours_from_base)).to_rfc3339()
}

#[tokio::test]
async fn missing_credential_is_401() {
    let fx = setup().await;
    let (status, body) = send(&fx.app, request("GET", "/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn unknown_credential_is_401() {
    let fx = setup().await;
    let (status, _) = send(&fx.app, request("GET", "/me", Some("nope"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reports_capabilities() {
    let fx = setup().await;
    let (status, body) = send(&fx.app, request("GET", "/me", Some(&fx.member_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["email"], "sam@example.com");
    assert_eq!(body["capabilities"]["can_bypass_quota"], false);

    let (_, body) = send(&fx.app, request("GET", "/me", Some(&fx.admin_token), None)).await;
    assert_eq!(body["capabilities"]["can_bypass_quota"], true);
}

#[tokio::test]
async fn booking_conflict_is_409_with_kind() {
    let fx = setup().await;
    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/bookings",
            Some(&fx.member_token),
            Some(json!({"simulator": "east", "start_time": slot_start(2)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["simulator"], "east");

    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/bookings",
            Some(&fx.admin_token),
            Some(json!({"simulator": "east", "start_time": slot_start(3)})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "slot_conflict");
}

#[tokio::test]
async fn member_cannot_book_for_others() {
    let fx = setup().await;
    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/bookings",
            Some(&fx.member_token),
            Some(json!({
                "simulator": "west",
                "start_time": slot_start(0),
                "user_id": "someone-else",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");
}

#[tokio::test]
async fn unaligned_start_is_422() {
    let fx = setup().await;
    let start = (Utc::now() + Duration::days(2))
        .date_naive()
        .and_hms_opt(10, 30, 0)
        .unwrap()
        .and_utc()
        .to_rfc3339();
    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/bookings",
            Some(&fx.member_token),
            Some(json!({"simulator": "west", "start_time": start})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn guest_fee_then_balance() {
    let fx = setup().await;
    let (_, booking) = send(
        &fx.app,
        request(
            "POST",
            "/bookings",
            Some(&fx.member_token),
            Some(json!({"simulator": "west", "start_time": slot_start(4)})),
        ),
    )
    .await;
    let booking_id = booking["id"].as_i64().unwrap();

    let (status, entry) = send(
        &fx.app,
        request(
            "POST",
            &format!("/bookings/{booking_id}/guest-fees"),
            Some(&fx.member_token),
            Some(json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["amount_minor"], 2000);
    assert_eq!(entry["kind"], "guest_fee");

    let (status, balance) = send(
        &fx.app,
        request(
            "GET",
            &format!("/balances/{}", fx.member_id),
            Some(&fx.member_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["balance_minor"], 2000);
    assert_eq!(balance["formatted"], "$20.00");
}

#[tokio::test]
async fn payments_are_admin_only() {
    let fx = setup().await;
    let uri = format!("/ledger/{}/payments", fx.member_id);
    let (status, _) = send(
        &fx.app,
        request("POST", &uri, Some(&fx.member_token), Some(json!({"amount_minor": 500}))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, entry) = send(
        &fx.app,
        request("POST", &uri, Some(&fx.admin_token), Some(json!({"amount_minor": 500}))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["amount_minor"], -500);
}

#[tokio::test]
async fn public_announcements_hide_inactive() {
    let fx = setup().await;
    for (message, is_active) in [("<p>Open late</p>", true), ("<p>Draft</p>", false)] {
        let (status, _) = send(
            &fx.app,
            request(
                "POST",
                "/announcements",
                Some(&fx.admin_token),
                Some(json!({"message": message, "is_active": is_active})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&fx.app, request("GET", "/public/announcements", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let public = body["announcements"].as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["message"], "<p>Open late</p>");

    let (_, body) = send(
        &fx.app,
        request("GET", "/announcements", Some(&fx.admin_token), None),
    )
    .await;
    assert_eq!(body["announcements"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn public_inquiry_needs_no_credential() {
    let fx = setup().await;
    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/public/inquiries",
            None,
            Some(json!({
                "name": "Jordan",
                "email": "jordan@example.com",
                "message": "How much is a yearly membership?",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "jordan@example.com");

    let (status, _) = send(&fx.app, request("GET", "/inquiries", Some(&fx.member_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&fx.app, request("GET", "/inquiries", Some(&fx.admin_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inquiries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_creates_profile_with_token() {
    let fx = setup().await;
    let (status, body) = send(
        &fx.app,
        request(
            "POST",
            "/profiles",
            Some(&fx.admin_token),
            Some(json!({"name": "New Person", "email": "new@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = send(&fx.app, request("GET", "/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["profile"]["name"], "New Person");
}
