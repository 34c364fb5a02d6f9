// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request helpers for driving the router in-process.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use kermesse_persistence::Persistence;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::session::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::{AppState, build_router};

pub const PASSWORD: &str = "Kermesse-2026";

/// A router over a fresh in-memory store.
pub fn create_test_app() -> Router {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    build_router(AppState::new(persistence))
}

/// An actor identity sent as headers.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: i64,
    pub role: &'static str,
}

/// Sends one request and returns the status with the parsed JSON body.
///
/// An empty body is returned as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<Actor>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, actor.id.to_string())
            .header(ACTOR_ROLE_HEADER, actor.role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers a user through the API and returns its identity.
pub async fn register(app: &Router, email: &str, role: &'static str) -> Actor {
    let (status, user) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({
            "name": "Test User",
            "email": email,
            "password": PASSWORD,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {user}");
    Actor {
        id: user["user_id"].as_i64().unwrap(),
        role,
    }
}

/// A running fair reachable through HTTP.
pub struct HttpFair {
    pub app: Router,
    pub organizer: Actor,
    pub holder: Actor,
    pub parent: Actor,
    pub student: Actor,
    pub kermesse_id: i64,
    pub stand_id: i64,
}

/// Builds a fair with a FOOD stand priced 30 with 2 in stock and a parent
/// holding 100.
pub async fn setup_http_fair() -> HttpFair {
    let app = create_test_app();
    let organizer = register(&app, "org@school.test", "ORGANIZER").await;
    let holder = register(&app, "holder@school.test", "STAND_HOLDER").await;
    let parent = register(&app, "parent@school.test", "PARENT").await;

    let (status, invited) = send(
        &app,
        "POST",
        "/users/invite-child",
        Some(parent),
        Some(json!({ "name": "Kid", "email": "kid@school.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student = Actor {
        id: invited["student"]["user_id"].as_i64().unwrap(),
        role: "STUDENT",
    };

    let (status, _) = send(
        &app,
        "POST",
        "/webhook/top-up",
        None,
        Some(json!({ "user_id": parent.id, "amount": 100, "reference": "pay-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, kermesse) = send(
        &app,
        "POST",
        "/kermesses",
        Some(organizer),
        Some(json!({ "name": "Spring fair" })),
    )
    .await;
    let kermesse_id = kermesse["kermesse_id"].as_i64().unwrap();

    let (_, stand) = send(
        &app,
        "POST",
        "/stands",
        Some(holder),
        Some(json!({ "name": "Crepes", "category": "FOOD", "price": 30, "stock": 2 })),
    )
    .await;
    let stand_id = stand["stand_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/kermesses/{kermesse_id}/add-stand"),
        Some(organizer),
        Some(json!({ "stand_id": stand_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/kermesses/{kermesse_id}/add-user"),
        Some(organizer),
        Some(json!({ "user_id": student.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    HttpFair {
        app,
        organizer,
        holder,
        parent,
        student,
        kermesse_id,
        stand_id,
    }
}
