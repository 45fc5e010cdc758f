//! Router-level tests for the HTTP surface, run against the in-memory
//! store so no database is required.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use scene_db_rust::store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn build_app() -> Router {
    scene_db_rust::api::create_router().with_state(Arc::new(MemoryStore::new()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn entity_payload(name: &str, archetype: &str) -> Value {
    json!({ "name": name, "archetype": archetype, "tags": [] })
}

// ---------------------------------------------------------------------------
// Health and unknown routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let app = build_app();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_app();
    let response = app.oneshot(get("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Entity creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_entity_derives_slug_and_zeroes_scores() {
    let app = build_app();

    let payload = json!({
        "name": "Kalli's Bar",
        "archetype": "venue",
        "role": "Dive bar",
        "tags": [" Rock ", "rock", "LIVE"],
        "links": { "instagram": "https://instagram.com/kallisbar" }
    });
    let response = app.clone().oneshot(post_json("/api/entities", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["slug"], "kallis-bar");
    assert_eq!(body["tags"], json!(["rock", "live"]));
    assert_eq!(body["scores"]["momentum"], 0.0);
    assert_eq!(body["scores"]["centrality"], 0.0);
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn list_entities_is_newest_first() {
    let app = build_app();

    for name in ["First Venue", "Second Venue", "Third Venue"] {
        let response = app
            .clone()
            .oneshot(post_json("/api/entities", entity_payload(name, "venue")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(get("/api/entities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third Venue", "Second Venue", "First Venue"]);
}

#[tokio::test]
async fn get_entity_returns_detail_or_404() {
    let app = build_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/entities", entity_payload("Harpa", "venue")))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/entities/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Harpa");
    assert!(body["aliases"].is_array());

    let response = app
        .oneshot(get("/api/entities/not-a-real-id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_normalized_names_are_rejected() {
    let app = build_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/entities", entity_payload("Björk", "person")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same name modulo case, diacritics, and whitespace
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entities",
            entity_payload("  BJORK ", "person"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn name_colliding_with_existing_alias_is_rejected() {
    let app = build_app();

    let payload = json!({
        "name": "Kex Hostel",
        "archetype": "venue",
        "aliases": [{ "name": "The Kex", "primary": true }]
    });
    let response = app.clone().oneshot(post_json("/api/entities", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json("/api/entities", entity_payload("the kex", "venue")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn multiple_primary_aliases_elect_exactly_one() {
    let app = build_app();

    let payload = json!({
        "name": "Vök",
        "archetype": "group",
        "aliases": [
            { "name": "Voek", "primary": true },
            { "name": "VOK Band", "primary": true },
            { "name": "V" }
        ]
    });
    let response = app.oneshot(post_json("/api/entities", payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let aliases = body["aliases"].as_array().unwrap();
    assert_eq!(aliases.len(), 3);
    let primaries: Vec<&Value> = aliases
        .iter()
        .filter(|a| a["is_primary"] == true)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["name"], "Voek"); // first flagged wins
}

#[tokio::test]
async fn invalid_payloads_are_client_errors() {
    let app = build_app();

    // Missing name
    let response = app
        .clone()
        .oneshot(post_json("/api/entities", json!({ "archetype": "person" })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Unknown archetype
    let response = app
        .clone()
        .oneshot(post_json("/api/entities", entity_payload("X", "robot")))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Unknown field
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entities",
            json!({ "name": "X", "archetype": "person", "favorite_color": "red" }),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Blank name
    let response = app
        .clone()
        .oneshot(post_json("/api/entities", entity_payload("   ", "person")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bad link URL
    let response = app
        .oneshot(post_json(
            "/api/entities",
            json!({
                "name": "X",
                "archetype": "person",
                "links": { "web": "not a url" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Slug check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slug_check_reports_availability() {
    let app = build_app();

    let response = app
        .clone()
        .oneshot(get("/api/entities/slug-check?name=Hotel%20Borg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["slug"], "hotel-borg");
    assert_eq!(body["available"], true);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entities",
            entity_payload("Hotel Borg", "venue"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get("/api/entities/slug-check?name=hotel+borg"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["available"], false);
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

async fn create_entity_id(app: &Router, name: &str, archetype: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/entities", entity_payload(name, archetype)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn edges_require_existing_endpoints() {
    let app = build_app();
    let source = create_entity_id(&app, "Band", "group").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/edges",
            json!({ "source_id": source, "target_id": "ghost", "type": "performed_at" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn edge_listing_embeds_endpoints_newest_first() {
    let app = build_app();
    let band = create_entity_id(&app, "Band", "group").await;
    let venue = create_entity_id(&app, "Venue", "venue").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/edges",
            json!({
                "source_id": band,
                "target_id": venue,
                "type": "performed_at",
                "weight": 0.8,
                "date": "2026-06-01"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["type"], "performed_at");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/edges",
            json!({ "source_id": venue, "target_id": band, "type": "hosted" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/api/edges")).await.unwrap();
    let body = body_json(response).await;
    let edges = body.as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["type"], "hosted"); // newest first
    assert_eq!(edges[1]["source"]["name"], "Band");
    assert_eq!(edges[1]["target"]["name"], "Venue");

    // Row limit applies
    let response = app.oneshot(get("/api/edges?limit=1")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenes_resolve_members_and_reject_unknown_ones() {
    let app = build_app();
    let band = create_entity_id(&app, "Band", "group").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/scenes",
            json!({
                "name": "Downtown Circuit",
                "members": [{ "entity_id": band, "role": "act" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["members"][0]["entity"]["name"], "Band");
    assert_eq!(created["members"][0]["role"], "act");

    let response = app.clone().oneshot(get("/api/scenes")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Downtown Circuit");

    let response = app
        .oneshot(post_json(
            "/api/scenes",
            json!({ "name": "Ghost Scene", "members": [{ "entity_id": "ghost" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn score_recompute_reflects_the_edge_set() {
    let app = build_app();
    let a = create_entity_id(&app, "A", "person").await;
    let b = create_entity_id(&app, "B", "venue").await;
    let _isolated = create_entity_id(&app, "C", "venue").await;

    let today = chrono::Utc::now().date_naive();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/edges",
            json!({
                "source_id": a,
                "target_id": b,
                "type": "performed_at",
                "weight": 2.0,
                "date": today.to_string()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json("/api/scores/recompute", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let scores = body_json(response).await;
    let find = |id: &str| {
        scores
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["entity_id"] == id)
            .cloned()
            .unwrap()
    };
    assert_eq!(find(&a)["centrality"], 0.5); // 1 neighbor / (3 - 1)
    assert_eq!(find(&a)["momentum"], 2.0);

    // Persisted: the entity detail now carries the recomputed scores
    let response = app
        .oneshot(get(&format!("/api/entities/{}", a)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["scores"]["momentum"], 2.0);
}

// ---------------------------------------------------------------------------
// Debug snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn debug_snapshot_dumps_every_table() {
    let app = build_app();
    let band = create_entity_id(&app, "Band", "group").await;
    let venue = create_entity_id(&app, "Venue", "venue").await;
    app.clone()
        .oneshot(post_json(
            "/api/edges",
            json!({ "source_id": band, "target_id": venue, "type": "performed_at" }),
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/debug/snapshot")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["entities"].as_array().unwrap().len(), 2);
    assert_eq!(body["edges"].as_array().unwrap().len(), 1);
    assert!(body["scenes"].is_array());
    assert!(body["clients"].is_array());
    assert!(body["shortlists"].is_array());
    // Every create left an audit entry, newest first
    let audit = body["audit_logs"].as_array().unwrap();
    assert_eq!(audit.len(), 3);
    assert_eq!(audit[0]["subject"], "edge");
    assert_eq!(audit[1]["subject"], "entity");
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seed_data_populates_the_full_schema() {
    let store = Arc::new(MemoryStore::new());
    scene_db_rust::seed::load_seed_data(&*store)
        .await
        .expect("seed should load");

    let app = scene_db_rust::api::create_router().with_state(store);
    let response = app.oneshot(get("/api/debug/snapshot")).await.unwrap();
    let body = body_json(response).await;

    assert!(body["entities"].as_array().unwrap().len() >= 5);
    assert!(!body["edges"].as_array().unwrap().is_empty());
    assert!(!body["scenes"].as_array().unwrap().is_empty());
    assert!(!body["clients"].as_array().unwrap().is_empty());
    assert!(!body["shortlists"].as_array().unwrap().is_empty());

    // Client and shortlist creates are audited like every other write
    let audit = body["audit_logs"].as_array().unwrap();
    for subject in ["entity", "edge", "scene", "client", "shortlist"] {
        assert!(
            audit.iter().any(|a| a["subject"] == subject),
            "no audit row for {}",
            subject
        );
    }

    // Seeded aliases elected a primary
    let bjork = body["entities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "Björk")
        .unwrap();
    assert_eq!(bjork["aliases"][0]["is_primary"], true);
}
