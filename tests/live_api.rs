//! End-to-end workflow against a running server. Ignored by default;
//! start the server (e.g. `SCENEDB_STORE=memory cargo run`) and run
//! with `cargo test -- --ignored`, optionally pointing
//! `TEST_API_BASE_URL` at another instance.

use reqwest::Client;
use serde_json::{json, Value};

struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

#[tokio::test]
#[ignore]
async fn live_entity_workflow() {
    let base_url =
        std::env::var("TEST_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
    let client = TestClient::new(base_url);

    let health = client.get("/health").await.expect("server not reachable");
    assert!(health.status().is_success());

    // Unique name per run so the test can be repeated against a
    // persistent database.
    let name = format!("Live Test Venue {}", uuid::Uuid::new_v4());

    let response = client
        .post(
            "/api/entities",
            json!({
                "name": name,
                "archetype": "venue",
                "tags": ["live-test"],
                "aliases": [{ "name": format!("{} alias", name), "primary": true }]
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], name.as_str());

    // Duplicate is rejected
    let response = client
        .post(
            "/api/entities",
            json!({ "name": name, "archetype": "venue" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Newest-first listing includes it
    let response = client.get("/api/entities").await.unwrap();
    let entities: Value = response.json().await.unwrap();
    assert_eq!(entities[0]["id"], id.as_str());

    // Detail carries the elected alias and zeroed scores
    let response = client.get(&format!("/api/entities/{}", id)).await.unwrap();
    let detail: Value = response.json().await.unwrap();
    assert_eq!(detail["aliases"].as_array().unwrap().len(), 1);
    assert_eq!(detail["aliases"][0]["is_primary"], true);
}
