//! Integration tests for the note pool backend.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, Features};
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const ADMIN_PASSWORD: &str = "test-admin-password";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(Some(ADMIN_PASSWORD.to_string()), Features::default()).await
    }

    async fn with_config(admin_password: Option<String>, features: Features) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let database_url = format!(
            "sqlite:{}?mode=rwc",
            temp_dir.path().join("test.sqlite").display()
        );

        let public_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(&public_dir).expect("Failed to create public dir");
        std::fs::write(public_dir.join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(public_dir.join("admin.html"), "<h1>admin</h1>").unwrap();

        // Initialize database
        let pool = init_database(&database_url)
            .await
            .expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let config = Config {
            admin_password,
            database_url,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            public_dir,
            log_level: "warn".to_string(),
            features,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn admin_post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("x-admin-password", ADMIN_PASSWORD)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn submit(&self, body: Value) -> i64 {
        let resp = self.post("/submit", body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["id"].as_i64().unwrap()
    }

    async fn count(&self) -> i64 {
        let resp = self.client.get(self.url("/count")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["count"].as_i64().unwrap()
    }

    async fn random(&self, query: &str) -> Value {
        let resp = self
            .client
            .get(self.url(&format!("/random{}", query)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.json().await.unwrap()
    }

    async fn admin_notes(&self) -> Vec<Value> {
        let resp = self
            .client
            .get(self.url("/admin/data"))
            .header("x-admin-password", ADMIN_PASSWORD)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["notes"].as_array().unwrap().clone()
    }

    async fn admin_note(&self, id: i64) -> Option<Value> {
        self.admin_notes()
            .await
            .into_iter()
            .find(|n| n["id"].as_i64() == Some(id))
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_submit_increments_count() {
    let fixture = TestFixture::new().await;
    assert_eq!(fixture.count().await, 0);

    fixture.submit(json!({ "message": "hi" })).await;
    assert_eq!(fixture.count().await, 1);
}

#[tokio::test]
async fn test_submit_form_encoded() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/submit"))
        .form(&[("title", "Form"), ("message", "sent as a form"), ("tags", "a, b")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let note = fixture.random("").await;
    assert_eq!(note["title"], "Form");
    assert_eq!(note["message"], "sent as a form");
    assert_eq!(note["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_submit_validation() {
    let fixture = TestFixture::new().await;

    for body in [json!({}), json!({ "message": "" }), json!({ "message": "   \n " })] {
        let resp = fixture.post("/submit", body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.text().await.unwrap().is_empty());
    }

    let too_long = vec!["word"; 501].join(" ");
    let resp = fixture.post("/submit", json!({ "message": too_long })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fixture.count().await, 0);

    let at_limit = vec!["word"; 500].join(" ");
    fixture.submit(json!({ "message": at_limit })).await;
    assert_eq!(fixture.count().await, 1);
}

#[tokio::test]
async fn test_submit_requires_title_when_configured() {
    let features = Features {
        require_title: true,
        ..Features::default()
    };
    let fixture = TestFixture::with_config(Some(ADMIN_PASSWORD.to_string()), features).await;

    let resp = fixture.post("/submit", json!({ "message": "untitled" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    fixture
        .submit(json!({ "title": "Named", "message": "titled" }))
        .await;
}

#[tokio::test]
async fn test_random_placeholder_when_empty() {
    let fixture = TestFixture::new().await;

    let note = fixture.random("").await;
    assert!(note["id"].is_null());
    assert!(note["created_at"].is_null());
    assert_eq!(note["likes"], 0);
    assert_eq!(note["tags"], json!([]));
    assert_eq!(note["title"], "No notes yet");
}

#[tokio::test]
async fn test_random_tag_filter() {
    let fixture = TestFixture::new().await;
    let cats = fixture
        .submit(json!({ "message": "meow", "tags": ["cats"] }))
        .await;
    fixture
        .submit(json!({ "message": "woof", "tags": ["dogs"] }))
        .await;

    for _ in 0..5 {
        let note = fixture.random("?tag=cats").await;
        assert_eq!(note["id"].as_i64(), Some(cats));
        assert!(note.get("reportcount").is_none());
    }

    let missing = fixture.random("?tag=birds").await;
    assert!(missing["id"].is_null());

    let any = fixture.random("?tag=all").await;
    assert!(any["id"].is_number());
}

#[tokio::test]
async fn test_tags_ignored_when_disabled() {
    let features = Features {
        tags: false,
        ..Features::default()
    };
    let fixture = TestFixture::with_config(Some(ADMIN_PASSWORD.to_string()), features).await;

    fixture
        .submit(json!({ "message": "tagless", "tags": ["cats"] }))
        .await;

    let note = fixture.random("?tag=dogs").await;
    assert_eq!(note["message"], "tagless");
    assert_eq!(note["tags"], json!([]));

    // Route is not mounted, so the request falls through to static files
    let resp = fixture
        .admin_post("/admin/updateTags", json!({ "id": 1, "tags": ["x"] }))
        .await;
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_like() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "likeable" })).await;

    let resp = fixture.post("/like", json!({ "id": id })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = fixture.post("/like", json!({ "id": id.to_string() })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let note = fixture.random("").await;
    assert_eq!(note["likes"], 2);

    // Unknown ids are accepted silently
    let resp = fixture.post("/like", json!({ "id": 99999 })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = fixture.post("/like", json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = fixture.post("/like", json!({ "id": "abc" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_hides_at_threshold() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "hi" })).await;
    let keep = fixture.submit(json!({ "message": "fine" })).await;

    for expected in 1..=2 {
        let resp = fixture.post("/report", json!({ "id": id })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["reportcount"], expected);
        assert_eq!(body["hidden"], false);
    }
    assert_eq!(fixture.count().await, 2);

    let resp = fixture.post("/report", json!({ "id": id })).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["reportcount"], 3);
    assert_eq!(body["hidden"], true);

    assert_eq!(fixture.count().await, 1);
    for _ in 0..5 {
        let note = fixture.random("").await;
        assert_eq!(note["id"].as_i64(), Some(keep));
    }

    let hidden = fixture.admin_note(id).await.unwrap();
    assert_eq!(hidden["hidden"], true);
    assert_eq!(hidden["reportcount"], 3);
}

#[tokio::test]
async fn test_report_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture.post("/report", json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = fixture.post("/report", json!({ "id": 424242 })).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feedback() {
    let fixture = TestFixture::new().await;

    let resp = fixture.post("/feedback", json!({ "message": "" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = fixture.post("/feedback", json!({ "message": "  love it  " })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = fixture
        .client
        .get(fixture.url("/admin/data"))
        .header("x-admin-password", ADMIN_PASSWORD)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["feedback"][0]["message"], "love it");
}

#[tokio::test]
async fn test_admin_requires_password() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/admin/data"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = fixture
        .client
        .get(fixture.url("/admin/data"))
        .header("x-admin-password", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = fixture
        .post("/admin/delete", json!({ "id": 1, "password": "wrong" }))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/admin/data?password={}", ADMIN_PASSWORD)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_locked_without_configured_password() {
    let fixture = TestFixture::with_config(None, Features::default()).await;

    let resp = fixture
        .client
        .get(fixture.url("/admin/data"))
        .header("x-admin-password", "")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = fixture
        .admin_post("/admin/toggleHidden", json!({ "id": 1, "hidden": true }))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_body_password() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "to hide" })).await;

    let resp = fixture
        .post(
            "/admin/toggleHidden",
            json!({ "id": id, "hidden": true, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fixture.count().await, 0);

    let resp = fixture
        .client
        .post(fixture.url("/admin/toggleHidden"))
        .form(&[
            ("id", id.to_string()),
            ("hidden", "false".to_string()),
            ("password", ADMIN_PASSWORD.to_string()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fixture.count().await, 1);
}

#[tokio::test]
async fn test_admin_listing_includes_hidden_newest_first() {
    let fixture = TestFixture::new().await;
    let older = fixture.submit(json!({ "message": "older" })).await;
    let newer = fixture
        .submit(json!({ "title": "T", "message": "newer", "tags": ["x"] }))
        .await;

    fixture
        .admin_post("/admin/toggleHidden", json!({ "id": older, "hidden": true }))
        .await;

    let notes = fixture.admin_notes().await;
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["id"].as_i64(), Some(newer));
    assert_eq!(notes[0]["tags"], json!(["x"]));
    assert_eq!(notes[1]["id"].as_i64(), Some(older));
    assert_eq!(notes[1]["hidden"], true);
    assert!(notes[1]["created_at"].is_string());
}

#[tokio::test]
async fn test_toggle_hidden_idempotent() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "x" })).await;

    for _ in 0..2 {
        let resp = fixture
            .admin_post("/admin/toggleHidden", json!({ "id": id, "hidden": "true" }))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(fixture.admin_note(id).await.unwrap()["hidden"], true);
        assert_eq!(fixture.count().await, 0);
    }

    let resp = fixture
        .admin_post("/admin/toggleHidden", json!({ "hidden": true }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_idempotent() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "doomed" })).await;

    for _ in 0..2 {
        let resp = fixture.admin_post("/admin/delete", json!({ "id": id })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(fixture.admin_note(id).await.is_none());
    }

    let resp = fixture.admin_post("/admin/delete", json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_tags() {
    let fixture = TestFixture::new().await;
    let id = fixture
        .submit(json!({ "message": "x", "tags": ["old"] }))
        .await;

    let resp = fixture
        .admin_post("/admin/updateTags", json!({ "id": id, "tags": ["new", " fresh ", "new"] }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        fixture.admin_note(id).await.unwrap()["tags"],
        json!(["new", "fresh"])
    );

    let note = fixture.random("?tag=fresh").await;
    assert_eq!(note["id"].as_i64(), Some(id));
    let none = fixture.random("?tag=old").await;
    assert!(none["id"].is_null());
}

#[tokio::test]
async fn test_reset_reports() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit(json!({ "message": "x" })).await;
    for _ in 0..2 {
        fixture.post("/report", json!({ "id": id })).await;
    }

    let resp = fixture
        .admin_post("/admin/resetReports", json!({ "id": id }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fixture.admin_note(id).await.unwrap()["reportcount"], 0);

    // Counting starts over
    for _ in 0..2 {
        fixture.post("/report", json!({ "id": id })).await;
    }
    assert_eq!(fixture.count().await, 1);
}

#[tokio::test]
async fn test_reset_reports_disabled() {
    let features = Features {
        report_reset: false,
        ..Features::default()
    };
    let fixture = TestFixture::with_config(Some(ADMIN_PASSWORD.to_string()), features).await;

    let resp = fixture
        .admin_post("/admin/resetReports", json!({ "id": 1 }))
        .await;
    assert!(resp.status().is_client_error());
    assert_ne!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_html_shells() {
    let fixture = TestFixture::new().await;

    let resp = fixture.client.get(fixture.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "<h1>home</h1>");

    let resp = fixture
        .client
        .get(fixture.url("/admin"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "<h1>admin</h1>");
}
