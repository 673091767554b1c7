//! End-to-end tests for the notes REST surface.

use std::time::Duration;

use serde_json::{json, Value};

mod common;
use common::{TestServer, ALICE_TOKEN, BOB_TOKEN};

#[tokio::test]
async fn test_health_is_public() {
    let server = TestServer::start(common::test_config(None)).await;

    let res = server.client.get(server.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_notes_require_bearer_token() {
    let server = TestServer::start(common::test_config(None)).await;

    let res = server.client.get(server.url("/api/notes")).send().await.unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");

    let res = server
        .client
        .get(server.url("/api/notes"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn test_note_crud_roundtrip() {
    let server = TestServer::start(common::test_config(None)).await;
    let id = server.create_note(ALICE_TOKEN, "Groceries", "Eggs and milk").await;

    let note: Value = server
        .client
        .get(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(note["title"], "Groceries");
    assert_eq!(note["content"], "Eggs and milk");
    assert_eq!(note["ownerId"], "alice");
    assert!(note["createdAt"].is_string());

    let res = server
        .client
        .put(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .json(&json!({ "title": "Groceries v2", "content": "Eggs, milk, bread" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Groceries v2");
    assert_eq!(updated["createdAt"], note["createdAt"]);

    let res = server
        .client
        .delete(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Note deleted successfully");

    let res = server
        .client
        .get(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Note not found");
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let server = TestServer::start(common::test_config(None)).await;
    server.create_note(ALICE_TOKEN, "first", "a").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    server.create_note(ALICE_TOKEN, "second", "b").await;

    let notes: Vec<Value> = server
        .client
        .get(server.url("/api/notes"))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = notes.iter().map(|n| n["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn test_owners_cannot_see_each_others_notes() {
    let server = TestServer::start(common::test_config(None)).await;
    let id = server.create_note(ALICE_TOKEN, "private", "alice only").await;

    let notes: Vec<Value> = server
        .client
        .get(server.url("/api/notes"))
        .bearer_auth(BOB_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(notes.is_empty());

    for res in [
        server
            .client
            .get(server.url(&format!("/api/notes/{}", id)))
            .bearer_auth(BOB_TOKEN)
            .send()
            .await
            .unwrap(),
        server
            .client
            .delete(server.url(&format!("/api/notes/{}", id)))
            .bearer_auth(BOB_TOKEN)
            .send()
            .await
            .unwrap(),
        server
            .client
            .post(server.url(&format!("/api/notes/{}/summarize", id)))
            .bearer_auth(BOB_TOKEN)
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(res.status(), 404);
    }

    // Still there for its owner.
    let res = server
        .client
        .get(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_validation_errors() {
    let server = TestServer::start(common::test_config(None)).await;

    let res = server
        .client
        .post(server.url("/api/notes"))
        .bearer_auth(ALICE_TOKEN)
        .json(&json!({ "title": "", "content": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["errors"],
        json!([
            { "field": "title", "message": "Title is required" },
            { "field": "content", "message": "Content is required" },
        ])
    );

    let res = server
        .client
        .post(server.url("/api/notes"))
        .bearer_auth(ALICE_TOKEN)
        .json(&json!({ "title": "x".repeat(101), "content": "body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Title must be less than 100 characters");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let server = TestServer::start(common::test_config(None)).await;

    for path in ["/api/notes/not-a-uuid", "/api/notes/00000000-0000-0000-0000-000000000000"] {
        let res = server
            .client
            .get(server.url(path))
            .bearer_auth(ALICE_TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404, "{}", path);
    }

    let res = server.client.get(server.url("/api/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = std::env::temp_dir().join(format!("notes-api-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("notes.json");

    let mut config = common::test_config(None);
    config.storage.persistence_path = Some(path.to_string_lossy().into_owned());

    let server = TestServer::start(config.clone()).await;
    let id = server.create_note(ALICE_TOKEN, "durable", "kept on disk").await;
    server.shutdown.trigger();

    // The server flushes after draining; wait for the file.
    for _ in 0..100 {
        if path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(path.exists());

    let server = TestServer::start(config).await;
    let res = server
        .client
        .get(server.url(&format!("/api/notes/{}", id)))
        .bearer_auth(ALICE_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = common::test_config(None);
    config.security.max_body_size = 256;
    let server = TestServer::start(config).await;

    let res = server
        .client
        .post(server.url("/api/notes"))
        .bearer_auth(ALICE_TOKEN)
        .json(&json!({ "title": "big", "content": "x".repeat(1024) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);

    // Small bodies still pass under the same limit.
    server.create_note(ALICE_TOKEN, "small", "fits").await;
}

#[tokio::test]
async fn test_frontend_served_outside_api() {
    let dir = std::env::temp_dir().join(format!("notes-api-web-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<html>notes app</html>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log('notes');").unwrap();

    let mut config = common::test_config(None);
    config.static_files.dir = Some(dir.to_string_lossy().into_owned());
    let server = TestServer::start(config).await;

    let res = server.client.get(server.url("/app.js")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "console.log('notes');");

    // Client-side routes fall back to the SPA entry point.
    let res = server.client.get(server.url("/notes/edit/42")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "<html>notes app</html>");

    let res = server.client.get(server.url("/api/nope")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not found");

    let _ = std::fs::remove_dir_all(&dir);
}

fn identity_toolkit_config(lookup: &common::MockUpstream) -> notes_api::NotesConfig {
    let mut config = common::test_config(None);
    config.auth.provider = notes_api::config::AuthProvider::IdentityToolkit;
    config.auth.lookup_url = format!("http://{}/v1/accounts:lookup", lookup.addr);
    config.auth.api_key = Some("project-key".into());
    config
}

#[tokio::test]
async fn test_identity_toolkit_principal_owns_notes() {
    let lookup = common::MockUpstream::start(vec![(
        200,
        json!({ "users": [{ "localId": "uid-9" }] }).to_string(),
    )])
    .await;
    let server = TestServer::start(identity_toolkit_config(&lookup)).await;

    let res = server
        .client
        .post(server.url("/api/notes"))
        .bearer_auth("firebase-id-token")
        .json(&json!({ "title": "t", "content": "c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let note: Value = res.json().await.unwrap();
    assert_eq!(note["ownerId"], "uid-9");
    assert_eq!(lookup.queries(), vec!["key=project-key".to_string()]);
}

#[tokio::test]
async fn test_identity_provider_outage_is_unauthorized() {
    let lookup = common::MockUpstream::start(vec![(503, "{}".to_string())]).await;
    let server = TestServer::start(identity_toolkit_config(&lookup)).await;

    let res = server
        .client
        .get(server.url("/api/notes"))
        .bearer_auth("firebase-id-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(lookup.hits(), 1);
}
