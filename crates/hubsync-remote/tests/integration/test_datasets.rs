//! Dataset CRUD calls: paths, headers, payload bodies, and raw
//! status/body passthrough.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use hubsync_core::ports::RemoteCatalog;

use crate::common::{sample_payload, setup_remote_mock, test_creds};

#[tokio::test]
async fn create_or_replace_puts_payload_with_auth() {
    let (server, client) = setup_remote_mock().await;
    let payload = sample_payload();

    Mock::given(method("PUT"))
        .and(path("/datasets/acme/rivers-2020"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({
            "title": "rivers-2020",
            "description": "Rivers 2020",
            "summary": "All about rivers.",
            "tags": ["river data"],
            "license": "CC-BY",
            "visibility": "OPEN",
            "files": [{
                "name": "a.csv",
                "source": {"url": "http://x/a.csv", "expandArchive": true}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uri": "https://data.example.com/acme/rivers-2020"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .create_or_replace(&test_creds(), "rivers-2020", &payload)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let json = response.json().unwrap();
    assert_eq!(json["uri"], "https://data.example.com/acme/rivers-2020");
}

#[tokio::test]
async fn create_passes_through_error_status_and_body() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("PUT"))
        .and(path("/datasets/acme/rivers-2020"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"message\": \"bad slug\"}"))
        .mount(&server)
        .await;

    let response = client
        .create_or_replace(&test_creds(), "rivers-2020", &sample_payload())
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(response.body.contains("bad slug"));
    assert!(!response.is_ok());
}

#[tokio::test]
async fn update_uses_put_on_name() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("PUT"))
        .and(path("/datasets/acme/rivers-2020"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .update(&test_creds(), "rivers-2020", &sample_payload())
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, "not found");
}

#[tokio::test]
async fn delete_issues_delete_with_body() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/datasets/acme/rivers-2020"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .delete(&test_creds(), "rivers-2020", &sample_payload())
        .await
        .unwrap();

    assert!(response.is_ok());
}

#[tokio::test]
async fn fetch_returns_remote_representation() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("GET"))
        .and(path("/datasets/acme/rivers-2020"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "rivers-2020",
            "visibility": "OPEN"
        })))
        .mount(&server)
        .await;

    let response = client.fetch(&test_creds(), "rivers-2020").await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["title"], "rivers-2020");
}

#[tokio::test]
async fn trigger_file_sync_posts_to_sync_endpoint() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("POST"))
        .and(path("/datasets/acme/rivers-2020/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .trigger_file_sync(&test_creds(), "rivers-2020")
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "queued");
}

#[tokio::test]
async fn requests_carry_versioned_user_agent() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("GET"))
        .and(path("/datasets/acme/rivers-2020"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.fetch(&test_creds(), "rivers-2020").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0]
        .headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(user_agent.starts_with("hubsync/"), "got {user_agent:?}");
}
