//! Credential validation: the sentinel GET proves the key without
//! requiring any dataset to exist.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use hubsync_core::ports::RemoteCatalog;

use crate::common::setup_remote_mock;

#[tokio::test]
async fn rejected_key_returns_false() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("GET"))
        .and(path("/datasets/acme/definitely-fake-dataset-name"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    assert!(!client.check_credentials("acme", "bad-key").await.unwrap());
}

#[tokio::test]
async fn not_found_sentinel_proves_key_accepted() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("GET"))
        .and(path("/datasets/acme/definitely-fake-dataset-name"))
        .and(header("Authorization", "Bearer good-key"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    assert!(client.check_credentials("acme", "good-key").await.unwrap());
}

#[tokio::test]
async fn ok_response_counts_as_accepted() {
    let (server, client) = setup_remote_mock().await;

    Mock::given(method("GET"))
        .and(path("/datasets/acme/definitely-fake-dataset-name"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    assert!(client.check_credentials("acme", "good-key").await.unwrap());
}
