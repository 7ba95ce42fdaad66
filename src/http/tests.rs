//! Tests for the HTTP client module

use super::*;
use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::operation::Operation;
use crate::types::content_type;
use serde_json::json;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use wiremock::matchers::{body_bytes, body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = Config::new()
        .with_endpoint(server.uri())
        .with_access_key_secret_key("ak", "sk");
    HttpClient::new(&config).unwrap()
}

#[test]
fn test_client_rejects_bad_endpoint() {
    let err = HttpClient::new(&Config::new().with_endpoint("ftp://example.com")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));

    let err = HttpClient::new(&Config::new().with_endpoint("http://example.com/")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_md5_base64() {
    // RFC 1321 test vector for the empty string
    assert_eq!(md5_base64(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
}

#[tokio::test]
async fn test_json_body_and_signed_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/groups/g1"))
        .and(header("Content-Type", "application/json"))
        .and(header_exists("Date"))
        .and(header_exists("Authorization"))
        .and(body_json(json!({"region": "nb"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::CreateGroup.route(&["g1"]).unwrap();
    client
        .request(route)
        .json(&json!({"region": "nb"}))
        .unwrap()
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_key_pair_authorization_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"repos": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::ListRepos.route(&[]).unwrap();
    let _: serde_json::Value = client.request(route).send_json().await.unwrap();

    let received = server.received_requests().await.unwrap();
    let auth = received[0].headers.get("Authorization").unwrap();
    assert!(auth.to_str().unwrap().starts_with("Pandora ak:"));
}

#[tokio::test]
async fn test_scoped_token_replaces_key_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/repos/r1/data"))
        .and(header("Authorization", "Pandora ak:sig:desc"))
        .and(header("Content-Type", "text/plain"))
        .and(body_bytes(b"a=1".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::PostData.route(&["r1"]).unwrap();
    client
        .request(route)
        .token(Some("Pandora ak:sig:desc"))
        .bytes(bytes::Bytes::from_static(b"a=1"), content_type::TEXT)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_content_md5_on_bytes() {
    let server = MockServer::start().await;
    let payload = b"jar-bytes".to_vec();

    Mock::given(method("POST"))
        .and(path("/v2/plugins/p1"))
        .and(header("Content-MD5", md5_base64(&payload).as_str()))
        .and(header("Content-Type", "application/java-archive"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::UploadPlugin.route(&["p1"]).unwrap();
    client
        .request(route)
        .content_md5()
        .bytes(payload.clone(), content_type::JAR)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reader_body_is_streamed() {
    let server = MockServer::start().await;
    let payload = "f1=a\tf2=1\nf1=b\tf2=2".repeat(10_000);

    Mock::given(method("POST"))
        .and(path("/v2/repos/r1/data"))
        .and(body_bytes(payload.clone().into_bytes()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::PostData.route(&["r1"]).unwrap();
    client
        .request(route)
        .reader(std::io::Cursor::new(payload.into_bytes()), content_type::TEXT)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_slow_reader_outlasting_response_timeout_completes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/repos/r1/data"))
        .and(body_bytes("k=v\n".repeat(8).into_bytes()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::new()
        .with_endpoint(server.uri())
        .with_access_key_secret_key("ak", "sk")
        .with_response_timeout(Duration::from_secs(1));
    let client = HttpClient::new(&config).unwrap();

    let (reader, mut writer) = tokio::io::duplex(64);
    let producer = tokio::spawn(async move {
        for _ in 0..8 {
            writer.write_all(b"k=v\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        writer.shutdown().await.unwrap();
    });

    let route = Operation::PostData.route(&["r1"]).unwrap();
    client
        .request(route)
        .reader(reader, content_type::TEXT)
        .send()
        .await
        .unwrap();
    producer.await.unwrap();
}

#[tokio::test]
async fn test_response_timeout_bounds_wait_for_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/groups"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = Config::new()
        .with_endpoint(server.uri())
        .with_access_key_secret_key("ak", "sk")
        .with_response_timeout(Duration::from_secs(1));
    let client = HttpClient::new(&config).unwrap();

    let route = Operation::ListGroups.route(&[]).unwrap();
    let err = client.request(route).send().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(t) if t == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_reader_body_with_md5_is_buffered() {
    let server = MockServer::start().await;
    let payload = b"plugin-from-reader".to_vec();

    Mock::given(method("POST"))
        .and(path("/v2/plugins/p2"))
        .and(header("Content-MD5", md5_base64(&payload).as_str()))
        .and(body_bytes(payload.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::UploadPlugin.route(&["p2"]).unwrap();
    client
        .request(route)
        .content_md5()
        .reader(std::io::Cursor::new(payload), content_type::JAR)
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_body_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/repos/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("X-Reqid", "req-123")
                .set_body_json(json!({"error": "E18102: repo not exists"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::GetRepo.route(&["missing"]).unwrap();
    let err = client.request(route).send().await.unwrap_err();

    let req_err = match err {
        Error::Request(e) => e,
        other => panic!("expected request error, got {other:?}"),
    };
    assert_eq!(req_err.kind, ErrorKind::NotFound);
    assert_eq!(req_err.status, 404);
    assert_eq!(req_err.code.as_deref(), Some("E18102"));
    assert_eq!(req_err.message, "repo not exists");
    assert_eq!(req_err.request_id.as_deref(), Some("req-123"));
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::ListGroups.route(&[]).unwrap();
    let err = client.request(route).send().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_undecodable_success_body_is_encoding_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::ListGroups.route(&[]).unwrap();
    let err = client
        .request(route)
        .send_json::<serde_json::Value>()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_no_retry_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let route = Operation::DeleteRepo.route(&["r1"]).unwrap();
    let err = client.request(route).send().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Server));
}
