//! Request signing tests
//!
//! Signs requests with a fixed RSA test key, verifies the signatures with the
//! matching public key, and checks the headers arrive at a mock server.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use isctl::intersight::auth::{CredentialProvider, KeyFileCredentials, SigningRequest};
use isctl::intersight::client::IntersightClient;
use isctl::Error;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ID: &str = "5f3c9e1a7564612d33a1b2c3/5f3c9e1a7564612d33a1b2c4/5f3c9e1a7564612d33a1b2c5";

fn key_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test_key.pem")
}

fn public_key() -> RsaPublicKey {
    let pem = std::fs::read_to_string(key_path()).unwrap();
    RsaPublicKey::from(&RsaPrivateKey::from_pkcs1_pem(&pem).unwrap())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).unwrap().to_str().unwrap()
}

/// Pull `name="value"` out of the Authorization header
fn auth_param<'a>(authorization: &'a str, name: &str) -> &'a str {
    let marker = format!("{}=\"", name);
    let start = authorization.find(&marker).unwrap() + marker.len();
    let end = start + authorization[start..].find('"').unwrap();
    &authorization[start..end]
}

#[test]
fn test_signature_verifies_with_public_key() {
    let credentials = KeyFileCredentials::from_file(KEY_ID, &key_path()).unwrap();
    let url = Url::parse("https://www.intersight.com/api/v1/compute/Blades/A1").unwrap();
    let body = br#"{"ManagementMode":"UCSM"}"#;

    let headers = credentials
        .sign(&SigningRequest {
            method: &Method::POST,
            url: &url,
            body,
        })
        .unwrap();

    let authorization = header(&headers, "authorization");
    assert!(authorization.starts_with("Signature "));
    assert_eq!(auth_param(authorization, "keyId"), KEY_ID);
    assert_eq!(auth_param(authorization, "algorithm"), "rsa-sha256");
    assert_eq!(
        auth_param(authorization, "headers"),
        "(request-target) date digest host"
    );

    let digest = header(&headers, "digest");
    assert_eq!(
        digest,
        format!("SHA-256={}", BASE64.encode(Sha256::digest(body)))
    );
    assert_eq!(header(&headers, "host"), "www.intersight.com");

    let signing_string = format!(
        "(request-target): post /api/v1/compute/Blades/A1\ndate: {}\ndigest: {}\nhost: www.intersight.com",
        header(&headers, "date"),
        digest
    );
    let signature_bytes = BASE64
        .decode(auth_param(authorization, "signature"))
        .unwrap();
    let signature = Signature::try_from(signature_bytes.as_slice()).unwrap();

    VerifyingKey::<Sha256>::new(public_key())
        .verify(signing_string.as_bytes(), &signature)
        .expect("signature should verify");
}

#[test]
fn test_signature_covers_the_body() {
    let credentials = KeyFileCredentials::from_file(KEY_ID, &key_path()).unwrap();
    let url = Url::parse("https://www.intersight.com/api/v1/compute/Blades/A1").unwrap();

    let sign = |body: &[u8]| {
        credentials
            .sign(&SigningRequest {
                method: &Method::POST,
                url: &url,
                body,
            })
            .unwrap()
    };

    let a = sign(br#"{"ManagementMode":"UCSM"}"#);
    let b = sign(br#"{"ManagementMode":"Intersight"}"#);
    assert_ne!(header(&a, "digest"), header(&b, "digest"));
}

#[test]
fn test_missing_key_file_is_credentials_error() {
    let err = KeyFileCredentials::from_file(KEY_ID, &PathBuf::from("/nonexistent/key.pem"))
        .unwrap_err();
    assert!(matches!(err, Error::Credentials(_)));
}

#[test]
fn test_pkcs8_key_is_accepted() {
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};

    let pem = std::fs::read_to_string(key_path()).unwrap();
    let key = RsaPrivateKey::from_pkcs1_pem(&pem).unwrap();
    let pkcs8 = key.to_pkcs8_pem(LineEnding::LF).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("SecretKey.txt");
    std::fs::write(&file, pkcs8.as_bytes()).unwrap();

    let credentials = KeyFileCredentials::from_file(KEY_ID, &file).unwrap();
    assert_eq!(credentials.api_key_id(), KEY_ID);
}

/// Signed headers reach the server on both reads and writes
#[tokio::test]
async fn test_signed_requests_reach_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ntp/Policies"))
        .and(header_exists("authorization"))
        .and(header_exists("digest"))
        .and(header_exists("date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Results": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ntp/Policies"))
        .and(header_exists("authorization"))
        .and(header_exists("digest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Moid": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = KeyFileCredentials::from_file(KEY_ID, &key_path()).unwrap();
    let client =
        IntersightClient::new(&format!("{}/api/v1", server.uri()), Arc::new(credentials)).unwrap();

    let listing = client.get("ntp/Policies").await.unwrap();
    assert_eq!(listing["Results"], json!([]));

    let created = client
        .post("ntp/Policies", &json!({"Name": "p"}))
        .await
        .unwrap();
    assert_eq!(created["Moid"], "new");
}
