#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use userdeck_api::types::{CreateUserBody, UpdateUserBody};
use userdeck_api::{ApiClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn user(id: &str, first: &str, active: bool) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": first,
        "lastName": "Doe",
        "email": format!("{}@example.com", first.to_lowercase()),
        "profileId": "p1",
        "isActive": active
    })
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_users_sends_page_and_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [user("u3", "Carla", true), user("u1", "Ana", false)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client.list_users(2, 10).await.unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["u3", "u1"]);
    assert!(!users[1].is_active);
}

#[tokio::test]
async fn test_list_users_by_profiles_sends_csv() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users/filter/by-profiles"))
        .and(query_param("profiles", "p1,p2"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client
        .list_users_by_profiles(&["p1".into(), "p2".into()], 1, 5)
        .await
        .unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_list_profiles_accepts_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "admin" },
            { "id": "p2", "name": "user" }
        ])))
        .mount(&server)
        .await;

    let profiles = client.list_profiles().await.unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].name, "admin");
}

#[tokio::test]
async fn test_base_url_prefix_is_preserved() {
    let server = MockServer::start().await;
    let client =
        ApiClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user("u1", "Ana", true)))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client.get_user("u1").await.unwrap();
    assert_eq!(fetched.first_name, "Ana");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_user_posts_body_without_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({
            "firstName": "Ana",
            "lastName": "Doe",
            "email": "ana@example.com",
            "profileId": "p1",
            "isActive": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": user("u9", "Ana", true)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_user(&CreateUserBody {
            first_name: "Ana".into(),
            last_name: "Doe".into(),
            email: "ana@example.com".into(),
            profile_id: Some("p1".into()),
            is_active: true,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "u9");
}

#[tokio::test]
async fn test_update_user_unwraps_user_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/users/u1"))
        .and(body_json(json!({ "firstName": "Bia" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user("u1", "Bia", true)
        })))
        .mount(&server)
        .await;

    let updated = client
        .update_user(
            "u1",
            &UpdateUserBody {
                first_name: Some("Bia".into()),
                ..UpdateUserBody::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Bia");
}

#[tokio::test]
async fn test_set_user_status_sends_flag() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/users/u1/status"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.set_user_status("u1", false).await.unwrap();
}

#[tokio::test]
async fn test_delete_twice_yields_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/u1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "User not found" })),
        )
        .mount(&server)
        .await;

    client.delete_user("u1").await.unwrap();
    let err = client.delete_user("u1").await.unwrap_err();
    assert!(err.is_not_found(), "expected 404, got: {err:?}");
    assert!(err.to_string().contains("User not found"));
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_messages_are_joined() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": ["email must be an email"],
            "statusCode": 400
        })))
        .mount(&server)
        .await;

    let err = client
        .create_user(&CreateUserBody {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "nope".into(),
            profile_id: None,
            is_active: true,
        })
        .await
        .unwrap_err();

    match err {
        Error::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "email must be an email");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.list_profiles().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, ref message } if message == "boom"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_users(1, 10).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(50));
    let client = ApiClient::new(&server.uri(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client.list_profiles().await.unwrap_err();
    assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()));
    assert!(err.is_transient());
}
