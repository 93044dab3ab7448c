//! End-to-end pipeline behavior against a mock GraphQL server serving both
//! endpoints on distinct paths.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dash_auth::store::{ACCESS_TOKEN_KEYS, MemoryBackend, REFRESH_TOKEN_KEYS};
use dash_auth::{CredentialStore, KeyValueBackend, SessionEvent, SessionOptions};
use dash_client::{ClientError, Clients, HttpTransport, Transport};
use dash_core::{GraphqlRequest, TokenPair};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jwt(secs_from_now: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs_from_now;
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"user_1","exp":{exp}}}"#));
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

fn refresh_response(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": {"auth_refresh": {
            "access_token": access,
            "refresh_token": refresh,
            "expires": 900_000
        }}
    }))
}

fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}}))
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "errors": [{"message": "Token expired.", "extensions": {"code": "TOKEN_EXPIRED"}}]
    }))
}

struct Harness {
    server: MockServer,
    backend: MemoryBackend,
    clients: Clients,
}

async fn harness(pair: Option<TokenPair>) -> Harness {
    let server = MockServer::start().await;
    let backend = MemoryBackend::default();
    let store = CredentialStore::new(backend.clone());
    if let Some(pair) = pair {
        store.save(&pair).expect("seed store");
    }

    let http = reqwest::Client::new();
    let main: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        format!("{}/graphql", server.uri()),
        http.clone(),
    ));
    let system: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        format!("{}/graphql/system", server.uri()),
        http,
    ));
    let clients = Clients::new(
        main,
        system,
        Arc::new(store),
        SessionOptions {
            login_url: Some("https://admin.example.com/login".into()),
            ..SessionOptions::default()
        },
    );

    Harness {
        server,
        backend,
        clients,
    }
}

#[tokio::test]
async fn concurrent_unauthorized_on_both_endpoints_share_one_refresh() {
    let old = jwt(3600);
    let new = jwt(7200);
    let h = harness(Some(TokenPair::new(&old, "R1"))).await;

    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_refresh"))
        .respond_with(refresh_response(&new, "R2").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&h.server)
        .await;
    for endpoint in ["/graphql", "/graphql/system"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("authorization", format!("Bearer {new}").as_str()))
            .respond_with(ok_response())
            .expect(1)
            .mount(&h.server)
            .await;
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("authorization", format!("Bearer {old}").as_str()))
            .respond_with(unauthorized())
            .expect(1)
            .mount(&h.server)
            .await;
    }

    let request = GraphqlRequest::new("query Me { users_me { id } }");
    let (main, system) = tokio::join!(
        h.clients.main.execute(&request),
        h.clients.system.execute(&request),
    );

    assert_eq!(main.expect("main retried"), json!({"ok": true}));
    assert_eq!(system.expect("system retried"), json!({"ok": true}));
    assert_eq!(h.clients.session().coordinator().attempts(), 1);
}

#[tokio::test]
async fn near_expiry_token_is_renewed_before_sending() {
    let soon = jwt(10);
    let fresh = jwt(3600);
    let h = harness(Some(TokenPair::new(&soon, "R1"))).await;

    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_refresh"))
        .and(body_string_contains("R1"))
        .respond_with(refresh_response(&fresh, "R2"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", format!("Bearer {fresh}").as_str()))
        .respond_with(ok_response())
        .expect(1)
        .mount(&h.server)
        .await;

    h.clients
        .main
        .execute(&GraphqlRequest::new("{ ok }"))
        .await
        .expect("sent with renewed token");

    for key in ACCESS_TOKEN_KEYS {
        assert_eq!(h.backend.get(key).expect("read"), Some(fresh.clone()), "{key}");
    }
    for key in REFRESH_TOKEN_KEYS {
        assert_eq!(h.backend.get(key).expect("read"), Some("R2".to_string()), "{key}");
    }
}

#[tokio::test]
async fn unauthorized_after_refresh_is_terminal() {
    let h = harness(Some(TokenPair::new(jwt(3600), "R1"))).await;
    let mut events = h.clients.session().subscribe();

    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_refresh"))
        .respond_with(refresh_response(&jwt(7200), "R2"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&h.server)
        .await;

    let error = h
        .clients
        .main
        .execute(&GraphqlRequest::new("{ ok }"))
        .await
        .expect_err("terminal 401");

    assert!(matches!(error, ClientError::Unauthorized { retried: true }));
    assert_eq!(events.try_recv().ok(), Some(SessionEvent::Renewed { attempt: 1 }));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn rejected_refresh_clears_store_and_ends_session_once() {
    let h = harness(Some(TokenPair::new(jwt(3600), "R1"))).await;
    let mut events = h.clients.session().subscribe();

    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "errors": [{"message": "Invalid user credentials.",
                                "extensions": {"code": "INVALID_CREDENTIALS"}}]
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(unauthorized())
        .expect(3)
        .mount(&h.server)
        .await;

    let request = GraphqlRequest::new("{ ok }");
    let (a, b, c) = tokio::join!(
        h.clients.main.execute(&request),
        h.clients.main.execute(&request),
        h.clients.main.execute(&request),
    );
    for result in [a, b, c] {
        assert!(matches!(result, Err(ClientError::SessionEnded)));
    }

    assert!(h.backend.is_empty());
    assert_eq!(
        events.try_recv().ok(),
        Some(SessionEvent::Ended {
            attempt: 1,
            login_url: Some("https://admin.example.com/login".into()),
        })
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn graphql_errors_are_not_retried() {
    let h = harness(Some(TokenPair::new(jwt(3600), "R1"))).await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "You don't have permission to access this.",
                        "extensions": {"code": "FORBIDDEN"}}]
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .respond_with(refresh_response("unused", "unused"))
        .expect(0)
        .mount(&h.server)
        .await;

    let error = h
        .clients
        .main
        .execute(&GraphqlRequest::new("query Orders { orders { id } }"))
        .await
        .expect_err("forbidden");

    let ClientError::Graphql { operation, errors } = error else {
        panic!("expected GraphQL error, got {error:?}");
    };
    assert_eq!(operation, "Orders");
    assert_eq!(errors[0].code(), Some("FORBIDDEN"));
}

#[tokio::test]
async fn detached_store_sends_unauthenticated_and_never_refreshes() {
    let server = MockServer::start().await;
    let http = reqwest::Client::new();
    let clients = Clients::new(
        Arc::new(HttpTransport::new(format!("{}/graphql", server.uri()), http.clone())),
        Arc::new(HttpTransport::new(
            format!("{}/graphql/system", server.uri()),
            http,
        )),
        Arc::new(CredentialStore::new(dash_auth::store::DetachedBackend)),
        SessionOptions::default(),
    );

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .respond_with(ok_response())
        .expect(0)
        .mount(&server)
        .await;

    let error = clients
        .main
        .execute(&GraphqlRequest::new("{ ok }"))
        .await
        .expect_err("401");

    assert!(matches!(error, ClientError::Unauthorized { retried: false }));
    let received = server.received_requests().await.expect("recording enabled");
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn login_then_logout_round_trip() {
    let h = harness(None).await;

    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"auth_login": {
                "access_token": "A1", "refresh_token": "R1", "expires": 900_000
            }}
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql/system"))
        .and(body_string_contains("auth_logout"))
        .and(body_string_contains("R1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"auth_logout": true}})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let auth = h.clients.auth();
    auth.login("admin@example.com", "secret").await.expect("login");
    assert_eq!(
        h.clients.session().store().load_pair(),
        Some(TokenPair::new("A1", "R1"))
    );

    auth.logout().await.expect("logout");
    assert!(h.backend.is_empty());
}
