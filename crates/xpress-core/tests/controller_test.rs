// Controller tests against a wiremock backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xpress_core::store::now_ms;
use xpress_core::{
    AuthMode, Command, ControllerConfig, Controller, CoreError, Invalidation, MemorySessionStore,
    PersistedSession, RequestStatus, SessionStore, SessionUser,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn jwt(claims: serde_json::Value) -> String {
    format!(
        "eyJhbGciOiJub25lIn0.{}.sig",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

fn config(server: &MockServer, auth: AuthMode) -> ControllerConfig {
    ControllerConfig::new(Url::parse(&server.uri()).unwrap(), auth)
}

fn identity(server: &MockServer) -> AuthMode {
    AuthMode::Identity {
        api_key: SecretString::from("test-key"),
        url: Some(format!("{}/v1", server.uri())),
    }
}

fn admin_session(token: &str) -> PersistedSession {
    PersistedSession {
        auth_token: token.into(),
        auth_expiry: now_ms() + 60_000,
        auth_user: Some(SessionUser {
            uid: "admin-1".into(),
            email: Some("admin@xpress.io".into()),
            role: "admin".into(),
        }),
    }
}

/// A controller already signed in as an admin with bearer `token`.
fn signed_in(server: &MockServer, token: &str) -> Controller {
    let sessions = Arc::new(MemorySessionStore::with_session(admin_session(token)));
    Controller::new(config(server, AuthMode::Backend), sessions).unwrap()
}

async fn mount_identity_sign_in(server: &MockServer, role: Option<&str>) {
    let mut claims = json!({ "email": "someone@xpress.io", "user_id": "uid-9" });
    if let Some(role) = role {
        claims["role"] = json!(role);
    }
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": jwt(claims),
            "localId": "uid-9",
            "email": "someone@xpress.io",
            "expiresIn": "3600"
        })))
        .mount(server)
        .await;
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_identity_admin_login_is_persisted() {
    let server = MockServer::start().await;
    mount_identity_sign_in(&server, Some("admin")).await;

    let sessions = Arc::new(MemorySessionStore::new());
    let ctrl = Controller::new(config(&server, identity(&server)), sessions.clone()).unwrap();

    let session = ctrl.login("someone@xpress.io", "pw").await.unwrap();
    assert!(session.is_admin());
    assert!(ctrl.require_admin().is_ok());

    let saved = sessions.load().unwrap().unwrap();
    assert_eq!(saved.auth_user.unwrap().uid, "uid-9");
    let lifetime = saved.auth_expiry - now_ms();
    assert!(lifetime > 3_500_000 && lifetime <= 3_600_000);
}

#[tokio::test]
async fn test_non_admin_login_is_refused_and_not_persisted() {
    let server = MockServer::start().await;
    mount_identity_sign_in(&server, None).await;

    let sessions = Arc::new(MemorySessionStore::new());
    let ctrl = Controller::new(config(&server, identity(&server)), sessions.clone()).unwrap();

    let err = ctrl.login("someone@xpress.io", "pw").await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { ref role } if role == "user"));

    let state = ctrl.store().state();
    assert_eq!(state.auth.status, RequestStatus::Failed);
    assert_eq!(state.auth.error.as_deref(), Some("You do not have admin access"));
    assert!(sessions.load().unwrap().is_none());
    assert!(ctrl.session().is_none());
}

#[tokio::test]
async fn test_wrong_password_records_login_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_PASSWORD" }
        })))
        .mount(&server)
        .await;

    let ctrl = Controller::new(
        config(&server, identity(&server)),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap();

    let err = ctrl.login("a@b.c", "nope").await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(
        ctrl.store().state().auth.error.as_deref(),
        Some("Failed to log in: Authentication failed: INVALID_PASSWORD")
    );
}

#[tokio::test]
async fn test_backend_login_uses_user_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "opaque-token",
            "user": { "uid": "a1", "email": "admin@xpress.io", "role": "admin" }
        })))
        .mount(&server)
        .await;

    let ctrl = Controller::new(
        config(&server, AuthMode::Backend),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap();

    let session = ctrl.login("admin@xpress.io", "pw").await.unwrap();
    assert_eq!(session.user.unwrap().uid, "a1");
}

#[tokio::test]
async fn test_provider_login_requires_identity_mode() {
    let server = MockServer::start().await;
    let ctrl = Controller::new(
        config(&server, AuthMode::Backend),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap();

    let err = ctrl.login_with_provider_token("google-token").await.unwrap_err();
    assert!(matches!(err, CoreError::Config { .. }));
}

#[tokio::test]
async fn test_logout_clears_storage() {
    let server = MockServer::start().await;
    let sessions = Arc::new(MemorySessionStore::with_session(admin_session("tok")));
    let ctrl = Controller::new(config(&server, AuthMode::Backend), sessions.clone()).unwrap();
    assert!(ctrl.session().is_some());

    ctrl.logout();
    assert!(ctrl.session().is_none());
    assert!(sessions.load().unwrap().is_none());
    assert!(matches!(ctrl.require_admin(), Err(CoreError::NotAuthenticated)));
}

// ── Data loading ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_products_resolves_vendor_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "001", "itemName": "Premium Brake Pads", "price": 89.99, "stock": 4, "vendorId": "v1" },
                { "id": "002", "itemName": "Engine Oil Filter", "price": 12.5, "stock": 40 }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("role", "vendor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "uid": "v1", "displayName": "Brake World" }]
        })))
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    assert!(ctrl.fetch_products().await.unwrap());
    let products = ctrl.products();

    assert_eq!(products[0].vendor_display(), "Brake World");
    assert_eq!(products[1].vendor_display(), "Unknown Vendor");
    assert_eq!(ctrl.products().len(), 2);
    assert_eq!(ctrl.store().state().products.status, RequestStatus::Succeeded);
}

#[tokio::test]
async fn test_vendor_lookup_failure_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "id": "001", "itemName": "Pads", "vendorName": "Legacy Co" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    assert!(ctrl.fetch_products().await.unwrap());
    assert_eq!(ctrl.products()[0].vendor_display(), "Legacy Co");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = signed_in(&server, "tok").product("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Product not found: nope");
}

#[tokio::test]
async fn test_failed_load_empties_vendors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    let err = ctrl.load_vendors().await.unwrap_err();
    assert!(matches!(err, CoreError::ServiceUnavailable { status: 502 }));

    let snap = ctrl.vendors().snapshot();
    assert!(snap.data.is_empty());
    assert!(!snap.loading);
    assert_eq!(snap.error.as_deref(), Some("Service unavailable (HTTP 502)"));
}

#[tokio::test]
async fn test_superseded_vendor_load_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [{ "id": "old", "name": "Old" }] }))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [{ "id": "new", "name": "New" }] })),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    let slow = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.load_vendors().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(ctrl.load_vendors().await.unwrap());
    assert!(!slow.await.unwrap().unwrap());

    let ids: Vec<String> = ctrl.vendors().data().iter().map(|v| v.id.clone()).collect();
    assert_eq!(ids, vec!["new".to_owned()]);
}

#[tokio::test]
async fn test_superseded_catalog_fetch_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [{ "id": "1", "itemName": "Old Pads" }] }))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [{ "id": "2", "itemName": "New Pads" }] })),
        )
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    let slow = tokio::spawn({
        let ctrl = ctrl.clone();
        async move { ctrl.fetch_products().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(ctrl.fetch_products().await.unwrap());
    assert!(!slow.await.unwrap().unwrap());

    let names: Vec<String> = ctrl.products().iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, vec!["New Pads".to_owned()]);
    assert_eq!(ctrl.store().state().products.status, RequestStatus::Succeeded);
}

#[tokio::test]
async fn test_expired_session_token_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .mount(&server)
        .await;

    let session = PersistedSession {
        auth_expiry: now_ms() + 150,
        ..admin_session("tok")
    };
    let sessions = Arc::new(MemorySessionStore::with_session(session));
    let ctrl = Controller::new(config(&server, AuthMode::Backend), sessions.clone()).unwrap();
    assert!(ctrl.session().is_some());

    tokio::time::sleep(Duration::from_millis(300)).await;

    let err = ctrl.load_vendors().await.unwrap_err();
    assert!(matches!(err, CoreError::SessionExpired));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(sessions.load().unwrap().is_none());

    // Later reads go out without the stale bearer.
    assert!(ctrl.load_vendors().await.unwrap());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
    assert!(matches!(ctrl.require_admin(), Err(CoreError::NotAuthenticated)));
}

#[tokio::test]
async fn test_expired_session_blocks_catalog_and_commands() {
    let server = MockServer::start().await;
    let session = PersistedSession {
        auth_expiry: now_ms() + 100,
        ..admin_session("tok")
    };
    let ctrl = Controller::new(
        config(&server, AuthMode::Backend),
        Arc::new(MemorySessionStore::with_session(session)),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert!(matches!(
        ctrl.fetch_products().await,
        Err(CoreError::SessionExpired)
    ));
    assert!(matches!(
        ctrl.execute(Command::DeleteVendor { id: "v1".into() }).await,
        Err(CoreError::NotAuthenticated)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_category_without_slug_skips_fetch() {
    let server = MockServer::start().await;
    let ctrl = signed_in(&server, "tok");

    assert!(!ctrl.load_products_by_category(None).await.unwrap());
    assert!(ctrl.category_products().data().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_commands_require_a_session() {
    let server = MockServer::start().await;
    let ctrl = Controller::new(
        config(&server, AuthMode::Backend),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap();

    let err = ctrl
        .execute(Command::DeleteVendor { id: "v1".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotAuthenticated));
}

#[tokio::test]
async fn test_delete_product_updates_store_and_invalidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "id": "000" }, { "id": "001" }, { "id": "002" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/001"))
        .and(query_param("hardDelete", "true"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    ctrl.fetch_products().await.unwrap();
    let mut stale = ctrl.invalidations();

    ctrl.execute(Command::DeleteProduct {
        id: "001".into(),
        hard: true,
    })
    .await
    .unwrap();

    assert_eq!(stale.recv().await.unwrap(), Invalidation::Products);
    let ids: Vec<String> = ctrl.products().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["000".to_owned(), "002".to_owned()]);
}

#[tokio::test]
async fn test_assign_role_invalidates_users() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let ctrl = signed_in(&server, "tok");
    let mut stale = ctrl.invalidations();
    ctrl.execute(Command::AssignRole {
        uid: "u7".into(),
        role: xpress_core::Role::Vendor,
    })
    .await
    .unwrap();

    assert_eq!(stale.recv().await.unwrap(), Invalidation::Users);
}
