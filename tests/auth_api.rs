//! HTTP-level tests for register / login and the bearer-token middlewares

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router, middleware};
use http_body_util::BodyExt; // for .collect().await
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot`

use market_auth::gateway::{build_router, state::AppState};
use market_auth::user_auth::{
    Argon2PasswordHasher, AuthService, AuthenticatedUser, Claims, MemoryCredentialStore,
    SigningSecret, TokenIssuer, admin_auth_middleware, jwt_auth_middleware,
};

const SECRET: &[u8] = b"integration-test-secret";
const TOKEN_PREFIX: &str = "User was logged in with token: ";

fn issuer() -> TokenIssuer {
    TokenIssuer::new(SigningSecret::from_bytes(SECRET).unwrap())
}

fn test_state(store: Arc<MemoryCredentialStore>) -> Arc<AppState> {
    let auth = AuthService::new(store, Arc::new(Argon2PasswordHasher::new()), issuer());
    Arc::new(AppState::new(Arc::new(auth)))
}

/// Gateway router plus two protected probe routes
fn test_app(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route(
            "/protected/me",
            get(|Extension(claims): Extension<Claims>| async move { claims.sub }),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let admin_routes = Router::new()
        .route(
            "/protected/admin",
            get(|Extension(user): Extension<AuthenticatedUser>| async move {
                format!("{}:{}", user.user_id, user.username)
            }),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    build_router(state).merge(user_routes).merge(admin_routes)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn creds(username: &str, password: &str) -> String {
    json!({ "username": username, "password": password }).to_string()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/register", creds(username, password)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/login", creds(username, password)))
        .await
        .unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

fn token_from(body: &str) -> &str {
    body.strip_prefix(TOKEN_PREFIX)
        .unwrap_or_else(|| panic!("unexpected login body: {}", body))
}

#[tokio::test]
async fn test_register_login_flow() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));

    let (status, body) = register(&app, "alice", "p@ss").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, "User was registered");

    let (status, body) = register(&app, "alice", "p@ss").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username already exists\n");
    assert_eq!(store.user_count(), 1);

    let (status, body) = login(&app, "alice", "p@ss").await;
    assert_eq!(status, StatusCode::OK);
    let token = token_from(&body);

    let claims = issuer().verify_token(token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.exp - claims.iat, 3600);

    let alice = store.user("alice").unwrap();
    assert_ne!(alice.password_hash, "p@ss");
    assert!(alice.password_hash.starts_with("$argon2"));
    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].user_id, alice.user_id);
    assert_eq!(sessions[0].token, token);
}

#[tokio::test]
async fn test_login_rejections_are_indistinguishable() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));
    register(&app, "alice", "p@ss").await;

    let (wrong_status, wrong_body) = login(&app, "alice", "wrong").await;
    let (unknown_status, unknown_body) = login(&app, "nobody", "p@ss").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, "Invalid username or password\n");
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
    assert!(store.sessions().is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));

    for uri in ["/api/v1/register", "/api/v1/login"] {
        let response = app
            .clone()
            .oneshot(post_json(uri, "{not json".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
    assert_eq!(store.user_count(), 0);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));

    let (status, _) = register(&app, "", "p@ss").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/register",
            json!({ "username": "bob" }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.user_count(), 0);
}

#[tokio::test]
async fn test_concurrent_register_creates_one_user() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));

    let (a, b) = tokio::join!(
        register(&app, "carol", "first"),
        register(&app, "carol", "second"),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(store.user_count(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app(test_state(Arc::new(MemoryCredentialStore::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["store"], "memory");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = test_app(test_state(Arc::new(MemoryCredentialStore::new())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(json["paths"]["/api/v1/register"].is_object());
    assert!(json["paths"]["/api/v1/login"].is_object());
}

#[tokio::test]
async fn test_jwt_middleware() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store));
    register(&app, "dave", "pw").await;
    let (_, body) = login(&app, "dave", "pw").await;
    let token = token_from(&body);

    let response = app
        .clone()
        .oneshot(get_with_token("/protected/me", token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "dave");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/protected/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let forged = TokenIssuer::new(SigningSecret::from_bytes("other-secret").unwrap())
        .create_token("dave")
        .unwrap();
    let response = app
        .oneshot(get_with_token("/protected/me", &forged))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_middleware() {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = test_app(test_state(store.clone()));

    register(&app, "root", "pw").await;
    register(&app, "erin", "pw").await;
    let root_id = store.user("root").unwrap().user_id;
    store.grant_admin(root_id).unwrap();

    let (_, body) = login(&app, "root", "pw").await;
    let root_token = token_from(&body).to_string();
    let (_, body) = login(&app, "erin", "pw").await;
    let erin_token = token_from(&body).to_string();

    let response = app
        .clone()
        .oneshot(get_with_token("/protected/admin", &root_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, format!("{}:root", root_id));

    // Logged in, but not an admin
    let response = app
        .clone()
        .oneshot(get_with_token("/protected/admin", &erin_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Validly signed but never saved as a session
    let unsaved = issuer()
        .create_token_at("root", chrono::Utc::now() - chrono::Duration::minutes(10))
        .unwrap();
    let response = app
        .oneshot(get_with_token("/protected/admin", &unsaved))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
