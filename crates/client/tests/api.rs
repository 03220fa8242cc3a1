use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use engine::{Filter, FilterCriteria, RenewalWindow};
use api_types::user::RegisterRequest;
use serde_json::{Value, json};
use tally_client::{
    ApiClient, ClientError, CollectionView, CredentialStore, MemoryStore, RouteDecision,
    SessionGuard, SessionState,
};

const GOOD_TOKEN: &str = "good-token";
const REVOKED_TOKEN: &str = "revoked-token";

type Reply = (StatusCode, Json<Value>);

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Authentication credentials were not provided." })),
    )
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {GOOD_TOKEN}").as_str())
}

async fn login(Json(body): Json<Value>) -> Reply {
    let identifier = body["identifier"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (identifier, password) {
        ("", _) | (_, "") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "identifier and password are required" })),
        ),
        ("alice" | "alice@example.com", "secret") => (
            StatusCode::OK,
            Json(json!({ "access": GOOD_TOKEN, "refresh": "refresh-token" })),
        ),
        ("mallory", "secret") => (StatusCode::OK, Json(json!({ "access": REVOKED_TOKEN }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        ),
    }
}

async fn logout(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "message": "logged out" })))
}

async fn me(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 1,
            "username": "alice",
            "email": "alice@example.com",
            "first_name": "Alice",
            "last_name": "Martin",
            "phone_number": null
        })),
    )
}

async fn groups(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "groups": [
                { "id": 1, "creator": 1, "name": "Family Budget", "created_at": "2024-03-20T10:00:00Z" },
                { "id": 2, "creator": 1, "name": "Savings Squad", "created_at": "2024-03-22T10:00:00Z" }
            ]
        })),
    )
}

async fn receipts(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "receipts": [
                {
                    "id": 10,
                    "merchant": "Corner Pharmacy",
                    "date": "2024-03-02",
                    "currency": "CAD",
                    "payment_method": "debit",
                    "items": [
                        { "id": 1, "name": "Vitamins", "category": "Health", "price": 12.5, "quantity": 1 }
                    ],
                    "total_amount": 14.13,
                    "tax": 1.63,
                    "tip": null,
                    "tax_rate": 0.13,
                    "tip_rate": null
                },
                {
                    "id": 11,
                    "merchant": null,
                    "date": "2024-03-05",
                    "items": [
                        { "id": 2, "name": "Jacket", "category": "Clothing", "price": 80.0, "quantity": 1 }
                    ],
                    "total_amount": 80.0
                },
                {
                    "id": 12,
                    "merchant": "Flea Market",
                    "date": "2024-03-06",
                    "currency": "",
                    "payment_method": "",
                    "items": [],
                    "total_amount": 3.0
                }
            ]
        })),
    )
}

async fn subscriptions(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "subscriptions": [
                {
                    "id": 5,
                    "user_id": 1,
                    "merchant": "Streamflix",
                    "total_amount": 15.99,
                    "currency": "USD",
                    "billing_period": "Monthly",
                    "renewal_date": "2999-01-01T00:00:00Z"
                }
            ]
        })),
    )
}

async fn register(Json(body): Json<Value>) -> Reply {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match username {
        _ if username.is_empty() || password.is_empty() => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Username and password are required" })),
        ),
        "alice" => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Username is already taken." })),
        ),
        _ => (
            StatusCode::CREATED,
            Json(json!({
                "message": "User registered successfully",
                "user": { "username": username }
            })),
        ),
    }
}

async fn garbled(headers: HeaderMap) -> Reply {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "groups": "not a list" })))
}

async fn broken() -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database unavailable" })),
    )
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_api() -> SocketAddr {
    serve(
        Router::new()
            .route("/api/user/login/", post(login))
            .route("/api/user/register/", post(register))
            .route("/api/user/logout/", post(logout))
            .route("/api/user/me/", get(me))
            .route("/api/groups/", get(groups))
            .route("/api/receipts/", get(receipts))
            .route("/api/subscriptions/", get(broken)),
    )
    .await
}

async fn spawn_api_with_subscriptions() -> SocketAddr {
    serve(
        Router::new()
            .route("/api/user/login/", post(login))
            .route("/api/subscriptions/", get(subscriptions)),
    )
    .await
}

async fn spawn_garbled_api() -> SocketAddr {
    serve(
        Router::new()
            .route("/api/user/login/", post(login))
            .route("/api/groups/", get(garbled)),
    )
    .await
}

fn client_for(addr: SocketAddr) -> (ApiClient<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let guard = SessionGuard::new(Arc::clone(&store), false);
    let client = ApiClient::new(
        &format!("http://{addr}/api"),
        Duration::from_secs(5),
        guard,
    )
    .unwrap();
    (client, store)
}

#[tokio::test]
async fn login_then_fetch_groups() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);
    assert_eq!(client.guard().state(), SessionState::Anonymous);

    client.login("alice", "secret").await.unwrap();

    assert_eq!(client.guard().state(), SessionState::Authenticated);
    assert_eq!(store.get().map(|c| c.token), Some(GOOD_TOKEN.to_string()));
    assert_eq!(client.guard().guard_route("/groups"), RouteDecision::Allow);

    let groups = client.groups().await.unwrap();
    let mut view = CollectionView::new();
    let ticket = view.begin();
    assert!(view.complete(ticket, groups));

    let criteria = FilterCriteria::new().with_search_term("savings");
    let shown = engine::filter_groups(view.records(), &criteria);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].name, "Savings Squad");
}

#[tokio::test]
async fn login_accepts_email_identifier() {
    let addr = spawn_api().await;
    let (client, _store) = client_for(addr);
    client.login("alice@example.com", "secret").await.unwrap();
    let user = client.me().await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn wrong_password_leaves_session_anonymous() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);

    let err = client.login("alice", "nope").await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidCredentials));
    assert_eq!(
        err.user_message(),
        "Incorrect username or password. Please try again."
    );
    assert!(store.get().is_none());
    assert_eq!(client.guard().state(), SessionState::Anonymous);
}

#[tokio::test]
async fn missing_identifier_is_a_bad_request() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);

    let err = client.login("", "secret").await.unwrap_err();

    match err {
        ClientError::BadRequest(message) => {
            assert_eq!(message, "identifier and password are required");
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }
    assert!(store.get().is_none());
}

#[tokio::test]
async fn rejected_token_clears_session() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);
    client.login("mallory", "secret").await.unwrap();
    assert!(client.guard().is_authenticated());

    let err = client.groups().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(store.get().is_none());
    assert_eq!(client.guard().state(), SessionState::Anonymous);
    assert_eq!(
        client.guard().guard_route("/groups"),
        RouteDecision::Redirect("/login?from=%2Fgroups".to_string())
    );
}

#[tokio::test]
async fn anonymous_fetch_is_unauthorized() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);

    let err = client.receipts().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(store.get().is_none());
}

#[tokio::test]
async fn server_error_keeps_session() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);
    client.login("alice", "secret").await.unwrap();

    let err = client.subscriptions().await.unwrap_err();

    match &err {
        ClientError::Server { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Server, got {other:?}"),
    }
    assert_eq!(err.user_message(), "An error occurred. Please try again later.");
    assert!(store.get().is_some());
}

#[tokio::test]
async fn closed_port_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (client, store) = client_for(addr);

    let err = client.login("alice", "secret").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(
        err.user_message(),
        "Unable to connect to the server. Please check your internet connection."
    );
    assert!(store.get().is_none());
}

#[tokio::test]
async fn logout_clears_credential() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);
    client.login("alice", "secret").await.unwrap();

    client.logout().await.unwrap();

    assert!(store.get().is_none());
    assert_eq!(client.guard().state(), SessionState::Anonymous);
    // a second logout is a no-op
    client.logout().await.unwrap();
}

#[tokio::test]
async fn receipts_filter_by_category() {
    let addr = spawn_api().await;
    let (client, _store) = client_for(addr);
    client.login("alice", "secret").await.unwrap();

    let receipts = client.receipts().await.unwrap();
    assert_eq!(receipts.len(), 3);
    assert_eq!(receipts[1].merchant, None);
    assert_eq!(receipts[2].payment_method, None);
    assert_eq!(receipts[2].currency, None);

    let criteria = FilterCriteria::new().with_category(engine::parse_category("Clothing").unwrap());
    let shown = engine::filter_receipts(&receipts, &criteria);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].id, 11);
}

#[tokio::test]
async fn subscriptions_envelope_and_filters() {
    let addr = spawn_api_with_subscriptions().await;
    let (client, _store) = client_for(addr);
    client.login("alice", "secret").await.unwrap();

    let subscriptions = client.subscriptions().await.unwrap();
    assert_eq!(subscriptions.len(), 1);

    let any = FilterCriteria::new()
        .with_billing_period(Filter::All)
        .with_renewal_window(RenewalWindow::Any);
    assert_eq!(
        engine::filter_subscriptions(&subscriptions, &any, chrono::Utc::now()).len(),
        1
    );

    let this_year = any.with_renewal_window(RenewalWindow::WithinMonths(12));
    assert!(engine::filter_subscriptions(&subscriptions, &this_year, chrono::Utc::now()).is_empty());
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let addr = spawn_garbled_api().await;
    let (client, store) = client_for(addr);
    client.login("alice", "secret").await.unwrap();

    let err = client.groups().await.unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(
        err.user_message(),
        "The server sent an unexpected response. Please try again later."
    );
    assert!(store.get().is_some());
}

fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Bob".to_string(),
        last_name: "Tremblay".to_string(),
        password: "hunter22".to_string(),
    }
}

#[tokio::test]
async fn register_returns_username_without_logging_in() {
    let addr = spawn_api().await;
    let (client, store) = client_for(addr);

    let username = client.register(&registration("bob")).await.unwrap();

    assert_eq!(username, "bob");
    assert!(store.get().is_none());
    assert_eq!(client.guard().state(), SessionState::Anonymous);
}

#[tokio::test]
async fn taken_username_is_a_conflict() {
    let addr = spawn_api().await;
    let (client, _store) = client_for(addr);

    let err = client.register(&registration("alice")).await.unwrap_err();

    match &err {
        ClientError::Conflict(message) => assert_eq!(message, "Username is already taken."),
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Username is already taken.");
}

#[tokio::test]
async fn incomplete_registration_is_a_bad_request() {
    let addr = spawn_api().await;
    let (client, _store) = client_for(addr);
    let mut request = registration("carol");
    request.password.clear();

    let err = client.register(&request).await.unwrap_err();

    assert!(matches!(err, ClientError::BadRequest(_)));
}
