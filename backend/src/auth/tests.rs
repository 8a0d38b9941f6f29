use super::*;
use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
use tower::ServiceExt;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn keys() -> JwtKeys {
    JwtKeys::new(SECRET, 168)
}

fn token_with(secret: &str, sub: &str, role: &str, exp: usize) -> String {
    let claims = SessionClaims {
        sub: sub.to_string(),
        role: role.to_string(),
        email: "test@example.com".to_string(),
        iat: 0,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn issued_token_validates() {
    let keys = keys();
    let user_id = Uuid::new_v4();

    let token = keys.issue(user_id, UserRole::Owner, "owner@example.com").unwrap();
    let user = keys.validate(&token).expect("Valid token should pass");

    assert_eq!(user.user_id, user_id);
    assert_eq!(user.role, UserRole::Owner);
    assert_eq!(user.email, "owner@example.com");
}

#[test]
fn expired_token_is_rejected() {
    let token = token_with(SECRET, "123e4567-e89b-12d3-a456-426614174000", "traveller", 1);
    assert!(matches!(keys().validate(&token), Err(AppError::Unauthorized(_))));
}

#[test]
fn wrong_signature_is_rejected() {
    let token = token_with(
        "wrongsecret",
        "123e4567-e89b-12d3-a456-426614174000",
        "traveller",
        9_999_999_999,
    );
    assert!(keys().validate(&token).is_err());
}

#[test]
fn non_uuid_subject_is_rejected() {
    let token = token_with(SECRET, "not-a-uuid", "traveller", 9_999_999_999);
    assert!(keys().validate(&token).is_err());
}

#[test]
fn unknown_role_is_rejected() {
    let token = token_with(
        SECRET,
        "123e4567-e89b-12d3-a456-426614174000",
        "admin",
        9_999_999_999,
    );
    assert!(keys().validate(&token).is_err());
}

async fn whoami(user: AuthUser) -> String {
    user.user_id.to_string()
}

fn app() -> Router {
    Router::new()
        .route("/me", get(whoami))
        .layer(Extension(Arc::new(keys())))
}

#[tokio::test]
async fn extractor_requires_bearer_header() {
    let response = app()
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(AUTHORIZATION, "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn extractor_accepts_issued_token() {
    let user_id = Uuid::new_v4();
    let token = keys().issue(user_id, UserRole::Traveller, "t@example.com").unwrap();

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes, user_id.to_string().as_bytes());
}
