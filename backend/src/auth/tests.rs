use super::*;
use axum::http::Request;
use jsonwebtoken::{EncodingKey, Header, encode};
use super::test_support::{SECRET, set_jwt_secret as set_env_vars};

fn claims(role: &str, exp: usize) -> SessionClaims {
    SessionClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: role.to_string(),
        email: Some("doc@example.com".to_string()),
        doctor_id: Some(Uuid::parse_str("9b2d7f6e-1a3c-4e5f-8a9b-0c1d2e3f4a5b").unwrap()),
        hospital_id: None,
        exp,
    }
}

fn sign(claims: &SessionClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn parts_with_token(token: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/api/v1/subscriptions/summary");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    parts
}

#[test]
fn test_validate_session_jwt_success() {
    set_env_vars();
    let my_claims = claims("DOCTOR", 9999999999);

    let decoded = validate_session_jwt(&sign(&my_claims, SECRET)).expect("Valid token should pass");
    assert_eq!(decoded.sub, my_claims.sub);
    assert_eq!(decoded.doctor_id, my_claims.doctor_id);
}

#[test]
fn test_validate_session_jwt_expired() {
    set_env_vars();
    let result = validate_session_jwt(&sign(&claims("DOCTOR", 1), SECRET));
    assert!(result.is_err());
}

#[test]
fn test_validate_session_jwt_invalid_signature() {
    set_env_vars();
    let result = validate_session_jwt(&sign(&claims("DOCTOR", 9999999999), "wrongsecret"));
    assert!(result.is_err());
}

#[tokio::test]
async fn extractor_builds_tenant_identity_from_claims() {
    set_env_vars();
    let token = sign(&claims("doctor", 9999999999), SECRET);
    let mut parts = parts_with_token(Some(&token));

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    let identity = user.tenant_identity();

    assert_eq!(identity.role, Some(TenantRole::Doctor));
    assert!(identity.doctor_id.is_some());
    assert_eq!(identity.hospital_id, None);
}

#[tokio::test]
async fn unknown_role_is_kept_as_none() {
    set_env_vars();
    let token = sign(&claims("authenticated", 9999999999), SECRET);
    let mut parts = parts_with_token(Some(&token));

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.role, None);
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let mut parts = parts_with_token(None);

    let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_extractor_rejects_non_admin_roles() {
    set_env_vars();
    let token = sign(&claims("HOSPITAL_ADMIN", 9999999999), SECRET);
    let mut parts = parts_with_token(Some(&token));

    let err = AdminUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.0, StatusCode::FORBIDDEN);

    let token = sign(&claims("ADMIN", 9999999999), SECRET);
    let mut parts = parts_with_token(Some(&token));
    assert!(AdminUser::from_request_parts(&mut parts, &()).await.is_ok());
}
