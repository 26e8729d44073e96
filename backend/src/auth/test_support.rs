use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use super::SessionClaims;

pub(crate) const SECRET: &str = "supersecretjwtsecretforunittesting123";

pub(crate) fn set_jwt_secret() {
    unsafe {
        std::env::set_var("JWT_SECRET", SECRET);
    }
}

/// `Authorization` header value for a session with the given role and tenant ids.
pub(crate) fn bearer(role: &str, doctor_id: Option<Uuid>, hospital_id: Option<Uuid>) -> String {
    set_jwt_secret();
    let claims = SessionClaims {
        sub: Uuid::new_v4().to_string(),
        role: role.to_string(),
        email: None,
        doctor_id,
        hospital_id,
        exp: 9999999999,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}
