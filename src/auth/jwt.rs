use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

/// Sign any claim set the way the backend does (HS256).
#[cfg(test)]
pub(crate) fn sign_for_test(claims: &serde_json::Value, secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[cfg(test)]
pub(crate) fn issue_for_test(sub: &str, role: Option<u8>, secret: &str, ttl_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    let mut claims = serde_json::json!({"sub": sub, "exp": exp});
    if let Some(role) = role {
        claims["role"] = role.into();
    }
    sign_for_test(&claims, secret)
}
