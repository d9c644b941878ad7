use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::usermodel::{Caller, UserRole};

/// Claims issued by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    role: UserRole,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    if user_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::seconds(expires_in_seconds)).timestamp() as usize;
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role: Some(role.to_str().to_string()),
        iat,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

/// Verifies signature and expiry, then maps the claims onto a `Caller`.
pub fn decode_identity<T: Into<String>>(token: T, secret: &[u8]) -> Result<Caller, jsonwebtoken::errors::Error> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;

    if decoded.claims.sub.trim().is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    Ok(Caller::new(
        decoded.claims.sub,
        UserRole::from_claim(decoded.claims.role.as_deref()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"identity-secret";

    #[test]
    fn test_round_trip_keeps_role() {
        let token = create_token("rev_1", UserRole::Reviewer, SECRET, 60).unwrap();
        let caller = decode_identity(token, SECRET).unwrap();
        assert_eq!(caller, Caller::new("rev_1", UserRole::Reviewer));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("rev_1", UserRole::Admin, SECRET, 60).unwrap();
        assert!(decode_identity(token, b"other-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_token("rev_1", UserRole::Admin, SECRET, -3600).unwrap();
        assert!(decode_identity(token, SECRET).is_err());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        assert!(create_token("", UserRole::Admin, SECRET, 60).is_err());
    }
}
