//! Authentication: password hashing and session token issuance.
//!
//! Passwords are hashed with bcrypt (cost 12). Session tokens are HS256 JWTs
//! whose signing secret lives in a `SecretString` so it is never logged and
//! is zeroized on drop.

mod extractor;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

pub use extractor::AuthUser;

use crate::error::{AppError, AppResult};
use crate::models::Claims;

/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "code-tutor";

/// bcrypt work factor. Matches the cost existing account hashes were
/// created with; changing it invalidates nothing but slows new hashes.
pub const BCRYPT_COST: u32 = 12;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> AppResult<String> {
    let hashed = bcrypt::hash(password, BCRYPT_COST)?;
    Ok(hashed)
}

/// Compare a candidate password against a stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let valid = bcrypt::verify(password, password_hash)?;
    Ok(valid)
}

/// Issue a signed session token for a user.
pub fn create_token(user_id: Uuid, secret: &SecretString, ttl_secs: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + chrono::Duration::seconds(ttl_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
}

/// Verify a session token and return its claims.
///
/// Rejects bad signatures, expired tokens and tokens from a different issuer.
pub fn verify_token(token: &str, secret: &SecretString) -> AppResult<Claims> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn secret() -> SecretString {
        SecretString::from("unit-test-secret")
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, &secret(), 3600).unwrap();

        let claims = verify_token(&token, &secret()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.iss, SESSION_ISSUER);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = create_token(Uuid::new_v4(), &secret(), 3600).unwrap();
        let result = verify_token(&token, &SecretString::from("some-other-secret"));
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expired well beyond the default validation leeway.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now - 7200,
            exp: now - 3600,
            user_id: Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(secret().expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(verify_token(&token, &secret()).is_err());
    }

    #[test]
    fn test_token_from_other_issuer_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 3600,
            user_id: Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(secret().expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(verify_token(&token, &secret()).is_err());
    }
}
