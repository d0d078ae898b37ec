//! Actix-web extractor for bearer-token authentication.
//!
//! This is the single authentication path for every protected route: extract
//! `Authorization: Bearer <token>`, verify the signature, then load the user
//! row so deleted accounts are rejected even while their tokens are unexpired.

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::auth::verify_token;
use crate::config::Config;
use crate::db::{DbPool, users};
use crate::entity::user;
use crate::error::ErrorResponse;

/// Authentication error for the extractor. Always maps to 401.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl AuthError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid bearer token.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: AuthUser) -> impl Responder {
///     // auth.user is the authenticated user's row
/// }
/// ```
pub struct AuthUser {
    pub user: user::Model,
}

impl AuthUser {
    /// The authenticated user's id.
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let config = req
                .app_data::<web::Data<Config>>()
                .ok_or_else(|| AuthError::new("Internal configuration error"))?;

            let token = extract_bearer_token(&req)
                .ok_or_else(|| AuthError::new("Missing or invalid authorization header"))?;

            let claims = verify_token(&token, &config.jwt_secret)
                .map_err(|_| AuthError::new("Invalid token"))?;

            let user_id = Uuid::parse_str(&claims.user_id)
                .map_err(|_| AuthError::new("Invalid token"))?;

            // The database is only touched once the token itself checks out
            let pool = req
                .app_data::<web::Data<DbPool>>()
                .ok_or_else(|| AuthError::new("Internal configuration error"))?;

            let user = users::find_by_id(pool.connection(), user_id)
                .await
                .map_err(|e| {
                    tracing::error!("Auth lookup failed: {}", e);
                    AuthError::new("Authentication failed")
                })?
                .ok_or_else(|| AuthError::new("User not found"))?;

            Ok(AuthUser { user })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extract_bearer_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_rejects_missing_header() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(extract_bearer_token(&req), None);
    }

    #[test]
    fn test_extract_rejects_other_schemes() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req), None);
    }
}
