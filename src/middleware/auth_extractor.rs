// src/middleware/auth_extractor.rs - bearer token -> acting user id
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::AppState;
use crate::error::FeedError;
use crate::models::user::JwtClaims;

/// Verified identity of the caller, taken from the `sub` claim.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    /// `name` claim, falling back to `email`
    pub display_name: Option<String>,
}

/// Shared secret of the auth service that issues HS256 tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, FeedError> {
        let data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| FeedError::Unauthorized(format!("invalid token ({})", e)))?;

        let claims = data.claims;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| FeedError::Unauthorized("token subject is not a user id".to_string()))?;
        let display_name = claims
            .name
            .or(claims.email)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(AuthenticatedUser {
            user_id,
            display_name,
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, FeedError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| FeedError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| FeedError::Unauthorized("invalid header format".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FeedError::Unauthorized("invalid auth header format".to_string()))
}

impl FromRequest for AuthenticatedUser {
    type Error = FeedError;
    type Future = Ready<Result<AuthenticatedUser, FeedError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(FeedError::Infrastructure(
                "application state not registered".to_string(),
            )));
        };

        let result = bearer_token(req).and_then(|token| state.tokens.verify(token));

        if let Err(e) = &result {
            log::debug!("auth rejected for {}: {}", req.path(), e);
        }
        ready(result)
    }
}
