use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::{env, fmt};
use uuid::Uuid;

pub mod middleware;

#[derive(Debug)]
pub enum AuthError {
    JWT(jsonwebtoken::errors::Error),
    InvalidToken,
    TokenExpired,
    InvalidSignature,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JWT(e) => write!(f, "JWT error: {}", e),
            Self::InvalidToken => write!(f, "Invalid token"),
            Self::TokenExpired => write!(f, "Token expired"),
            Self::InvalidSignature => write!(f, "Invalid signature"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JWT(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Validates a bearer token minted by the identity provider and
/// extracts the caller id from its subject claim. Token issuance
/// lives outside this service.
pub fn validate_jwt(token: &str) -> Result<Uuid, AuthError> {
    let secret = env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::JWT(e),
    })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::InvalidToken)
}
