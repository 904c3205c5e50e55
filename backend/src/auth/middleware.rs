use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::validate_jwt;
use crate::error::ApiError;

/// Authenticated caller identity, inserted into request extensions by
/// `require_auth`. Handlers behind the middleware can rely on it.
#[derive(Clone, Copy)]
pub struct UserId(pub Uuid);

pub async fn require_auth(mut request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match auth_header {
        Some(token) => token.trim(),
        None => return Err(ApiError::Unauthenticated),
    };

    match validate_jwt(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(UserId(user_id));
            Ok(next.run(request).await)
        }
        Err(_) => Err(ApiError::Unauthenticated),
    }
}
