use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use tinsel_types::api::Claims;
use tinsel_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;

/// Extract and validate the JWT from the Authorization header, making the
/// claims available to handlers as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_bearer(req.headers(), &state.jwt_secret)
        .ok_or_else(|| ApiError::Unauthorized("Please log in first!".into()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but for the parent administration routes: any
/// missing, invalid, or non-parent token gets the same rejection.
pub async fn require_parent_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_bearer(req.headers(), &state.jwt_secret)
        .filter(|c| c.role == Role::Parent)
        .ok_or_else(|| ApiError::Unauthorized("Parent login required".into()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Decode a `Bearer` token into claims. Returns None on any failure —
/// missing header, malformed token, bad signature, or expiry.
pub fn verify_bearer(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
