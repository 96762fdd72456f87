//! Authorization gate.
//!
//! Two middleware stages: [`require_auth`] verifies the bearer token and
//! attaches the [`Identity`] to the request; [`require_admin`] then checks the
//! attached identity for the admin role. The admin stage is always layered
//! inside the authenticated one.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use domain::{Identity, TokenService};

use crate::error::ApiError;

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let identity = tokens.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        ApiError::Unauthorized(err.to_string())
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Rejects requests whose attached identity is not an admin.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<Identity>() {
        Some(identity) if identity.is_admin => Ok(next.run(request).await),
        _ => Err(ApiError::Forbidden),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
