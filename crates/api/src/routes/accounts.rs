//! Registration and login. These are the only public business routes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::SubjectId;
use serde::{Deserialize, Serialize};
use store::Repository;

use super::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct RegisteredResponse {
    pub user_id: SubjectId,
}

/// POST /auth/login — exchange credentials for a bearer token.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/register — create a customer account.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register<R: Repository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let user_id = state.accounts.register(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(RegisteredResponse { user_id })))
}
