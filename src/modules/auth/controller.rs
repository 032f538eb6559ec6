use axum::{Json, extract::State, http::StatusCode};
use schoolhub_core::AppError;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = SignupResponse),
        (status = 400, description = "Malformed body or email already registered", body = ErrorResponse),
        (status = 403, description = "Admin role requested", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let response = AuthService::signup(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Account inactive or suspended", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}
