use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{AccountResponse, LoginPayload, LoginResponse, SignupPayload},
    error::{Error, Result},
    utils::token::issue_access_token,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created", body = Json<AccountResponse>),
        (status = 400, description = "Invalid payload or passwords do not match"),
        (status = 409, description = "Email already exists")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if !payload.passwords_match() {
        return Err(Error::BadRequest("Passwords do not match".to_string()));
    }

    let user = state
        .user_service
        .create_user(&payload.email, &payload.password, &payload.company_name)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session token issued", body = Json<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    if payload.validate().is_err() {
        return Err(Error::invalid_credentials());
    }

    let user = state
        .user_service
        .verify_user(&payload.email, &payload.password)
        .await?;
    let token = issue_access_token(user.id, &state.jwt_secret, state.token_ttl_hours)?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        account: AccountResponse::from(user),
    }))
}
