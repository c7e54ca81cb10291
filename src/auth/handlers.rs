use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::LoginRequest,
        jwt::JwtKeys,
        password::verify_password,
    },
    response::{ApiError, Envelope},
    state::AppState,
    users::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = user.id, "login against user without a password");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role.as_deref().unwrap_or_default())?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(Envelope::ok("Login successful", json!({ "token": token }))).into_response())
}
