use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser, SignupRequest},
        error::AuthError,
        extractors::{session_cookie, AuthUser},
        jwt::JwtKeys,
        services::{bounded, register, validate_signup},
    },
    state::AppState,
};

/// Routes mounted under `/api/auth`. `update-profile` and `check` go through
/// the [`AuthUser`] gate.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/update-profile", put(update_profile))
        .route("/check", get(check_auth))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::MalformedBody {
        status: e.status(),
        message: e.body_text(),
    })?;

    let signup = validate_signup(payload).inspect_err(|e| warn!(error = %e, "signup rejected"))?;
    let user = register(&state, signup).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let cookie = session_cookie(&token, keys.ttl.as_secs(), state.config.cookie_secure);
    let cookie = HeaderValue::from_str(&cookie).map_err(anyhow::Error::from)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

pub async fn login() -> &'static str {
    "login route"
}

pub async fn logout() -> &'static str {
    "logout route"
}

#[instrument]
pub async fn update_profile(AuthUser(user_id): AuthUser) -> AuthError {
    info!(%user_id, "profile update requested");
    AuthError::NotImplemented
}

#[instrument(skip(state))]
pub async fn check_auth(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = bounded(
        state.config.store_timeout,
        "user lookup",
        state.users.find_by_id(user_id),
    )
    .await?
    .ok_or_else(|| {
        warn!(%user_id, "token for unknown user");
        AuthError::Unauthorized("User not found")
    })?;

    Ok(Json(PublicUser::from(user)))
}
