use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{
            hash_password, is_valid_email, is_valid_username, verify_password, AuthUser, JwtKeys,
        },
    },
    error::{AppError, AppResult},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn token_pair(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(mut payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() || payload.password.is_empty() || payload.email.is_empty() {
        return Err(AppError::invalid("Username, password, and email are required"));
    }
    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(AppError::invalid(
            "Username must be 3-50 characters of letters, digits, '_', '.' or '-'",
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::invalid("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::invalid("Password too short"));
    }

    if User::find_by_username(&state.db, &payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(token_pair(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(mut payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<AuthResponse>> {
    payload.username = payload.username.trim().to_string();
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(AppError::invalid("Username and password are required"));
    }

    let Some(user) = User::find_by_username(&state.db, &payload.username).await? else {
        warn!(username = %payload.username, "login unknown username");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(username = %payload.username, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(token_pair(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RefreshRequest>, AppError>,
) -> AppResult<Json<AuthResponse>> {
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

    let user = load_user(&state, claims.sub).await?;
    Ok(Json(token_pair(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(PublicUser::from(user)))
}

async fn load_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    User::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject no longer exists");
        AppError::Unauthorized("User not found".into())
    })
}
