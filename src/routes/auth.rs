// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Username/password authentication routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::User;
use crate::routes::api::UserResponse;
use crate::routes::validate_body;
use crate::services::password::{hash_password, verify_password};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 20, message = "Username must be 1-20 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(url(message = "Invalid image URL"))]
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SignupRequest {
    /// Trim the username and treat a blank avatar URL as absent.
    fn normalize(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.image_url = self.image_url.filter(|u| !u.trim().is_empty());
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session issued on signup or login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Attach the session cookie alongside the token in the body.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(30))
        .build()
}

/// Argon2 is CPU-bound, keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.into()))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verify task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.into()))
}

/// Create an account and start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let body = body.normalize();
    validate_body(&body)?;

    let password_hash = hash_blocking(body.password).await?;
    let user = User::new(body.username, body.email, password_hash, body.image_url);

    state.db.create_user(&user).await?;

    let token = create_jwt(user.id, &state.config.jwt_signing_key)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token.clone())),
        Json(SessionResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Check credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    validate_body(&body)?;

    let Some(user) = state.db.find_user_by_username(body.username.trim()).await? else {
        tracing::info!(username = %body.username, "Login for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_blocking(body.password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(user.id, &state.config.jwt_signing_key)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(SessionResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Clear the session cookie. Bearer tokens simply expire.
async fn logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
    )
}
