use advenchores_shared::api::{self, AUTH_COOKIE};
use advenchores_shared::jwt::{self, JwtClaims};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use super::extract::ApiForm;
use super::{AppError, AppState};
use crate::storage::models::User;

/// How many days of inactivity before a user session is considered expired.
const USER_SESSION_IDLE_DAYS: i64 = 14;
/// How many days before mandatory re-login for users.
const USER_TOKEN_TTL_DAYS: i64 = 30;

/// Authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthCtx {
    pub user_id: i32,
    pub username: String,
    pub jti: String,
}

impl From<JwtClaims> for AuthCtx {
    fn from(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.uid,
            username: claims.sub,
            jti: claims.jti,
        }
    }
}

/// Value of cookie `name` from the request's `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Bearer token from `Authorization`, falling back to the session cookie.
fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer
        .or_else(|| cookie_value(headers, AUTH_COOKIE))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || Err(AppError::unauthorized());
    let Some(token) = token_from_headers(req.headers()) else {
        return unauthorized();
    };

    let claims = match jwt::decode_and_verify(token, state.config.jwt_secret.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error=%e, "auth: jwt decode failed");
            return unauthorized();
        }
    };

    let cutoff = Utc::now() - Duration::days(USER_SESSION_IDLE_DAYS);
    match state
        .store
        .touch_session_with_cutoff(&claims.jti, cutoff.naive_utc())
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            warn!(
                jti = %claims.jti,
                username = %claims.sub,
                cutoff = %cutoff,
                idle_days = USER_SESSION_IDLE_DAYS,
                "auth: session missing or expired (last_used_at < cutoff)"
            );
            return unauthorized();
        }
        Err(e) => {
            error!(jti = %claims.jti, error=%e, "auth: touch_session_with_cutoff failed");
            return Err(AppError::internal(e));
        }
    }
    req.extensions_mut().insert(AuthCtx::from(claims));
    Ok(next.run(req).await)
}

pub async fn issue_jwt_for_user(state: &AppState, user: &User) -> Result<String, AppError> {
    let jti = uuid::Uuid::new_v4().to_string();
    let exp = (Utc::now() + Duration::days(USER_TOKEN_TTL_DAYS)).timestamp();
    let claims = JwtClaims {
        sub: user.username.clone(),
        uid: user.id,
        jti: jti.clone(),
        exp,
    };

    state
        .store
        .create_session(&jti, user.id)
        .await
        .map_err(|e| {
            error!(username = %user.username, error=%e, "login: create_session failed");
            AppError::internal(e)
        })?;
    let token = jwt::encode(&claims, state.config.jwt_secret.as_bytes()).map_err(|e| {
        error!(username = %user.username, error=%e, "login: jwt encode failed");
        AppError::internal(e)
    })?;
    Ok(token)
}

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE,
        token,
        USER_TOKEN_TTL_DAYS * 24 * 60 * 60
    )
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
}

fn with_cookie(mut resp: Response, cookie: String) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(&cookie).map_err(AppError::internal)?;
    resp.headers_mut().insert(header::SET_COOKIE, value);
    Ok(resp)
}

pub(super) async fn api_auth_register(
    State(state): State<AppState>,
    ApiForm(body): ApiForm<api::RegisterReq>,
) -> Result<(StatusCode, Json<api::UserDto>), AppError> {
    let username = body.username.trim();
    let email = body.email.trim();
    if username.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(AppError::bad_request(
            "username, email and password are required",
        ));
    }
    let password = body.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(AppError::internal)?
        .map_err(|e| {
            error!(username, error=%e, "register: bcrypt hash failed");
            AppError::internal(e)
        })?;
    let user = state
        .store
        .create_user(username, email, &password_hash, state.config.parent_pin())
        .await?;
    info!(user_id = user.id, username = %user.username, "register: account created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub(super) async fn api_auth_login(
    State(state): State<AppState>,
    ApiForm(body): ApiForm<api::AuthReq>,
) -> Result<Response, AppError> {
    let user = state
        .store
        .find_user_by_username(body.username.trim())
        .await?
        .ok_or_else(|| {
            warn!(username=%body.username, "login: unknown username");
            AppError::unauthorized()
        })?;
    let password_hash = user.password_hash.clone();
    let password = body.password;
    let valid = tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(AppError::internal)?
        .map_err(|e| {
            error!(username=%user.username, error=%e, "login: bcrypt verify failed");
            AppError::internal(e)
        })?;
    if !valid {
        warn!(username=%user.username, "login: invalid password");
        return Err(AppError::unauthorized());
    }
    let token = issue_jwt_for_user(&state, &user).await?;
    let cookie = session_cookie(&token);
    with_cookie(Json(api::AuthResp { token }).into_response(), cookie)
}

/// Drops the server-side session of a presented token and clears the cookie.
/// Succeeds whether or not a valid session was presented.
pub(super) async fn api_auth_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = token_from_headers(&headers)
        && let Ok(claims) = jwt::decode_and_verify(token, state.config.jwt_secret.as_bytes())
    {
        let removed = state.store.delete_session(&claims.jti).await?;
        info!(username = %claims.sub, removed, "logout");
    }
    with_cookie(StatusCode::NO_CONTENT.into_response(), expired_cookie())
}
