//! `Path` and `Form` wrappers that reject with [`AppError`], so malformed ids
//! and bodies get the same JSON error shape as everything else.

use axum::body::Body;
use axum::extract::{Form, FromRequest, FromRequestParts, Path};
use axum::http::Request;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::{AppError, AppState};

pub struct ApiPath<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}

pub struct ApiForm<T>(pub T);

impl<T> FromRequest<AppState> for ApiForm<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &AppState) -> Result<Self, AppError> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}
