//! REST API module.
//!
//! Public note routes, feedback, and the admin moderation routes.

mod admin;
mod feedback;
pub mod lenient;
mod notes;

pub use admin::*;
pub use feedback::*;
pub use notes::*;

use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Request},
    http::header,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// Acknowledgment returned by write routes.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Response type for every handler.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Request body accepted as JSON or as an urlencoded form.
///
/// An empty body deserializes like `{}`.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            return Ok(Self(value));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(serde_json::from_slice(b"{}")?));
        }

        Ok(Self(serde_json::from_slice(&bytes)?))
    }
}
