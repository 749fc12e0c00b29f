//! Admin secret guard.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::{
    body::{Body, Bytes},
    extract::{Form, FromRequest, Query, Request},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the admin secret.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Largest body the guard buffers while looking for a `password` field.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
struct PasswordField {
    #[serde(default)]
    password: Option<String>,
}

/// Admin authentication layer function that takes the configured secret as a parameter.
///
/// The candidate comes from the `x-admin-password` header, then the
/// `password` query parameter, then a `password` field in the body.
/// With no secret configured every request is refused.
pub async fn admin_auth_layer(
    expected_password: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_password else {
        tracing::warn!(path = %request.uri().path(), "Admin request refused: no admin password configured");
        return AppError::Unauthorized.into_response();
    };

    let from_header = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let from_query = || {
        Query::<PasswordField>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(field)| field.password)
    };

    let (candidate, request) = match from_header.or_else(from_query) {
        Some(candidate) => (Some(candidate), request),
        None => match password_from_body(request).await {
            Ok(found) => found,
            Err(response) => return response,
        },
    };

    match candidate {
        Some(candidate) if constant_time_compare(candidate.trim(), &expected) => {
            next.run(request).await
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Admin request refused: missing or invalid password");
            AppError::Unauthorized.into_response()
        }
    }
}

/// Buffer the body, look for a `password` field, and hand back a rebuilt request.
async fn password_from_body(request: Request) -> Result<(Option<String>, Request), Response> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| AppError::Validation("Request body too large".to_string()).into_response())?;

    let candidate = parse_password_field(&parts.headers, &bytes).await;
    Ok((candidate, Request::from_parts(parts, Body::from(bytes))))
}

async fn parse_password_field(headers: &HeaderMap, bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let field: PasswordField = if content_type.starts_with("application/x-www-form-urlencoded") {
        let probe = Request::builder()
            .method(Method::POST)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(bytes.clone()))
            .ok()?;
        Form::<PasswordField>::from_request(probe, &())
            .await
            .map(|Form(field)| field)
            .unwrap_or_default()
    } else {
        serde_json::from_slice(bytes).unwrap_or_default()
    };

    field.password
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}
