//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it against the sessions
//! table, and injects `AuthContext` into request extensions for downstream
//! handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::auth::{self, TokenCheck};

/// Require a valid bearer token from a signed-in user.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let conn = ctx.open_db()?;
    let user = match auth::resolve_token(&conn, &token).map_err(ApiError::from)? {
        TokenCheck::Valid(user) => user,
        TokenCheck::Expired => return Err(ApiError::TokenExpired),
        TokenCheck::Unknown => return Err(ApiError::Unauthorized),
    };

    req.extensions_mut().insert(AuthContext::from_user(&user));
    Ok(next.run(req).await)
}
