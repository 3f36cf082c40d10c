use std::collections::BTreeSet;

use auth::AccessPolicy;
use auth::RequireMode;
use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the validated token identity through the request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub roles: BTreeSet<Role>,
}

impl CurrentUser {
    /// Enforce an endpoint's role requirement.
    ///
    /// The token was already validated upstream; this only compares role
    /// sets. Denial is terminal for the request.
    pub fn require(&self, required: &[Role], mode: RequireMode) -> Result<(), ApiError> {
        if AccessPolicy::allows(&self.roles, required, mode) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Insufficient role".to_string()))
        }
    }
}

/// Middleware that validates session tokens and adds the subject identity to
/// request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Extract token from Authorization header
    let token = extract_token_from_header(&req)?;

    // Validate signature and expiry; the client gets one opaque answer for
    // expired, tampered, and garbage tokens
    let claims = state
        .authenticator
        .validate_token(token, Utc::now())
        .map_err(|e| {
            tracing::warn!(error = %e, "Session token rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid or expired token"
                })),
            )
                .into_response()
        })?;

    // Add authenticated identity to request extensions
    req.extensions_mut().insert(CurrentUser {
        email: claims.sub,
        roles: claims.roles,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing Authorization header"
                })),
            )
                .into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid Authorization header"
            })),
        )
            .into_response()
    })?;

    if !auth_str.starts_with("Bearer ") {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid Authorization header format. Expected: Bearer <token>"
            })),
        )
            .into_response());
    }

    Ok(auth_str.trim_start_matches("Bearer "))
}
