use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // An unparseable email cannot belong to any account; answer exactly as
    // for a failed password check
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let session = state
        .user_service
        .login(Credentials {
            email,
            password: body.password,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(StatusCode::OK, (&session).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&AuthSession> for LoginResponseData {
    fn from(session: &AuthSession) -> Self {
        Self {
            token: session.token.clone(),
            name: session.user.name.as_str().to_string(),
            email: session.user.email.as_str().to_string(),
            role: session.user.primary_role().to_string(),
        }
    }
}
