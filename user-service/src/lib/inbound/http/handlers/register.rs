use std::collections::BTreeSet;

use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid role: {0}")]
    Role(#[from] auth::RoleError),
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<CreateUserCommand, ParseRegisterRequestError> {
        let name = DisplayName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        let roles = self
            .roles
            .iter()
            .map(|role| role.parse::<Role>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(CreateUserCommand::new(name, email, self.password, roles, None))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub token: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&AuthSession> for RegisterResponseData {
    fn from(session: &AuthSession) -> Self {
        Self {
            token: session.token.clone(),
            name: session.user.name.as_str().to_string(),
            email: session.user.email.as_str().to_string(),
            role: session.user.primary_role().to_string(),
        }
    }
}
