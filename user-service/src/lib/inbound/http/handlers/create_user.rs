use std::collections::BTreeSet;

use auth::RequireMode;
use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::NameError;

pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<CreateUserResponseData>, ApiError> {
    current_user.require(&[Role::Admin], RequireMode::All)?;

    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    roles: Vec<String>,
    active: Option<bool>,
}

#[derive(Debug, Clone, Error)]
enum ParseCreateUserRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid role: {0}")]
    Role(#[from] auth::RoleError),
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ParseCreateUserRequestError> {
        let name = DisplayName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        let roles = self
            .roles
            .iter()
            .map(|role| role.parse::<Role>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(CreateUserCommand::new(
            name,
            email,
            self.password,
            roles,
            self.active,
        ))
    }
}

impl From<ParseCreateUserRequestError> for ApiError {
    fn from(err: ParseCreateUserRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserResponseData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for CreateUserResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            roles: user.roles.iter().map(|role| role.to_string()).collect(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}
