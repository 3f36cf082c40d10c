use std::collections::BTreeSet;

use auth::RequireMode;
use auth::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        // Validation happens here - errors are automatically converted via #[from]
        let name = self.name.map(DisplayName::new).transpose()?;

        let email = self.email.map(EmailAddress::new).transpose()?;

        let roles = self
            .roles
            .map(|roles| {
                roles
                    .iter()
                    .map(|role| role.parse::<Role>())
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;

        Ok(UpdateUserCommand {
            name,
            email,
            password: self.password,
            roles,
            active: self.active,
        })
    }
}

/// Response body for user operations
#[derive(Debug, Serialize, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            roles: user.roles.iter().map(|role| role.to_string()).collect(),
            active: user.active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserResponse>, ApiError> {
    current_user.require(&[Role::Admin], RequireMode::All)?;

    // Parse user ID and request at HTTP boundary - errors automatically converted
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user.into()))
}
