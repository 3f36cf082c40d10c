use auth::RequireMode;
use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    current_user.require(&[Role::Admin, Role::User], RequireMode::Any)?;

    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| {
            let data: Vec<UserData> = users.iter().map(UserData::from).collect();
            ApiSuccess::new(StatusCode::OK, data)
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
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
