use auth::RequireMode;
use auth::Role;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<GetUserResponseData>, ApiError> {
    current_user.require(&[Role::Admin, Role::User], RequireMode::Any)?;

    let user_id = UserId::from_string(&user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .user_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetUserResponseData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for GetUserResponseData {
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
