use std::collections::BTreeSet;

use async_trait::async_trait;
use auth::Role;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

fn map_user(row: &PgRow) -> Result<User, UserError> {
    let roles: Vec<String> = row.try_get("roles").map_err(to_database_error)?;
    let roles = roles
        .iter()
        .map(|role| role.parse::<Role>())
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(User {
        id: UserId(row.try_get("id").map_err(to_database_error)?),
        name: DisplayName::new(row.try_get("name").map_err(to_database_error)?)?,
        email: EmailAddress::new(row.try_get("email").map_err(to_database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(to_database_error)?,
        roles,
        active: row.try_get("active").map_err(to_database_error)?,
        created_at: row.try_get("created_at").map_err(to_database_error)?,
    })
}

fn roles_to_rows(user: &User) -> Vec<String> {
    user.roles.iter().map(|role| role.to_string()).collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, roles, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(roles_to_rows(&user))
        .bind(user.active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // The unique index is the backstop for concurrent
                // registrations racing past the existence check
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_email_key")
                {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, roles, active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_database_error)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, roles, active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(to_database_error)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(to_database_error)
    }

    async fn exists_by_id(&self, id: &UserId) -> Result<bool, UserError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)
            "#,
        )
        .bind(id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(to_database_error)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, roles, active, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(to_database_error)?;

        rows.iter().map(map_user).collect()
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, roles = $5, active = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(roles_to_rows(&user))
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_email_key")
                {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(to_database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
