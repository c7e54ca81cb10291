use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::dto::{CreateUser, UpdateUser};
use crate::{auth::password::hash_password, resource::Resource, response::ApiError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }
}

#[async_trait]
impl Resource for User {
    const NAME: &'static str = "User";

    type Row = User;
    type Create = CreateUser;
    type Update = UpdateUser;

    async fn create(db: &PgPool, input: CreateUser) -> Result<User, ApiError> {
        // Plaintext is hashed here and never persisted or logged
        let password_hash = match input.password.as_deref() {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, password_hash, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.role)
        .bind(&password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    async fn list(db: &PgPool) -> Result<Vec<User>, ApiError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at, updated_at
            FROM users
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    async fn get(db: &PgPool, id: i32) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    async fn update(db: &PgPool, id: i32, input: UpdateUser) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, email = $2, updated_at = now()
            WHERE id = $3
            RETURNING id, name, email, role, password_hash, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    async fn delete(db: &PgPool, id: i32) -> Result<u64, ApiError> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: 1,
            name: "Mila".into(),
            email: "mila@example.com".into(),
            role: Some("admin".into()),
            password_hash: Some("$argon2id$v=19$...".into()),
            created_at: datetime!(2024-01-01 00:00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00:00 UTC),
        };
        let text = serde_json::to_string(&user).expect("serialize");
        assert!(!text.contains("password"));
        assert!(!text.contains("argon2"));
        assert!(text.contains("mila@example.com"));
    }
}
