use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::dto::{CreateTodo, UpdateTodo};
use crate::{resource::Resource, response::ApiError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[async_trait]
impl Resource for Todo {
    const NAME: &'static str = "Todo";

    type Row = Todo;
    type Create = CreateTodo;
    type Update = UpdateTodo;

    // The dangling-user_id case is the store's to reject; no pre-check here
    async fn create(db: &PgPool, input: CreateTodo) -> Result<Todo, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.title)
        .fetch_one(db)
        .await?;
        Ok(todo)
    }

    async fn list(db: &PgPool) -> Result<Vec<Todo>, ApiError> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, completed, created_at, updated_at
            FROM todos
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    async fn get(db: &PgPool, id: i32) -> Result<Option<Todo>, ApiError> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, completed, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    async fn update(db: &PgPool, id: i32, input: UpdateTodo) -> Result<Option<Todo>, ApiError> {
        let row = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    async fn delete(db: &PgPool, id: i32) -> Result<u64, ApiError> {
        let done = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(done.rows_affected())
    }
}
