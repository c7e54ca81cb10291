use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tracing::instrument;

use crate::{
    response::{ApiError, Envelope},
    state::AppState,
};

/// One CRUD-capable entity. Each operation is exactly one store round-trip;
/// store errors propagate unmodified.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Singular display name used in response messages ("User", "Todo").
    const NAME: &'static str;

    type Row: Serialize + Send;
    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    async fn create(db: &PgPool, input: Self::Create) -> Result<Self::Row, ApiError>;
    async fn list(db: &PgPool) -> Result<Vec<Self::Row>, ApiError>;
    async fn get(db: &PgPool, id: i32) -> Result<Option<Self::Row>, ApiError>;
    async fn update(db: &PgPool, id: i32, input: Self::Update)
        -> Result<Option<Self::Row>, ApiError>;
    /// Returns the affected-row count; 0 means the id did not exist.
    async fn delete(db: &PgPool, id: i32) -> Result<u64, ApiError>;
}

/// The five method+path bindings shared by every resource.
pub fn crud_router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", post(create::<R>).get(list::<R>))
        .route(
            "/:id",
            get(get_by_id::<R>).put(update::<R>).delete(remove::<R>),
        )
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(input): Json<R::Create>,
) -> Result<Response, ApiError> {
    let row = R::create(&state.db, input).await?;
    let envelope = Envelope::ok(
        format!("{} created successfully", R::NAME),
        serde_json::to_value(row)?,
    );
    Ok((StatusCode::CREATED, Json(envelope)).into_response())
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn list<R: Resource>(State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = R::list(&state.db).await?;
    let envelope = Envelope::ok(
        format!("{}s fetched successfully", R::NAME),
        serde_json::to_value(rows)?,
    );
    Ok(Json(envelope).into_response())
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn get_by_id<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    match R::get(&state.db, id).await? {
        Some(row) => {
            let envelope = Envelope::ok(
                format!("{} fetched successfully", R::NAME),
                serde_json::to_value(row)?,
            );
            Ok(Json(envelope).into_response())
        }
        None => Err(ApiError::NotFound(R::NAME)),
    }
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<R::Update>,
) -> Result<Response, ApiError> {
    match R::update(&state.db, id, input).await? {
        Some(row) => {
            let envelope = Envelope::ok(
                format!("{} updated successfully", R::NAME),
                serde_json::to_value(row)?,
            );
            Ok(Json(envelope).into_response())
        }
        None => Err(ApiError::NotFound(R::NAME)),
    }
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let affected = R::delete(&state.db, id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(R::NAME));
    }
    let envelope = Envelope::ok(
        format!("{} deleted successfully", R::NAME),
        serde_json::Value::Null,
    );
    Ok(Json(envelope).into_response())
}
