use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::{
    auth::gate::{AdminOnly, Gate},
    resource,
    response::ApiError,
    state::AppState,
};

mod dto;
pub mod repo;

pub use repo::User;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(resource::create::<User>).get(list_users))
        .route(
            "/users/:id",
            get(resource::get_by_id::<User>)
                .put(resource::update::<User>)
                .delete(resource::remove::<User>),
        )
}

/// Listing every user is the one privileged route; the gate runs first.
async fn list_users(
    _gate: Gate<AdminOnly>,
    state: State<AppState>,
) -> Result<Response, ApiError> {
    resource::list::<User>(state).await
}
