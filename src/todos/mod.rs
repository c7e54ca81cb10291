use axum::Router;

use crate::{resource, state::AppState};

mod dto;
pub mod repo;

pub use repo::Todo;

pub fn router() -> Router<AppState> {
    Router::new().nest("/todos", resource::crud_router::<Todo>())
}
