use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    pub user_id: i32,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodo {
    pub title: String,
}
