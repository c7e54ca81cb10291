use serde::Deserialize;

/// Create payload; role and password are the optional superset fields,
/// and a supplied password is hashed before it ever reaches the store.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// Full-field replace of the mutable columns.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
}
