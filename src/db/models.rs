use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Skill {
    pub id: i64,
    pub title: String,
    /// Relative path such as `uploads/1718000000000.png`.
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
}

/// Contact form submission. Written by the API, never read back over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
}
