//! Database module: row models, schema and the SQLite-backed store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for bootstrapping an empty database (SQLite)
//! - `sqlite.rs`: `PortfolioStore`, the data access handle injected into handlers

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Message, Project, Skill};
pub use schema::SQLITE_INIT;
pub use sqlite::{PortfolioStore, SqlitePool};
