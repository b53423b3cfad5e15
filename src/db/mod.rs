//! Database module: models, schema and the sqlx-backed storage handle.
//!
//! Layout:
//! - `models.rs`: row structs for `user` and `page`
//! - `schema.rs`: SQL DDL run at startup
//! - `sqlite.rs`: `Storage`, pool setup, seeding and bulk clearing
//! - `users.rs` / `pages.rs`: per-table queries
//! - `raw.rs`: unrestricted SQL execution for the diagnostic tools

pub mod models;
pub mod pages;
pub mod raw;
pub mod schema;
pub mod sqlite;
pub mod users;

pub use models::{Page, User};
pub use raw::RawQueryError;
pub use sqlite::Storage;
