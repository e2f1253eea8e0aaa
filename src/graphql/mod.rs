//! GraphQL API for the film catalog
//!
//! Queries and mutations live in domain modules under `queries/` and `mutations/`, each a
//! `#[derive(Default)]` struct with an `#[Object]` impl, merged into the roots in
//! `schema.rs`.

mod errors;
mod handlers;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use handlers::router;
pub use schema::{FilmSchema, MutationRoot, QueryRoot, build_schema};
