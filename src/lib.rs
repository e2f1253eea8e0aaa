//! Film catalog backend
//!
//! CRUD over films (with their title and cast) through REST at /rest and GraphQL at
//! /graphql, stored in SQLite.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
