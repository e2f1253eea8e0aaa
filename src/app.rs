//! Application state and HTTP router construction.
//!
//! Used by [main] and by the integration tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{FilmSchema, build_schema};
use crate::services::{
    FilmReadService, FilmWriteService, MailService, Mailer, QueryBuilder, SqlDialect,
};

/// Shared state for HTTP handlers (REST and GraphQL).
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub schema: FilmSchema,
    pub reader: Arc<FilmReadService>,
    pub writer: Arc<FilmWriteService>,
}

impl AppState {
    /// Wire the services on top of a connected database
    pub fn new(config: &Config, db: Database, mailer: Arc<dyn Mailer>) -> Self {
        let mail = MailService::new(mailer, config.mail_enabled);
        let reader = Arc::new(FilmReadService::new(
            db.clone(),
            QueryBuilder::new(SqlDialect::Sqlite),
        ));
        let writer = Arc::new(FilmWriteService::new(db.clone(), reader.clone(), mail));
        let schema = build_schema(reader.clone(), writer.clone());

        Self {
            db,
            schema,
            reader,
            writer,
        }
    }
}

/// Build the full Axum router: /rest, /graphql, probes and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(crate::api::health::router())
        .merge(crate::api::films::router())
        .merge(crate::graphql::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([
                    axum::http::header::ETAG,
                    axum::http::header::LOCATION,
                ]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
