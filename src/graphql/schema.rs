//! GraphQL schema definition

use std::sync::Arc;

use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::mutations::FilmMutations;
use super::queries::FilmQueries;
use crate::services::{FilmReadService, FilmWriteService};

/// The GraphQL schema type
pub type FilmSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(FilmQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(FilmMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(reader: Arc<FilmReadService>, writer: Arc<FilmWriteService>) -> FilmSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .extension(Tracing)
    .data(reader)
    .data(writer)
    .finish()
}
