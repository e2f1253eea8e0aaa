pub mod films;

pub use films::FilmMutations;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result};

    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{FilmWriteService, VersionToken};
}
