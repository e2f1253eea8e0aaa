//! Film catalog services

pub mod error;
pub mod film_read;
pub mod film_write;
pub mod mail;
pub mod query_builder;
pub mod validation;

pub use error::FilmError;
pub use film_read::FilmReadService;
pub use film_write::{FilmWriteService, VersionToken};
pub use mail::{LogMailer, MailMessage, MailService, Mailer};
pub use query_builder::{
    FilmColumn, FilmQuery, Predicate, QueryBuilder, SearchCriteria, SqlDialect, SqlValue,
};
