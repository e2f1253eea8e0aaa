//! Create, update and delete films
//!
//! Updates use optimistic concurrency. The caller presents the version it last saw as a
//! quoted token (`"3"`, the ETag form); an older token is rejected, and the UPDATE
//! itself is guarded by the loaded version so a writer committing in between is
//! detected as well.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::error::FilmError;
use super::film_read::FilmReadService;
use super::mail::{MailMessage, MailService};
use super::query_builder::SearchCriteria;
use super::validation::{validate_create, validate_update};
use crate::db::{CreateFilm, Database, UpdateFilm};

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"(\d+)"$"#).expect("valid version regex"));

/// Version presented by a client, kept as a plain integer once parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionToken(pub i64);

impl VersionToken {
    /// Parse the quoted form, e.g. `"3"`
    pub fn parse(raw: &str) -> Result<Self, FilmError> {
        VERSION_RE
            .captures(raw)
            .and_then(|c| c[1].parse::<i64>().ok())
            .map(VersionToken)
            .ok_or_else(|| FilmError::VersionInvalid(raw.to_string()))
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

pub struct FilmWriteService {
    db: Database,
    reader: Arc<FilmReadService>,
    mail: MailService,
}

impl FilmWriteService {
    pub fn new(db: Database, reader: Arc<FilmReadService>, mail: MailService) -> Self {
        Self { db, reader, mail }
    }

    /// Create a film with its title and cast. Returns the new id.
    pub async fn create(&self, input: CreateFilm) -> Result<i64, FilmError> {
        validate_create(&input)?;

        match self.reader.find_matching(&SearchCriteria::isan(&input.isan)).await {
            Ok(_) => return Err(FilmError::DuplicateCode(input.isan)),
            Err(FilmError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let id = self
            .db
            .films()
            .insert(&input)
            .await
            .map_err(|e| map_unique_violation(e, &input.isan, &input.title.title))?;

        info!(film_id = id, isan = %input.isan, "Created film");

        self.mail.send(MailMessage {
            subject: format!("New film {}", id),
            body: format!(
                "Film with title <strong>{}</strong> was added",
                input.title.title
            ),
        });

        Ok(id)
    }

    /// Update the scalar fields of a film. Returns the new version.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateFilm,
        version: Option<&str>,
    ) -> Result<i64, FilmError> {
        let token = VersionToken::parse(version.ok_or(FilmError::VersionMissing)?)?;
        validate_update(&input)?;

        let mut film = self.reader.find_by_id(id, false).await?;
        if token.0 < film.version {
            debug!(
                film_id = id,
                token = token.0,
                persisted = film.version,
                "Outdated version"
            );
            return Err(FilmError::VersionOutdated(token.0));
        }

        film.merge(input);
        let new_version = self
            .db
            .films()
            .update(&film)
            .await
            .map_err(|e| map_unique_violation(e, &film.isan, &film.title.title))?
            .ok_or(FilmError::VersionOutdated(token.0))?;

        info!(film_id = id, version = new_version, "Updated film");
        Ok(new_version)
    }

    /// Delete a film together with its title and cast
    pub async fn delete(&self, id: i64) -> Result<bool, FilmError> {
        let film = self.reader.find_by_id(id, true).await?;
        let deleted = self.db.films().delete(&film).await?;

        info!(film_id = id, deleted, "Deleted film");
        Ok(deleted)
    }
}

/// Turn UNIQUE constraint failures from a write into domain conflicts
fn map_unique_violation(error: sqlx::Error, isan: &str, title: &str) -> FilmError {
    if let sqlx::Error::Database(db_err) = &error
        && db_err.is_unique_violation()
    {
        let message = db_err.message();
        if message.contains("title.title") {
            return FilmError::TitleExists(title.to_string());
        }
        if message.contains("film.isan") {
            return FilmError::DuplicateCode(isan.to_string());
        }
    }
    FilmError::Database(error)
}
