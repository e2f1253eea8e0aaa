//! Read access to films

use tracing::debug;

use super::error::FilmError;
use super::query_builder::{QueryBuilder, SearchCriteria};
use crate::db::{Database, Film};

pub struct FilmReadService {
    db: Database,
    builder: QueryBuilder,
}

impl FilmReadService {
    pub fn new(db: Database, builder: QueryBuilder) -> Self {
        Self { db, builder }
    }

    /// Load one film with its title, and its cast when `include_cast` is set
    pub async fn find_by_id(&self, id: i64, include_cast: bool) -> Result<Film, FilmError> {
        let query = self.builder.build_id(id, include_cast);
        let film = self
            .db
            .films()
            .fetch(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FilmError::not_found_id(id))?;

        debug!(film_id = film.id, version = film.version, "Found film");
        Ok(film)
    }

    /// Find films matching every criterion, ordered by id.
    ///
    /// No criteria (or an empty list) returns every film. With criteria, an empty result
    /// is [FilmError::NotFound].
    pub async fn find(
        &self,
        criteria: Option<&[(String, String)]>,
    ) -> Result<Vec<Film>, FilmError> {
        let criteria = match criteria {
            Some(pairs) if !pairs.is_empty() => SearchCriteria::parse(pairs)?,
            _ => return self.find_all().await,
        };
        self.find_matching(&criteria).await
    }

    pub async fn find_all(&self) -> Result<Vec<Film>, FilmError> {
        let query = self.builder.build(&SearchCriteria::default());
        Ok(self.db.films().fetch(&query).await?)
    }

    /// Find films for already validated criteria
    pub async fn find_matching(&self, criteria: &SearchCriteria) -> Result<Vec<Film>, FilmError> {
        let query = self.builder.build(criteria);
        let films = self.db.films().fetch(&query).await?;
        if films.is_empty() {
            return Err(FilmError::NotFound(
                "no films found for the given criteria".to_string(),
            ));
        }

        debug!(count = films.len(), "Found films");
        Ok(films)
    }
}
