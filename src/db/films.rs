//! Film database repository
//!
//! A film is stored as one `film` row, exactly one `title` row and zero or more
//! `cast_member` rows, the children pointing at the film through `film_id`. The Rust
//! side models the aggregate with plain ownership: a [Film] owns its [Title] and,
//! when loaded, its cast.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use super::sqlite_helpers::{
    decimal_to_f64, f64_to_decimal, json_to_keywords, keywords_to_json,
};
use crate::services::query_builder::FilmQuery;

/// Fractional digits kept for prices
pub const PRICE_SCALE: u32 = 2;
/// Fractional digits kept for discounts
pub const DISCOUNT_SCALE: u32 = 3;

/// Film genre
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, async_graphql::Enum,
)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Genre {
    Fantasy,
    Horror,
    Action,
    ScienceFiction,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fantasy => "FANTASY",
            Genre::Horror => "HORROR",
            Genre::Action => "ACTION",
            Genre::ScienceFiction => "SCIENCE-FICTION",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown genre '{0}'")]
pub struct ParseGenreError(pub String);

impl FromStr for Genre {
    type Err = ParseGenreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FANTASY" => Ok(Genre::Fantasy),
            "HORROR" => Ok(Genre::Horror),
            "ACTION" => Ok(Genre::Action),
            "SCIENCE-FICTION" => Ok(Genre::ScienceFiction),
            other => Err(ParseGenreError(other.to_string())),
        }
    }
}

/// Title of a film (one per film, text unique across all films)
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
}

/// Cast member of a film
#[derive(Debug, Clone, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// A persisted film with its title and, if requested, its cast
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: i64,
    pub version: i64,
    pub isan: String,
    pub rating: i32,
    pub genre: Option<Genre>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub available: bool,
    pub release_date: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub keywords: BTreeSet<String>,
    pub title: Title,
    /// `None` unless the cast was loaded
    pub cast: Option<Vec<CastMember>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Film {
    /// Merge the scalar fields of an update onto this film.
    ///
    /// Required fields always overwrite; optional fields only when present. Title and
    /// cast are never touched.
    pub fn merge(&mut self, update: UpdateFilm) {
        self.isan = update.isan;
        self.rating = update.rating;
        self.price = update.price;
        self.available = update.available;
        if let Some(genre) = update.genre {
            self.genre = Some(genre);
        }
        if let Some(discount) = update.discount {
            self.discount = Some(discount);
        }
        if let Some(release_date) = update.release_date {
            self.release_date = Some(release_date);
        }
        if let Some(homepage) = update.homepage {
            self.homepage = Some(homepage);
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords.into_iter().collect();
        }
    }
}

/// Input for the title of a new film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTitle {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Input for a cast member of a new film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCastMember {
    pub first_name: String,
    pub last_name: String,
}

/// Input for creating a film together with its title and cast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFilm {
    pub isan: String,
    pub rating: i32,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount: Option<Decimal>,
    pub available: bool,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub title: NewTitle,
    #[serde(default)]
    pub cast: Vec<NewCastMember>,
}

/// Input for updating the scalar fields of a film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFilm {
    pub isan: String,
    pub rating: i32,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount: Option<Decimal>,
    pub available: bool,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// Column list shared by every film query; the title is always inner-joined.
pub const FILM_SELECT: &str = "SELECT f.id, f.version, f.isan, f.rating, f.genre, f.price, \
     f.discount, f.available, f.release_date, f.homepage, f.keywords, f.created_at, \
     f.updated_at, t.id AS title_id, t.title, t.subtitle \
     FROM film f INNER JOIN title t ON t.film_id = f.id";

fn film_from_row(row: &SqliteRow) -> Result<Film, sqlx::Error> {
    let genre = row
        .try_get::<Option<String>, _>("genre")?
        .map(|g| g.parse::<Genre>())
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let discount: Option<f64> = row.try_get("discount")?;
    let keywords: String = row.try_get("keywords")?;

    Ok(Film {
        id: row.try_get("id")?,
        version: row.try_get("version")?,
        isan: row.try_get("isan")?,
        rating: row.try_get("rating")?,
        genre,
        price: f64_to_decimal(row.try_get("price")?, PRICE_SCALE),
        discount: discount.map(|d| f64_to_decimal(d, DISCOUNT_SCALE)),
        available: row.try_get("available")?,
        release_date: row.try_get("release_date")?,
        homepage: row.try_get("homepage")?,
        keywords: json_to_keywords(&keywords),
        title: Title {
            id: row.try_get("title_id")?,
            title: row.try_get("title")?,
            subtitle: row.try_get("subtitle")?,
        },
        cast: None,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct FilmRepository {
    pool: SqlitePool,
}

impl FilmRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute a query built by the query builder
    pub async fn fetch(&self, query: &FilmQuery) -> Result<Vec<Film>, sqlx::Error> {
        let mut q = sqlx::query(query.sql());
        for value in query.values() {
            q = value.bind_to_query(q);
        }

        let rows = q.fetch_all(&self.pool).await?;
        let mut films = rows
            .iter()
            .map(film_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if query.include_cast() {
            for film in films.iter_mut() {
                film.cast = Some(self.list_cast(film.id).await?);
            }
        }

        Ok(films)
    }

    /// List the cast of a film
    pub async fn list_cast(&self, film_id: i64) -> Result<Vec<CastMember>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name FROM cast_member WHERE film_id = ? ORDER BY id",
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CastMember {
                    id: row.try_get("id")?,
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                })
            })
            .collect()
    }

    /// Insert film, title and cast in one transaction. Returns the new film id.
    pub async fn insert(&self, input: &CreateFilm) -> Result<i64, sqlx::Error> {
        let now = Utc::now();
        let keywords: BTreeSet<String> = input.keywords.iter().cloned().collect();

        let mut tx = self.pool.begin().await?;

        let film_id = sqlx::query(
            r#"
            INSERT INTO film (
                version, isan, rating, genre, price, discount, available,
                release_date, homepage, keywords, created_at, updated_at
            )
            VALUES (0, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.isan)
        .bind(input.rating)
        .bind(input.genre.map(|g| g.as_str()))
        .bind(decimal_to_f64(input.price))
        .bind(input.discount.map(decimal_to_f64))
        .bind(input.available)
        .bind(input.release_date)
        .bind(&input.homepage)
        .bind(keywords_to_json(&keywords))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO title (title, subtitle, film_id) VALUES (?, ?, ?)")
            .bind(&input.title.title)
            .bind(&input.title.subtitle)
            .bind(film_id)
            .execute(&mut *tx)
            .await?;

        for member in &input.cast {
            sqlx::query("INSERT INTO cast_member (first_name, last_name, film_id) VALUES (?, ?, ?)")
                .bind(&member.first_name)
                .bind(&member.last_name)
                .bind(film_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(film_id)
    }

    /// Write the scalar fields of a film and bump its version.
    ///
    /// The row is only updated while it still carries `film.version`; if another writer
    /// got there first nothing is written and `None` is returned. Otherwise returns the
    /// new version.
    pub async fn update(&self, film: &Film) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE film
            SET isan = ?, rating = ?, genre = ?, price = ?, discount = ?, available = ?,
                release_date = ?, homepage = ?, keywords = ?,
                version = version + 1, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&film.isan)
        .bind(film.rating)
        .bind(film.genre.map(|g| g.as_str()))
        .bind(decimal_to_f64(film.price))
        .bind(film.discount.map(decimal_to_f64))
        .bind(film.available)
        .bind(film.release_date)
        .bind(&film.homepage)
        .bind(keywords_to_json(&film.keywords))
        .bind(Utc::now())
        .bind(film.id)
        .bind(film.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let version: i64 = sqlx::query_scalar("SELECT version FROM film WHERE id = ?")
            .bind(film.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(version))
    }

    /// Delete title, cast members and film row in one transaction.
    ///
    /// `film` must have been loaded with its cast. Returns whether the film row existed.
    pub async fn delete(&self, film: &Film) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM title WHERE id = ?")
            .bind(film.title.id)
            .execute(&mut *tx)
            .await?;

        for member in film.cast.iter().flatten() {
            sqlx::query("DELETE FROM cast_member WHERE id = ?")
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM film WHERE id = ?")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count rows of the child tables belonging to a film: (titles, cast members)
    pub async fn count_children(&self, film_id: i64) -> Result<(i64, i64), sqlx::Error> {
        let titles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM title WHERE film_id = ?")
            .bind(film_id)
            .fetch_one(&self.pool)
            .await?;
        let cast: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cast_member WHERE film_id = ?")
            .bind(film_id)
            .fetch_one(&self.pool)
            .await?;
        Ok((titles, cast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_film() -> Film {
        Film {
            id: 1,
            version: 0,
            isan: "978-3-897-22583-1".to_string(),
            rating: 4,
            genre: Some(Genre::Action),
            price: Decimal::from_str("11.10").unwrap(),
            discount: Some(Decimal::from_str("0.011").unwrap()),
            available: true,
            release_date: NaiveDate::from_ymd_opt(2022, 2, 1),
            homepage: Some("https://acme.at/".to_string()),
            keywords: ["JAVASCRIPT".to_string()].into_iter().collect(),
            title: Title {
                id: 1,
                title: "Alpha".to_string(),
                subtitle: Some("alpha".to_string()),
            },
            cast: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_genre_round_trip_through_str() {
        for genre in [
            Genre::Fantasy,
            Genre::Horror,
            Genre::Action,
            Genre::ScienceFiction,
        ] {
            assert_eq!(Genre::from_str(genre.as_str()).unwrap(), genre);
        }
        assert!(Genre::from_str("COMEDY").is_err());
    }

    #[test]
    fn test_genre_serde_uses_hyphen() {
        let json = serde_json::to_string(&Genre::ScienceFiction).unwrap();
        assert_eq!(json, "\"SCIENCE-FICTION\"");
    }

    #[test]
    fn test_merge_keeps_absent_optionals() {
        let mut film = sample_film();
        film.merge(UpdateFilm {
            isan: "978-0-007-00644-1".to_string(),
            rating: 2,
            genre: None,
            price: Decimal::from_str("20.00").unwrap(),
            discount: None,
            available: false,
            release_date: None,
            homepage: None,
            keywords: None,
        });

        assert_eq!(film.isan, "978-0-007-00644-1");
        assert_eq!(film.rating, 2);
        assert!(!film.available);
        assert_eq!(film.genre, Some(Genre::Action));
        assert_eq!(film.discount, Some(Decimal::from_str("0.011").unwrap()));
        assert_eq!(film.homepage.as_deref(), Some("https://acme.at/"));
        assert!(film.keywords.contains("JAVASCRIPT"));
        assert_eq!(film.title.title, "Alpha");
    }

    #[test]
    fn test_merge_overwrites_present_optionals() {
        let mut film = sample_film();
        film.merge(UpdateFilm {
            isan: film.isan.clone(),
            rating: film.rating,
            genre: Some(Genre::Horror),
            price: film.price,
            discount: Some(Decimal::from_str("0.5").unwrap()),
            available: true,
            release_date: None,
            homepage: Some("https://example.org/".to_string()),
            keywords: Some(vec!["TYPESCRIPT".to_string()]),
        });

        assert_eq!(film.genre, Some(Genre::Horror));
        assert_eq!(film.discount, Some(Decimal::from_str("0.5").unwrap()));
        assert_eq!(film.homepage.as_deref(), Some("https://example.org/"));
        assert_eq!(film.keywords.len(), 1);
        assert!(film.keywords.contains("TYPESCRIPT"));
    }

    #[test]
    fn test_create_film_deserializes_numbers() {
        let input: CreateFilm = serde_json::from_value(serde_json::json!({
            "isan": "978-0-007-00644-1",
            "rating": 1,
            "genre": "SCIENCE-FICTION",
            "price": 99.99,
            "discount": 0.123,
            "available": true,
            "release_date": "2022-02-28",
            "homepage": "https://post.rest",
            "keywords": ["JAVASCRIPT", "TYPESCRIPT"],
            "title": { "title": "Titlepost", "subtitle": "subtitlepost" },
            "cast": [{ "first_name": "Ada", "last_name": "Lovelace" }]
        }))
        .unwrap();

        assert_eq!(input.genre, Some(Genre::ScienceFiction));
        assert_eq!(input.price, Decimal::from_str("99.99").unwrap());
        assert_eq!(input.discount, Some(Decimal::from_str("0.123").unwrap()));
        assert_eq!(input.release_date, NaiveDate::from_ymd_opt(2022, 2, 28));
        assert_eq!(input.cast.len(), 1);
    }

    fn sample_input(isan: &str, title: &str) -> CreateFilm {
        CreateFilm {
            isan: isan.to_string(),
            rating: 3,
            genre: None,
            price: Decimal::from_str("9.90").unwrap(),
            discount: None,
            available: true,
            release_date: None,
            homepage: None,
            keywords: vec![],
            title: NewTitle {
                title: title.to_string(),
                subtitle: None,
            },
            cast: vec![],
        }
    }

    async fn repository() -> FilmRepository {
        let db = crate::db::Database::in_memory().await.unwrap();
        db.sync_schema().await.unwrap();
        db.films()
    }

    async fn load(repo: &FilmRepository, id: i64) -> Film {
        let query = crate::services::QueryBuilder::default().build_id(id, false);
        repo.fetch(&query).await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_keywords_round_trip_verbatim() {
        let repo = repository().await;
        let mut input = sample_input("978-0-007-00644-1", "Keywords");
        input.keywords = vec!["SCI,FI".to_string(), " PADDED ".to_string()];

        let id = repo.insert(&input).await.unwrap();
        let film = load(&repo, id).await;

        let expected: BTreeSet<String> = input.keywords.into_iter().collect();
        assert_eq!(film.keywords, expected);
    }

    #[tokio::test]
    async fn test_update_with_stale_version_writes_nothing() {
        let repo = repository().await;
        let id = repo
            .insert(&sample_input("978-0-007-00644-1", "Stale"))
            .await
            .unwrap();

        let mut first = load(&repo, id).await;
        let mut second = first.clone();

        first.rating = 5;
        assert_eq!(repo.update(&first).await.unwrap(), Some(1));

        second.rating = 1;
        assert_eq!(repo.update(&second).await.unwrap(), None);

        let film = load(&repo, id).await;
        assert_eq!(film.version, 1);
        assert_eq!(film.rating, 5);
    }
}
