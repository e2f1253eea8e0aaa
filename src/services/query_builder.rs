//! SQL query builder for film reads
//!
//! Translates a sparse list of `(key, value)` search criteria into a parameterized
//! SELECT over `film` inner-joined with `title`. The builder never executes anything;
//! [FilmRepository::fetch](crate::db::FilmRepository::fetch) runs the resulting
//! [FilmQuery].
//!
//! Predicates are emitted in a fixed order: title substring first, then the keyword
//! flags, then equality on the remaining attributes in input order. The first one opens
//! the WHERE clause and every following one is joined with AND.
//!
//! Title text is matched literally: `%`, `_` and `\` are escaped and the LIKE carries
//! `ESCAPE '\'`. SQLite's `LIKE` only folds ASCII case, so `ä` does not match `Ä`.
//! Keyword flags match the quoted token inside the JSON array column.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::FilmError;
use crate::db::Genre;
use crate::db::films::FILM_SELECT;
use crate::db::sqlite_helpers::keyword_like_pattern;

pub const JAVASCRIPT: &str = "JAVASCRIPT";
pub const TYPESCRIPT: &str = "TYPESCRIPT";

/// A value bound to a query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SqlValue {
    /// Bind this value to a sqlx query
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Bool(b) => query.bind(if *b { 1i32 } else { 0i32 }),
        }
    }
}

/// Backend-specific spelling of the generated SQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    /// `LIKE` (ASCII case-insensitive in SQLite) and `?N` placeholders
    #[default]
    Sqlite,
    /// `ILIKE` and `$N` placeholders
    Postgres,
}

impl SqlDialect {
    fn like(&self) -> &'static str {
        match self {
            SqlDialect::Sqlite => "LIKE",
            SqlDialect::Postgres => "ILIKE",
        }
    }

    fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Sqlite => format!("?{}", index),
            SqlDialect::Postgres => format!("${}", index),
        }
    }
}

/// Film attributes that can be matched by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmColumn {
    Isan,
    Rating,
    Genre,
    Price,
    Discount,
    Available,
    ReleaseDate,
    Homepage,
}

impl FilmColumn {
    pub fn column(&self) -> &'static str {
        match self {
            FilmColumn::Isan => "f.isan",
            FilmColumn::Rating => "f.rating",
            FilmColumn::Genre => "f.genre",
            FilmColumn::Price => "f.price",
            FilmColumn::Discount => "f.discount",
            FilmColumn::Available => "f.available",
            FilmColumn::ReleaseDate => "f.release_date",
            FilmColumn::Homepage => "f.homepage",
        }
    }

    /// Convert a raw criteria value into the typed parameter for this column
    pub fn parse_value(&self, raw: &str) -> Result<SqlValue, FilmError> {
        let invalid =
            || FilmError::InvalidCriteria(format!("invalid value '{}' for {}", raw, self));

        match self {
            FilmColumn::Isan | FilmColumn::Homepage => Ok(SqlValue::String(raw.to_string())),
            FilmColumn::Rating => raw
                .trim()
                .parse::<i64>()
                .map(SqlValue::Int)
                .map_err(|_| invalid()),
            FilmColumn::Price | FilmColumn::Discount => raw
                .trim()
                .parse::<Decimal>()
                .map(|d| SqlValue::Float(crate::db::sqlite_helpers::decimal_to_f64(d)))
                .map_err(|_| invalid()),
            FilmColumn::Available => match raw.trim() {
                "true" | "1" => Ok(SqlValue::Bool(true)),
                "false" | "0" => Ok(SqlValue::Bool(false)),
                _ => Err(invalid()),
            },
            FilmColumn::Genre => raw
                .parse::<Genre>()
                .map(|g| SqlValue::String(g.as_str().to_string()))
                .map_err(|_| invalid()),
            FilmColumn::ReleaseDate => raw
                .trim()
                .parse::<NaiveDate>()
                .map(|d| SqlValue::String(d.to_string()))
                .map_err(|_| invalid()),
        }
    }
}

impl FromStr for FilmColumn {
    type Err = FilmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isan" => Ok(FilmColumn::Isan),
            "rating" => Ok(FilmColumn::Rating),
            "genre" => Ok(FilmColumn::Genre),
            "price" => Ok(FilmColumn::Price),
            "discount" => Ok(FilmColumn::Discount),
            "available" => Ok(FilmColumn::Available),
            "release_date" => Ok(FilmColumn::ReleaseDate),
            "homepage" => Ok(FilmColumn::Homepage),
            other => Err(FilmError::InvalidCriteria(format!(
                "unknown search key '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FilmColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilmColumn::Isan => "isan",
            FilmColumn::Rating => "rating",
            FilmColumn::Genre => "genre",
            FilmColumn::Price => "price",
            FilmColumn::Discount => "discount",
            FilmColumn::Available => "available",
            FilmColumn::ReleaseDate => "release_date",
            FilmColumn::Homepage => "homepage",
        };
        f.write_str(name)
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring of the title text
    TitleContains(String),
    /// The serialized keyword column contains the token
    KeywordContains(&'static str),
    Equals(FilmColumn, SqlValue),
}

/// Validated search criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    title: Option<String>,
    javascript: bool,
    typescript: bool,
    equals: Vec<(FilmColumn, SqlValue)>,
}

impl SearchCriteria {
    /// Validate raw `(key, value)` pairs.
    ///
    /// Any unknown key or mistyped value rejects the whole set.
    pub fn parse(pairs: &[(String, String)]) -> Result<Self, FilmError> {
        let mut criteria = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "title" => criteria.title = Some(value.clone()),
                "javascript" => criteria.javascript = value == "true",
                "typescript" => criteria.typescript = value == "true",
                other => {
                    let column = FilmColumn::from_str(other)?;
                    let value = column.parse_value(value)?;
                    criteria.equals.push((column, value));
                }
            }
        }

        Ok(criteria)
    }

    /// Criteria matching a single ISAN
    pub fn isan(code: &str) -> Self {
        Self {
            equals: vec![(FilmColumn::Isan, SqlValue::String(code.to_string()))],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && !self.javascript && !self.typescript && self.equals.is_empty()
    }

    /// Predicates in emission order
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(title) = &self.title {
            predicates.push(Predicate::TitleContains(title.clone()));
        }
        if self.javascript {
            predicates.push(Predicate::KeywordContains(JAVASCRIPT));
        }
        if self.typescript {
            predicates.push(Predicate::KeywordContains(TYPESCRIPT));
        }
        for (column, value) in &self.equals {
            predicates.push(Predicate::Equals(*column, value.clone()));
        }
        predicates
    }
}

/// A built, not yet executed, film query
#[derive(Debug, Clone, PartialEq)]
pub struct FilmQuery {
    sql: String,
    values: Vec<SqlValue>,
    include_cast: bool,
}

impl FilmQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Whether the cast of each film should be loaded as well
    pub fn include_cast(&self) -> bool {
        self.include_cast
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    dialect: SqlDialect,
}

impl QueryBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Query for one film by id
    pub fn build_id(&self, id: i64, include_cast: bool) -> FilmQuery {
        let mut statement = Statement::new(self.dialect);
        statement.push("f.id = {}", SqlValue::Int(id));
        statement.finish(include_cast)
    }

    /// Query for all films matching the criteria (all films when empty)
    pub fn build(&self, criteria: &SearchCriteria) -> FilmQuery {
        let like = self.dialect.like();
        let mut statement = Statement::new(self.dialect);

        for predicate in criteria.predicates() {
            match predicate {
                Predicate::TitleContains(text) => statement.push(
                    &format!("t.title {} {{}} ESCAPE '\\'", like),
                    SqlValue::String(format!("%{}%", escape_like(&text))),
                ),
                Predicate::KeywordContains(token) => statement.push(
                    &format!("f.keywords {} {{}}", like),
                    SqlValue::String(keyword_like_pattern(token)),
                ),
                Predicate::Equals(column, value) => {
                    statement.push(&format!("{} = {{}}", column.column()), value)
                }
            }
        }

        tracing::debug!(sql = %statement.sql, params = statement.values.len(), "Built film query");
        statement.finish(false)
    }
}

/// Escape the LIKE wildcards so `text` only matches itself
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// SQL under construction; the first condition opens WHERE, the rest use AND
struct Statement {
    dialect: SqlDialect,
    sql: String,
    values: Vec<SqlValue>,
}

impl Statement {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            sql: FILM_SELECT.to_string(),
            values: Vec::new(),
        }
    }

    /// Append a condition; `{}` in `condition` marks the parameter position
    fn push(&mut self, condition: &str, value: SqlValue) {
        self.sql
            .push_str(if self.values.is_empty() { " WHERE " } else { " AND " });
        self.values.push(value);
        let placeholder = self.dialect.placeholder(self.values.len());
        self.sql.push_str(&condition.replace("{}", &placeholder));
    }

    fn finish(mut self, include_cast: bool) -> FilmQuery {
        self.sql.push_str(" ORDER BY f.id");
        FilmQuery {
            sql: self.sql,
            values: self.values,
            include_cast,
        }
    }
}
