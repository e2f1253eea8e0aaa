//! Schema synchronization for the film tables
//!
//! Creates `film`, `title` and `cast_member` when they are missing. Existing tables
//! are left alone; column renames or type changes need a fresh database.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub errors: Vec<String>,
}

impl SchemaSyncResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Tables in creation order (children reference `film`)
const TABLES: &[(&str, &str)] = &[
    (
        "film",
        r#"
        CREATE TABLE IF NOT EXISTS film (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version INTEGER NOT NULL DEFAULT 0,
            isan TEXT NOT NULL UNIQUE,
            rating INTEGER NOT NULL,
            genre TEXT,
            price REAL NOT NULL,
            discount REAL,
            available INTEGER NOT NULL DEFAULT 0,
            release_date TEXT,
            homepage TEXT,
            keywords TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "title",
        r#"
        CREATE TABLE IF NOT EXISTS title (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            subtitle TEXT,
            film_id INTEGER NOT NULL UNIQUE REFERENCES film(id)
        )
        "#,
    ),
    (
        "cast_member",
        r#"
        CREATE TABLE IF NOT EXISTS cast_member (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            film_id INTEGER NOT NULL REFERENCES film(id)
        )
        "#,
    ),
];

const INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_cast_member_film_id ON cast_member(film_id)"];

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Create every missing film table and index
pub async fn sync_schema(pool: &SqlitePool) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();

    for (table_name, create_sql) in TABLES {
        if table_exists(pool, table_name).await? {
            continue;
        }

        debug!(table = table_name, "Creating table");
        match sqlx::query(create_sql).execute(pool).await {
            Ok(_) => {
                info!("Created table: {}", table_name);
                result.tables_created.push(table_name.to_string());
            }
            Err(e) => {
                let msg = format!("Failed to create table {}: {}", table_name, e);
                warn!("{}", msg);
                result.errors.push(msg);
            }
        }
    }

    for index_sql in INDEXES {
        if let Err(e) = sqlx::query(index_sql).execute(pool).await {
            let msg = format!("Failed to create index: {}", e);
            warn!("{}", msg);
            result.errors.push(msg);
        }
    }

    Ok(result)
}
