//! A seeded in-memory SQLite database.

use drilldown::state::{self, InitializationError};
use drilldown_configuration::PoolSettings;
use query_engine_sql::sql::string::Flavor;

pub const SQLITE_CONNECTION_URI: &str = "sqlite::memory:";

const SCHEMA: &[&str] = &[
    "CREATE TABLE authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author_id INTEGER REFERENCES authors (id),
        genre TEXT,
        pages INTEGER,
        slug TEXT
    )",
    "CREATE TABLE items (
        id TEXT PRIMARY KEY,
        name TEXT
    )",
];

pub const AUTHORS: [&str; 5] = [
    "Chuck Palahniuk",
    "Richard Greene",
    "Robert E Howard",
    "Anthony Burgess",
    "Isaac Asimov",
];

/// Title, author id, pages and genre of every seeded book, in insertion order.
pub const BOOKS: [(&str, i64, i64, Option<&str>); 8] = [
    ("Fight Club", 1, 279, None),
    ("Survivor", 1, 353, None),
    ("Haunted", 1, 692, Some("Horror")),
    ("Fight Story", 3, 75, None),
    ("American Horror Story", 2, 225, None),
    ("A Clockwork Orange", 4, 175, None),
    ("Prelude to Foundation", 5, 481, Some("SciFi")),
    ("Nightfall", 5, 501, Some("SciFi")),
];

pub const ITEMS: [(&str, &str); 2] = [("abc", "First item"), ("xyz", "Second item")];

/// Every connection to `sqlite::memory:` opens its own database, so the pool holds on to a
/// single connection.
fn pool_settings() -> PoolSettings {
    PoolSettings {
        max_connections: 1,
        pool_timeout: 30,
        idle_timeout: None,
        connection_lifetime: None,
    }
}

/// Create an in-memory database holding the authors, books and items tables.
pub async fn create_seeded_pool() -> Result<(sqlx::AnyPool, Flavor), InitializationError> {
    let (pool, flavor) = state::create_pool(SQLITE_CONNECTION_URI, &pool_settings()).await?;
    seed(&pool)
        .await
        .map_err(InitializationError::UnableToCreatePool)?;
    Ok((pool, flavor))
}

async fn seed(pool: &sqlx::AnyPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    for name in AUTHORS {
        sqlx::query("INSERT INTO authors (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }
    for (title, author_id, pages, genre) in BOOKS {
        sqlx::query(
            "INSERT INTO books (title, author_id, pages, genre, slug) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(author_id)
        .bind(pages)
        .bind(genre)
        .bind(slug(title))
        .execute(pool)
        .await?;
    }
    for (id, name) in ITEMS {
        sqlx::query("INSERT INTO items (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }
    Ok(())
}

fn slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}
