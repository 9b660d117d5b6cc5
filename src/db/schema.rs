//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::CatalogError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), CatalogError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        conn.execute_batch(GAMES_SCHEMA)?;
        conn.execute_batch(CURATION_LOG_SCHEMA)?;
        conn.execute_batch(INDEXES_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(CatalogError::Internal(format!(
            "Database schema v{} is newer than supported v{}",
            current_version, SCHEMA_VERSION
        )));
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, CatalogError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), CatalogError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

const GAMES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY NOT NULL,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    short_description TEXT,
    why_we_picked TEXT,
    game_url TEXT NOT NULL,
    thumbnail_url TEXT,
    source_name TEXT,

    min_age INTEGER NOT NULL,
    max_age INTEGER NOT NULL,
    age_group TEXT NOT NULL,

    pricing_model TEXT NOT NULL DEFAULT 'free',
    pricing_note TEXT,
    session_length TEXT,
    works_offline INTEGER NOT NULL DEFAULT 0,
    supports_multiple_profiles INTEGER NOT NULL DEFAULT 0,
    requires_account INTEGER NOT NULL DEFAULT 0,

    -- Safety gates (NULL = not yet reviewed)
    has_no_in_game_ads INTEGER,
    has_respectful_monetization INTEGER,
    has_no_contact_with_strangers INTEGER,
    has_no_manipulative_design INTEGER,
    is_age_appropriate INTEGER,
    passes_gate_criteria INTEGER NOT NULL DEFAULT 0,

    -- Activation
    trust_tier TEXT NOT NULL,
    quality_confidence TEXT NOT NULL,
    manually_approved INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 0,

    -- Link health
    link_status TEXT NOT NULL DEFAULT 'unknown',
    consecutive_link_failures INTEGER NOT NULL DEFAULT 0,
    last_link_check TEXT,

    -- Badges
    badge_educational INTEGER NOT NULL DEFAULT 0,
    badge_creative INTEGER NOT NULL DEFAULT 0,
    badge_popular INTEGER NOT NULL DEFAULT 0,
    badge_polished INTEGER NOT NULL DEFAULT 0,
    badge_trusted_source INTEGER NOT NULL DEFAULT 0,
    badge_offline_friendly INTEGER NOT NULL DEFAULT 0,
    badge_quick_play INTEGER NOT NULL DEFAULT 0,
    badge_sibling_friendly INTEGER NOT NULL DEFAULT 0,

    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS game_categories (
    game_id TEXT NOT NULL,
    category TEXT NOT NULL,
    PRIMARY KEY (game_id, category),
    FOREIGN KEY (game_id) REFERENCES games(id) ON DELETE CASCADE
);
"#;

const CURATION_LOG_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS curation_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id TEXT,
    action TEXT NOT NULL,
    source TEXT NOT NULL,
    details TEXT NOT NULL,
    success INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const INDEXES_SCHEMA: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_games_slug ON games(slug);
CREATE INDEX IF NOT EXISTS idx_games_active_age ON games(is_active, age_group);
CREATE INDEX IF NOT EXISTS idx_games_created ON games(created_at);
CREATE INDEX IF NOT EXISTS idx_game_categories_category ON game_categories(category);
CREATE INDEX IF NOT EXISTS idx_curation_log_game ON curation_log(game_id);
"#;
