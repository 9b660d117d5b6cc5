//! SQLite catalog store
//!
//! ## Tables
//!
//! - `games` - one row per game, derived curation fields included
//! - `game_categories` - category index for listing filters
//! - `curation_log` - append-only audit trail
//!
//! `games.slug` carries a `UNIQUE` index; slug allocation treats a
//! violation of it as "try the next candidate".

pub mod curation_log;
pub mod games;
pub mod listing;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Row, ToSql};
use tracing::{debug, info};

use crate::curation::{
    AgeGroup, Category, LinkStatus, PricingModel, QualityConfidence, SessionLength, TrustTier,
};
use crate::error::CatalogError;

/// SQLite database holding the game catalog
pub struct CatalogDb {
    conn: Mutex<Connection>,
}

impl CatalogDb {
    /// Open or create the catalog database
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        info!("Opening SQLite database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CatalogError::Internal(format!("Failed to create {:?}: {}", parent, e))
                })?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets the cron process and the web process share the file
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
        )?;

        Self::with_schema(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        Self::with_schema(conn)
    }

    fn with_schema(conn: Connection) -> Result<Self, CatalogError> {
        register_functions(&conn)?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&Connection) -> Result<T, CatalogError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a write operation with exclusive access
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut Connection) -> Result<T, CatalogError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| CatalogError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    pub fn stats(&self) -> Result<DbStats, CatalogError> {
        self.with_conn(|conn| {
            let games: i64 = conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
            let active: i64 = conn.query_row(
                "SELECT COUNT(*) FROM games WHERE is_active = 1",
                [],
                |row| row.get(0),
            )?;
            let broken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM games WHERE link_status = 'broken'",
                [],
                |row| row.get(0),
            )?;

            Ok(DbStats {
                game_count: games as u64,
                active_count: active as u64,
                broken_link_count: broken as u64,
            })
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    pub game_count: u64,
    pub active_count: u64,
    pub broken_link_count: u64,
}

/// SQLite's `LOWER()` only folds ASCII; `fold_case()` folds all of Unicode
/// the same way `str::to_lowercase` does.
fn register_functions(conn: &Connection) -> Result<(), CatalogError> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Current time at the precision timestamps are stored with
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
pub(crate) fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, e))
}

pub(crate) fn parse_optional_timestamp(
    row: &Row,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

fn conversion_error<E>(row: &Row, column: &str, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
}

/// Catalog enums are stored as their text keys
macro_rules! text_column {
    ($($ty:ty),* $(,)?) => {$(
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.to_string()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )*};
}

text_column!(
    AgeGroup,
    Category,
    CurationAction,
    CurationSource,
    LinkStatus,
    PricingModel,
    QualityConfidence,
    SessionLength,
    TrustTier,
);

// Re-exports
pub use curation_log::{CurationAction, CurationLogEntry, CurationSource, NewLogEntry};
pub use games::{GamePatch, GameRecord, LinkTarget, NewGame};
pub use listing::{GamePage, ListingFilter, ListingParams};
