//! Curation audit log
//!
//! Append-only. Nothing in the crate updates or deletes entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{parse_timestamp, timestamp};
use crate::error::{CatalogError, UnknownVariant};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationAction {
    LinkCheck,
    Enhanced,
    Approved,
}

impl CurationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurationAction::LinkCheck => "link_check",
            CurationAction::Enhanced => "enhanced",
            CurationAction::Approved => "approved",
        }
    }
}

impl fmt::Display for CurationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurationAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link_check" => Ok(CurationAction::LinkCheck),
            "enhanced" => Ok(CurationAction::Enhanced),
            "approved" => Ok(CurationAction::Approved),
            other => Err(UnknownVariant::new("curation action", other)),
        }
    }
}

/// Who triggered the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationSource {
    Cron,
    Ai,
    Manual,
}

impl CurationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurationSource::Cron => "cron",
            CurationSource::Ai => "ai",
            CurationSource::Manual => "manual",
        }
    }
}

impl fmt::Display for CurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurationSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cron" => Ok(CurationSource::Cron),
            "ai" => Ok(CurationSource::Ai),
            "manual" => Ok(CurationSource::Manual),
            other => Err(UnknownVariant::new("curation source", other)),
        }
    }
}

/// Input for appending a log entry
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub game_id: Option<String>,
    pub action: CurationAction,
    pub source: CurationSource,
    pub details: serde_json::Value,
    pub success: bool,
}

/// Log row from database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationLogEntry {
    pub id: i64,
    pub game_id: Option<String>,
    pub action: CurationAction,
    pub source: CurationSource,
    pub details: serde_json::Value,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

impl CurationLogEntry {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let details: String = row.get("details")?;
        Ok(Self {
            id: row.get("id")?,
            game_id: row.get("game_id")?,
            action: row.get("action")?,
            source: row.get("source")?,
            // Tolerate hand-edited rows; the payload is free-form anyway
            details: serde_json::from_str(&details)
                .unwrap_or(serde_json::Value::String(details)),
            success: row.get("success")?,
            created_at: parse_timestamp(row, "created_at")?,
        })
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Append an entry, returning its id
pub fn append(conn: &Connection, entry: &NewLogEntry) -> Result<i64, CatalogError> {
    let details = serde_json::to_string(&entry.details)?;
    conn.execute(
        "INSERT INTO curation_log (game_id, action, source, details, success, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        params![
            entry.game_id,
            entry.action,
            entry.source,
            details,
            entry.success,
            timestamp(&Utc::now())
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent entries first
pub fn recent(conn: &Connection, limit: u32) -> Result<Vec<CurationLogEntry>, CatalogError> {
    let mut stmt = conn.prepare("SELECT * FROM curation_log ORDER BY id DESC LIMIT ?")?;
    let entries = stmt
        .query_map(params![limit], CurationLogEntry::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Entries for one game, most recent first
pub fn for_game(conn: &Connection, game_id: &str) -> Result<Vec<CurationLogEntry>, CatalogError> {
    let mut stmt = conn.prepare("SELECT * FROM curation_log WHERE game_id = ? ORDER BY id DESC")?;
    let entries = stmt
        .query_map(params![game_id], CurationLogEntry::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
