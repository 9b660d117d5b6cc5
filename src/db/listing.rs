//! Public listing read model
//!
//! Query parameters arrive as raw strings and are normalised to safe
//! defaults; a bad filter value is ignored, never an error.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::games::{query_games, GameRecord};
use crate::curation::{AgeGroup, Category, PricingFilter, PricingModel};
use crate::error::CatalogError;

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const MIN_SEARCH_LEN: usize = 2;

/// Raw listing query, as sent by the frontend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
    /// Comma-separated age group keys
    pub age_groups: Option<String>,
    /// Comma-separated category keys
    pub categories: Option<String>,
    pub pricing: Option<String>,
    pub search: Option<String>,
}

/// Normalised listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    pub offset: u32,
    pub limit: u32,
    pub age_groups: Vec<AgeGroup>,
    pub categories: Vec<Category>,
    pub pricing: PricingFilter,
    pub search: Option<String>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
            age_groups: vec![],
            categories: vec![],
            pricing: PricingFilter::All,
            search: None,
        }
    }
}

impl From<&ListingParams> for ListingFilter {
    fn from(params: &ListingParams) -> Self {
        let offset = params
            .offset
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .map(|n| n.min(u32::MAX as i64) as u32)
            .unwrap_or(0);

        let limit = params
            .limit
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|n| n.clamp(1, MAX_PAGE_SIZE as i64) as u32)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| s.chars().count() >= MIN_SEARCH_LEN)
            .map(str::to_string);

        Self {
            offset,
            limit,
            age_groups: parse_list(params.age_groups.as_deref()),
            categories: parse_list(params.categories.as_deref()),
            pricing: PricingFilter::parse_lenient(params.pricing.as_deref()),
            search,
        }
    }
}

/// Comma list of keys; unknown keys and duplicates dropped
fn parse_list<T: std::str::FromStr + PartialEq>(raw: Option<&str>) -> Vec<T> {
    let mut values = vec![];
    for key in raw.unwrap_or_default().split(',') {
        if let Ok(value) = key.trim().parse::<T>() {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    values
}

/// One page of active games
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePage {
    pub games: Vec<GameRecord>,
    pub has_more: bool,
    pub total: u64,
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Active games matching the filter, newest first
pub fn list_active_games(conn: &Connection, filter: &ListingFilter) -> Result<GamePage, CatalogError> {
    let mut conditions = vec!["g.is_active = 1".to_string()];
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

    if !filter.age_groups.is_empty() {
        let placeholders: Vec<_> = filter.age_groups.iter().map(|_| "?").collect();
        conditions.push(format!("g.age_group IN ({})", placeholders.join(", ")));
        for group in &filter.age_groups {
            params.push(Box::new(*group));
        }
    }

    if !filter.categories.is_empty() {
        let placeholders: Vec<_> = filter.categories.iter().map(|_| "?").collect();
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM game_categories gc WHERE gc.game_id = g.id AND gc.category IN ({}))",
            placeholders.join(", ")
        ));
        for category in &filter.categories {
            params.push(Box::new(*category));
        }
    }

    match filter.pricing {
        PricingFilter::All => {}
        PricingFilter::Free => {
            conditions.push("g.pricing_model = ?".to_string());
            params.push(Box::new(PricingModel::Free));
        }
        PricingFilter::Paid => {
            conditions.push("g.pricing_model <> ?".to_string());
            params.push(Box::new(PricingModel::Free));
        }
    }

    if let Some(ref search) = filter.search {
        conditions.push(
            "(fold_case(g.title) LIKE ? ESCAPE '\\' OR fold_case(COALESCE(g.description, '')) LIKE ? ESCAPE '\\' OR fold_case(COALESCE(g.short_description, '')) LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        params.push(Box::new(pattern.clone()));
        params.push(Box::new(pattern.clone()));
        params.push(Box::new(pattern));
    }

    let where_clause = conditions.join(" AND ");
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM games g WHERE {}", where_clause),
        param_refs.as_slice(),
        |row| row.get(0),
    )?;

    // One extra row tells us whether another page exists
    let sql = format!(
        "SELECT g.* FROM games g WHERE {} ORDER BY g.created_at DESC, g.rowid DESC LIMIT {} OFFSET {}",
        where_clause,
        filter.limit + 1,
        filter.offset
    );
    debug!("Executing query: {}", sql);

    let mut games = query_games(conn, &sql, param_refs.as_slice())?;
    let has_more = games.len() > filter.limit as usize;
    games.truncate(filter.limit as usize);

    Ok(GamePage {
        games,
        has_more,
        total: total as u64,
    })
}
