//! Game CRUD and curation writes
//!
//! Every write path recomputes the derived fields (age group, gate verdict,
//! badges, activation) from the raw inputs before saving.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rusqlite::{named_params, params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::curation_log::{self, CurationAction, CurationSource, NewLogEntry};
use super::{now, parse_optional_timestamp, parse_timestamp, timestamp};
use crate::curation::slug::FALLBACK_SLUG;
use crate::curation::{
    compute_age_group, compute_badges, compute_gate_criteria, evaluate_activation, generate_slug,
    ActivationDecision, ActivationInputs, AgeGroup, AssignedBadges, BadgeInputs, BadgeSet,
    Category, LinkStatus, PricingModel, QualityConfidence, SafetyFlags, SessionLength,
    SlugCandidates, SystemMode, TrustTier,
};
use crate::enhance::Enhancement;
use crate::error::CatalogError;
use crate::links::{LinkHealth, LINK_FAILURE_THRESHOLD};

/// Upper bound on slug candidates tried before giving up
const MAX_SLUG_ATTEMPTS: usize = 1000;

/// Game row with categories attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub why_we_picked: Option<String>,
    pub game_url: String,
    pub thumbnail_url: Option<String>,
    pub source_name: Option<String>,
    pub min_age: u32,
    pub max_age: u32,
    pub age_group: AgeGroup,
    pub pricing_model: PricingModel,
    pub pricing_note: Option<String>,
    pub session_length: Option<SessionLength>,
    pub works_offline: bool,
    pub supports_multiple_profiles: bool,
    pub requires_account: bool,
    #[serde(flatten)]
    pub safety: SafetyFlags,
    pub passes_gate_criteria: bool,
    pub trust_tier: TrustTier,
    pub quality_confidence: QualityConfidence,
    pub manually_approved: bool,
    pub is_active: bool,
    pub link_status: LinkStatus,
    pub consecutive_link_failures: u32,
    pub last_link_check: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub badges: BadgeSet,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameRecord {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            slug: row.get("slug")?,
            title: row.get("title")?,
            description: row.get("description")?,
            short_description: row.get("short_description")?,
            why_we_picked: row.get("why_we_picked")?,
            game_url: row.get("game_url")?,
            thumbnail_url: row.get("thumbnail_url")?,
            source_name: row.get("source_name")?,
            min_age: row.get("min_age")?,
            max_age: row.get("max_age")?,
            age_group: row.get("age_group")?,
            pricing_model: row.get("pricing_model")?,
            pricing_note: row.get("pricing_note")?,
            session_length: row.get("session_length")?,
            works_offline: row.get("works_offline")?,
            supports_multiple_profiles: row.get("supports_multiple_profiles")?,
            requires_account: row.get("requires_account")?,
            safety: SafetyFlags {
                has_no_in_game_ads: row.get("has_no_in_game_ads")?,
                has_respectful_monetization: row.get("has_respectful_monetization")?,
                has_no_contact_with_strangers: row.get("has_no_contact_with_strangers")?,
                has_no_manipulative_design: row.get("has_no_manipulative_design")?,
                is_age_appropriate: row.get("is_age_appropriate")?,
            },
            passes_gate_criteria: row.get("passes_gate_criteria")?,
            trust_tier: row.get("trust_tier")?,
            quality_confidence: row.get("quality_confidence")?,
            manually_approved: row.get("manually_approved")?,
            is_active: row.get("is_active")?,
            link_status: row.get("link_status")?,
            consecutive_link_failures: row.get("consecutive_link_failures")?,
            last_link_check: parse_optional_timestamp(row, "last_link_check")?,
            badges: BadgeSet {
                educational: row.get("badge_educational")?,
                creative: row.get("badge_creative")?,
                popular: row.get("badge_popular")?,
                polished: row.get("badge_polished")?,
                trusted_source: row.get("badge_trusted_source")?,
                offline_friendly: row.get("badge_offline_friendly")?,
                quick_play: row.get("badge_quick_play")?,
                sibling_friendly: row.get("badge_sibling_friendly")?,
            },
            categories: vec![], // Loaded separately
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }

    fn from_new(input: NewGame, now: DateTime<Utc>) -> Self {
        let mut categories = input.categories;
        categories.sort();
        categories.dedup();

        Self {
            id: Uuid::new_v4().to_string(),
            slug: String::new(),
            title: input.title.trim().to_string(),
            description: input.description,
            short_description: None,
            why_we_picked: None,
            game_url: input.game_url.trim().to_string(),
            thumbnail_url: input.thumbnail_url,
            source_name: input.source_name,
            min_age: input.min_age,
            max_age: input.max_age,
            age_group: compute_age_group(input.min_age, input.max_age),
            pricing_model: input.pricing_model,
            pricing_note: input.pricing_note,
            session_length: input.session_length,
            works_offline: input.works_offline,
            supports_multiple_profiles: input.supports_multiple_profiles,
            requires_account: input.requires_account,
            safety: input.safety,
            passes_gate_criteria: false,
            trust_tier: input.trust_tier,
            quality_confidence: input.quality_confidence,
            manually_approved: false,
            is_active: false,
            link_status: LinkStatus::Unknown,
            consecutive_link_failures: 0,
            last_link_check: None,
            badges: compute_badges(
                &BadgeInputs {
                    trust_tier: input.trust_tier,
                    works_offline: input.works_offline,
                    session_length: input.session_length,
                    supports_multiple_profiles: input.supports_multiple_profiles,
                },
                &input.assigned_badges,
            ),
            categories,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn activation_inputs(&self) -> ActivationInputs {
        ActivationInputs {
            passes_gate_criteria: self.passes_gate_criteria,
            quality_confidence: self.quality_confidence,
            trust_tier: self.trust_tier,
            manually_approved: self.manually_approved,
        }
    }

    pub fn activation(&self, mode: SystemMode) -> ActivationDecision {
        evaluate_activation(&self.activation_inputs(), mode)
    }

    pub fn badge_inputs(&self) -> BadgeInputs {
        BadgeInputs {
            trust_tier: self.trust_tier,
            works_offline: self.works_offline,
            session_length: self.session_length,
            supports_multiple_profiles: self.supports_multiple_profiles,
        }
    }

    pub fn link_health(&self) -> LinkHealth {
        LinkHealth {
            status: self.link_status,
            consecutive_failures: self.consecutive_link_failures,
            is_active: self.is_active,
        }
    }

    /// Recompute every derived field from the raw inputs.
    ///
    /// A game whose link has failed `LINK_FAILURE_THRESHOLD` times stays
    /// inactive until its URL changes.
    pub fn refresh_derived(&mut self, mode: SystemMode) {
        self.age_group = compute_age_group(self.min_age, self.max_age);
        self.passes_gate_criteria = compute_gate_criteria(&self.safety);
        self.badges = compute_badges(&self.badge_inputs(), &self.badges.assigned());
        self.is_active = self.activation(mode).is_active()
            && self.consecutive_link_failures < LINK_FAILURE_THRESHOLD;
    }

    fn validate(&self) -> Result<(), CatalogError> {
        validate_fields(&self.title, &self.game_url, self.min_age, self.max_age)
    }
}

fn validate_fields(title: &str, game_url: &str, min_age: u32, max_age: u32) -> Result<(), CatalogError> {
    if title.trim().is_empty() {
        return Err(CatalogError::InvalidInput("title must not be empty".to_string()));
    }
    let url = game_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CatalogError::InvalidInput(format!(
            "game URL must be http(s): {:?}",
            game_url
        )));
    }
    if min_age > max_age {
        return Err(CatalogError::InvalidInput(format!(
            "minAge {} is greater than maxAge {}",
            min_age, max_age
        )));
    }
    Ok(())
}

/// Input for ingesting a game
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub game_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    pub min_age: u32,
    pub max_age: u32,
    #[serde(default)]
    pub pricing_model: PricingModel,
    #[serde(default)]
    pub pricing_note: Option<String>,
    #[serde(default)]
    pub session_length: Option<SessionLength>,
    #[serde(default)]
    pub works_offline: bool,
    #[serde(default)]
    pub supports_multiple_profiles: bool,
    #[serde(default)]
    pub requires_account: bool,
    #[serde(flatten)]
    pub safety: SafetyFlags,
    pub trust_tier: TrustTier,
    pub quality_confidence: QualityConfidence,
    #[serde(flatten)]
    pub assigned_badges: AssignedBadges,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl NewGame {
    /// Minimal input; everything optional left at its default
    pub fn new(
        title: &str,
        game_url: &str,
        min_age: u32,
        max_age: u32,
        trust_tier: TrustTier,
        quality_confidence: QualityConfidence,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            game_url: game_url.to_string(),
            thumbnail_url: None,
            source_name: None,
            min_age,
            max_age,
            pricing_model: PricingModel::Free,
            pricing_note: None,
            session_length: None,
            works_offline: false,
            supports_multiple_profiles: false,
            requires_account: false,
            safety: SafetyFlags::default(),
            trust_tier,
            quality_confidence,
            assigned_badges: AssignedBadges::default(),
            categories: vec![],
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_fields(&self.title, &self.game_url, self.min_age, self.max_age)
    }
}

/// Partial update from a curator.
///
/// Trust tier is fixed at ingestion and approval has its own operation, so
/// neither appears here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub game_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
    #[serde(default)]
    pub pricing_model: Option<PricingModel>,
    #[serde(default)]
    pub pricing_note: Option<String>,
    #[serde(default)]
    pub session_length: Option<SessionLength>,
    #[serde(default)]
    pub works_offline: Option<bool>,
    #[serde(default)]
    pub supports_multiple_profiles: Option<bool>,
    #[serde(default)]
    pub requires_account: Option<bool>,
    /// Flags present here overwrite the stored ones
    #[serde(flatten)]
    pub safety: SafetyFlags,
    #[serde(default)]
    pub quality_confidence: Option<QualityConfidence>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

impl GamePatch {
    fn apply_to(self, record: &mut GameRecord) {
        if let Some(title) = self.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(url) = self.game_url {
            record.game_url = url.trim().to_string();
        }
        if let Some(thumbnail) = self.thumbnail_url {
            record.thumbnail_url = Some(thumbnail);
        }
        if let Some(source) = self.source_name {
            record.source_name = Some(source);
        }
        if let Some(min_age) = self.min_age {
            record.min_age = min_age;
        }
        if let Some(max_age) = self.max_age {
            record.max_age = max_age;
        }
        if let Some(pricing) = self.pricing_model {
            record.pricing_model = pricing;
        }
        if let Some(note) = self.pricing_note {
            record.pricing_note = Some(note);
        }
        if let Some(length) = self.session_length {
            record.session_length = Some(length);
        }
        if let Some(offline) = self.works_offline {
            record.works_offline = offline;
        }
        if let Some(profiles) = self.supports_multiple_profiles {
            record.supports_multiple_profiles = profiles;
        }
        if let Some(account) = self.requires_account {
            record.requires_account = account;
        }
        for gate in crate::curation::Gate::ALL {
            if let Some(value) = self.safety.get(gate) {
                record.safety.set(gate, Some(value));
            }
        }
        if let Some(confidence) = self.quality_confidence {
            record.quality_confidence = confidence;
        }
        if let Some(mut categories) = self.categories {
            categories.sort();
            categories.dedup();
            record.categories = categories;
        }
    }
}

/// An active game's id and URL, as handed to the link monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub id: String,
    pub game_url: String,
}

// ============================================================================
// Reads
// ============================================================================

pub fn get_game(conn: &Connection, id: &str) -> Result<Option<GameRecord>, CatalogError> {
    query_one(conn, "SELECT * FROM games WHERE id = ?", id)
}

/// Publicly visible game by slug
pub fn get_active_game_by_slug(
    conn: &Connection,
    slug: &str,
) -> Result<Option<GameRecord>, CatalogError> {
    query_one(conn, "SELECT * FROM games WHERE slug = ? AND is_active = 1", slug)
}

fn query_one(conn: &Connection, sql: &str, key: &str) -> Result<Option<GameRecord>, CatalogError> {
    let record = conn
        .query_row(sql, params![key], GameRecord::from_row)
        .optional()?;

    match record {
        Some(mut record) => {
            record.categories = get_game_categories(conn, &record.id)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

pub(crate) fn get_game_categories(
    conn: &Connection,
    game_id: &str,
) -> Result<Vec<Category>, CatalogError> {
    let mut stmt =
        conn.prepare("SELECT category FROM game_categories WHERE game_id = ? ORDER BY category")?;

    let mut categories = stmt
        .query_map(params![game_id], |row| row.get::<_, Category>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    categories.sort();

    Ok(categories)
}

/// Run a `SELECT * FROM games ...` query and attach categories
pub(crate) fn query_games(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<GameRecord>, CatalogError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, GameRecord::from_row)?;

    let mut results = vec![];
    for row in rows {
        let mut record = row?;
        record.categories = get_game_categories(conn, &record.id)?;
        results.push(record);
    }

    Ok(results)
}

/// Active games from any of the given tiers
pub fn active_games_in_tiers(
    conn: &Connection,
    tiers: &[TrustTier],
) -> Result<Vec<GameRecord>, CatalogError> {
    if tiers.is_empty() {
        return Ok(vec![]);
    }
    let placeholders: Vec<_> = tiers.iter().map(|_| "?").collect();
    let sql = format!(
        "SELECT * FROM games WHERE is_active = 1 AND trust_tier IN ({}) ORDER BY created_at DESC, rowid DESC",
        placeholders.join(", ")
    );
    let params: Vec<&dyn rusqlite::ToSql> = tiers.iter().map(|t| t as &dyn rusqlite::ToSql).collect();
    query_games(conn, &sql, &params)
}

/// Newest active games in an age band, excluding one game
pub fn active_games_in_age_group(
    conn: &Connection,
    age_group: AgeGroup,
    exclude_id: &str,
    limit: u32,
) -> Result<Vec<GameRecord>, CatalogError> {
    query_games(
        conn,
        "SELECT * FROM games WHERE is_active = 1 AND age_group = ? AND id <> ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        &[&age_group, &exclude_id, &limit],
    )
}

/// Games still waiting for enhancement copy
pub fn games_missing_copy(conn: &Connection) -> Result<Vec<GameRecord>, CatalogError> {
    query_games(
        conn,
        "SELECT * FROM games WHERE short_description IS NULL OR why_we_picked IS NULL ORDER BY created_at, rowid",
        &[],
    )
}

pub fn active_link_targets(conn: &Connection) -> Result<Vec<LinkTarget>, CatalogError> {
    let mut stmt =
        conn.prepare("SELECT id, game_url FROM games WHERE is_active = 1 ORDER BY created_at, rowid")?;
    let targets = stmt
        .query_map([], |row| {
            Ok(LinkTarget {
                id: row.get(0)?,
                game_url: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(targets)
}

// ============================================================================
// Slugs
// ============================================================================

fn base_slug(title: &str) -> String {
    let slug = generate_slug(title);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// First of `base`, `base-2`, `base-3`, ... not used by another game.
/// The game identified by `exclude_id` may keep its own slug.
pub fn ensure_unique_slug(
    conn: &Connection,
    base: &str,
    exclude_id: Option<&str>,
) -> Result<String, CatalogError> {
    first_free_slug(conn, base, SlugCandidates::new(base), exclude_id)
}

fn first_free_slug(
    conn: &Connection,
    base: &str,
    candidates: SlugCandidates,
    exclude_id: Option<&str>,
) -> Result<String, CatalogError> {
    for candidate in candidates.take(MAX_SLUG_ATTEMPTS) {
        let owner: Option<String> = conn
            .query_row("SELECT id FROM games WHERE slug = ?", params![candidate], |row| row.get(0))
            .optional()?;

        match owner {
            None => return Ok(candidate),
            Some(id) if Some(id.as_str()) == exclude_id => return Ok(candidate),
            Some(_) => continue,
        }
    }

    Err(CatalogError::Conflict(format!("No free slug for {:?}", base)))
}

fn is_slug_conflict(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg)) => {
            err.code == ErrorCode::ConstraintViolation && msg.contains("games.slug")
        }
        _ => false,
    }
}

/// Save `record` under the first free slug derived from `base`.
///
/// The `UNIQUE` index is the arbiter: if another writer claims the chosen
/// candidate first, the insert is rejected and the next candidate is tried.
fn save_with_unique_slug(
    conn: &Connection,
    base: &str,
    record: &mut GameRecord,
) -> Result<(), CatalogError> {
    let candidate = ensure_unique_slug(conn, base, Some(&record.id))?;
    claim_slug(conn, base, candidate, record)
}

/// Insert `record` under `candidate`, moving down the candidate chain while
/// the `UNIQUE` index rejects it.
fn claim_slug(
    conn: &Connection,
    base: &str,
    mut candidate: String,
    record: &mut GameRecord,
) -> Result<(), CatalogError> {
    for _ in 0..MAX_SLUG_ATTEMPTS {
        record.slug = candidate.clone();
        match save_game_row(conn, record) {
            Ok(()) => return Ok(()),
            Err(e) if is_slug_conflict(&e) => {
                debug!(slug = %candidate, "Slug claimed concurrently, trying next candidate");
                candidate = first_free_slug(
                    conn,
                    base,
                    SlugCandidates::starting_after(base, &candidate),
                    Some(&record.id),
                )?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CatalogError::Conflict(format!("No free slug for {:?}", base)))
}

// ============================================================================
// Writes
// ============================================================================

const GAME_COLUMNS: [&str; 41] = [
    "id",
    "slug",
    "title",
    "description",
    "short_description",
    "why_we_picked",
    "game_url",
    "thumbnail_url",
    "source_name",
    "min_age",
    "max_age",
    "age_group",
    "pricing_model",
    "pricing_note",
    "session_length",
    "works_offline",
    "supports_multiple_profiles",
    "requires_account",
    "has_no_in_game_ads",
    "has_respectful_monetization",
    "has_no_contact_with_strangers",
    "has_no_manipulative_design",
    "is_age_appropriate",
    "passes_gate_criteria",
    "trust_tier",
    "quality_confidence",
    "manually_approved",
    "is_active",
    "link_status",
    "consecutive_link_failures",
    "last_link_check",
    "badge_educational",
    "badge_creative",
    "badge_popular",
    "badge_polished",
    "badge_trusted_source",
    "badge_offline_friendly",
    "badge_quick_play",
    "badge_sibling_friendly",
    "created_at",
    "updated_at",
];

static UPSERT_GAME: Lazy<String> = Lazy::new(|| {
    let values: Vec<String> = GAME_COLUMNS.iter().map(|c| format!(":{}", c)).collect();
    let updates: Vec<String> = GAME_COLUMNS
        .iter()
        .filter(|c| !matches!(**c, "id" | "created_at"))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    format!(
        "INSERT INTO games ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        GAME_COLUMNS.join(", "),
        values.join(", "),
        updates.join(", ")
    )
});

fn save_game_row(conn: &Connection, record: &GameRecord) -> Result<(), rusqlite::Error> {
    conn.execute(
        UPSERT_GAME.as_str(),
        named_params! {
            ":id": record.id,
            ":slug": record.slug,
            ":title": record.title,
            ":description": record.description,
            ":short_description": record.short_description,
            ":why_we_picked": record.why_we_picked,
            ":game_url": record.game_url,
            ":thumbnail_url": record.thumbnail_url,
            ":source_name": record.source_name,
            ":min_age": record.min_age,
            ":max_age": record.max_age,
            ":age_group": record.age_group,
            ":pricing_model": record.pricing_model,
            ":pricing_note": record.pricing_note,
            ":session_length": record.session_length,
            ":works_offline": record.works_offline,
            ":supports_multiple_profiles": record.supports_multiple_profiles,
            ":requires_account": record.requires_account,
            ":has_no_in_game_ads": record.safety.has_no_in_game_ads,
            ":has_respectful_monetization": record.safety.has_respectful_monetization,
            ":has_no_contact_with_strangers": record.safety.has_no_contact_with_strangers,
            ":has_no_manipulative_design": record.safety.has_no_manipulative_design,
            ":is_age_appropriate": record.safety.is_age_appropriate,
            ":passes_gate_criteria": record.passes_gate_criteria,
            ":trust_tier": record.trust_tier,
            ":quality_confidence": record.quality_confidence,
            ":manually_approved": record.manually_approved,
            ":is_active": record.is_active,
            ":link_status": record.link_status,
            ":consecutive_link_failures": record.consecutive_link_failures,
            ":last_link_check": record.last_link_check.as_ref().map(timestamp),
            ":badge_educational": record.badges.educational,
            ":badge_creative": record.badges.creative,
            ":badge_popular": record.badges.popular,
            ":badge_polished": record.badges.polished,
            ":badge_trusted_source": record.badges.trusted_source,
            ":badge_offline_friendly": record.badges.offline_friendly,
            ":badge_quick_play": record.badges.quick_play,
            ":badge_sibling_friendly": record.badges.sibling_friendly,
            ":created_at": timestamp(&record.created_at),
            ":updated_at": timestamp(&record.updated_at),
        },
    )?;
    Ok(())
}

fn replace_categories(
    conn: &Connection,
    game_id: &str,
    categories: &[Category],
) -> Result<(), CatalogError> {
    conn.execute("DELETE FROM game_categories WHERE game_id = ?", params![game_id])?;
    for category in categories {
        conn.execute(
            "INSERT OR IGNORE INTO game_categories (game_id, category) VALUES (?, ?)",
            params![game_id, category],
        )?;
    }
    Ok(())
}

/// Ingest a new game, deriving every curation field
pub fn create_game(
    conn: &mut Connection,
    input: NewGame,
    mode: SystemMode,
) -> Result<GameRecord, CatalogError> {
    input.validate()?;

    let mut record = GameRecord::from_new(input, now());
    record.refresh_derived(mode);
    let base = base_slug(&record.title);

    // IMMEDIATE takes the write lock up front so check-then-insert is serialized
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    save_with_unique_slug(&tx, &base, &mut record)?;
    replace_categories(&tx, &record.id, &record.categories)?;
    tx.commit()?;

    info!(
        game_id = %record.id,
        slug = %record.slug,
        is_active = record.is_active,
        passes_gates = record.passes_gate_criteria,
        "Created game"
    );

    Ok(record)
}

/// Apply a curator's patch and recompute derived fields
pub fn update_game(
    conn: &mut Connection,
    id: &str,
    patch: GamePatch,
    mode: SystemMode,
) -> Result<GameRecord, CatalogError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut record = get_game(&tx, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    let previous_title = record.title.clone();
    let previous_url = record.game_url.clone();

    patch.apply_to(&mut record);
    record.validate()?;

    if record.game_url != previous_url {
        // New URL, fresh link history
        record.link_status = LinkStatus::Unknown;
        record.consecutive_link_failures = 0;
        record.last_link_check = None;
    }

    record.updated_at = now();
    record.refresh_derived(mode);

    if record.title != previous_title {
        let base = base_slug(&record.title);
        save_with_unique_slug(&tx, &base, &mut record)?;
    } else {
        save_game_row(&tx, &record)?;
    }
    replace_categories(&tx, &record.id, &record.categories)?;
    tx.commit()?;

    info!(game_id = %record.id, is_active = record.is_active, "Updated game");
    Ok(record)
}

/// Record a reviewer's approval and re-run the activation policy
pub fn approve_game(
    conn: &mut Connection,
    id: &str,
    mode: SystemMode,
) -> Result<GameRecord, CatalogError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut record = get_game(&tx, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    record.manually_approved = true;
    record.updated_at = now();
    record.refresh_derived(mode);
    save_game_row(&tx, &record)?;

    curation_log::append(
        &tx,
        &NewLogEntry {
            game_id: Some(record.id.clone()),
            action: CurationAction::Approved,
            source: CurationSource::Manual,
            details: serde_json::json!({
                "mode": mode,
                "decision": record.activation(mode),
                "isActive": record.is_active,
            }),
            success: true,
        },
    )?;
    tx.commit()?;

    info!(game_id = %record.id, is_active = record.is_active, "Approved game");
    Ok(record)
}

/// Store copy and badge suggestions from the enhancement collaborator
pub fn apply_enhancement(
    conn: &mut Connection,
    id: &str,
    enhancement: &Enhancement,
) -> Result<GameRecord, CatalogError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut record = get_game(&tx, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    record.short_description = Some(enhancement.short_description.clone());
    record.why_we_picked = Some(enhancement.why_we_picked.clone());
    record.badges = compute_badges(&record.badge_inputs(), &enhancement.assigned_badges());
    record.updated_at = now();
    save_game_row(&tx, &record)?;

    curation_log::append(
        &tx,
        &NewLogEntry {
            game_id: Some(record.id.clone()),
            action: CurationAction::Enhanced,
            source: CurationSource::Ai,
            details: serde_json::to_value(enhancement)?,
            success: true,
        },
    )?;
    tx.commit()?;

    debug!(game_id = %record.id, "Applied enhancement");
    Ok(record)
}

/// Fold one probe result into a game's link health.
///
/// Only ever turns `is_active` off; see [`LinkHealth::after_probe`].
pub fn record_link_probe(
    conn: &mut Connection,
    id: &str,
    ok: bool,
    checked_at: DateTime<Utc>,
) -> Result<LinkHealth, CatalogError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = tx
        .query_row(
            "SELECT link_status, consecutive_link_failures, is_active FROM games WHERE id = ?",
            params![id],
            |row| {
                Ok(LinkHealth {
                    status: row.get(0)?,
                    consecutive_failures: row.get(1)?,
                    is_active: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

    let next = current.after_probe(ok);

    tx.execute(
        "UPDATE games SET link_status = ?, consecutive_link_failures = ?, is_active = ?, last_link_check = ? WHERE id = ?",
        params![
            next.status,
            next.consecutive_failures,
            next.is_active,
            timestamp(&checked_at),
            id
        ],
    )?;
    tx.commit()?;

    Ok(next)
}
