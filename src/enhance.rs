//! Copy enhancement boundary
//!
//! Short descriptions, "why we picked it" text and the four assigned badges
//! come from an external text-generation service. Its answers are taken as
//! given once they have the right shape.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::curation::AssignedBadges;
use crate::db::games::{apply_enhancement, games_missing_copy, GameRecord};
use crate::db::CatalogDb;
use crate::error::CatalogError;

/// Structured answer from the enhancement service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Enhancement {
    pub short_description: String,
    pub why_we_picked: String,
    pub badge_educational: bool,
    pub badge_creative: bool,
    pub badge_popular: bool,
    pub badge_polished: bool,
}

impl Enhancement {
    /// Parse a raw JSON answer; every field must be present with its type
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(raw.trim())
            .map_err(|e| CatalogError::InvalidInput(format!("Malformed enhancement: {}", e)))
    }

    pub fn assigned_badges(&self) -> AssignedBadges {
        AssignedBadges {
            educational: Some(self.badge_educational),
            creative: Some(self.badge_creative),
            popular: Some(self.badge_popular),
            polished: Some(self.badge_polished),
        }
    }
}

/// The external enhancement service
#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn enhance(&self, game: &GameRecord) -> anyhow::Result<Enhancement>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnhanceSummary {
    pub enhanced: u32,
    pub failed: u32,
}

/// Enhance every game still missing copy, pausing between calls.
///
/// A failed game is counted and skipped; only store errors abort.
pub async fn enhance_pending(
    db: Arc<CatalogDb>,
    enhancer: &dyn Enhancer,
    pause: Duration,
) -> Result<EnhanceSummary, CatalogError> {
    let pending = db.with_conn(games_missing_copy)?;
    info!(count = pending.len(), "Enhancing games without copy");

    let mut summary = EnhanceSummary::default();
    for (i, game) in pending.iter().enumerate() {
        if i > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        match enhancer.enhance(game).await {
            Ok(enhancement) => {
                db.with_conn_mut(|conn| apply_enhancement(conn, &game.id, &enhancement))?;
                summary.enhanced += 1;
            }
            Err(e) => {
                warn!(game_id = %game.id, title = %game.title, error = %e, "Enhancement failed");
                summary.failed += 1;
            }
        }
    }

    info!(enhanced = summary.enhanced, failed = summary.failed, "Enhancement run complete");
    Ok(summary)
}
