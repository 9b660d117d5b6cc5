//! Featured, related and detail read models for the public site

use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;

use crate::curation::{
    count_badges, format_age_range, get_active_badges, AgeGroup, Badge, Category, TrustTier,
};
use crate::db::games::{active_games_in_age_group, active_games_in_tiers, get_active_game_by_slug};
use crate::db::GameRecord;
use crate::error::CatalogError;

pub const DEFAULT_FEATURED_COUNT: usize = 4;
pub const RELATED_COUNT: usize = 4;
const RELATED_CANDIDATES: u32 = 20;
const FEATURED_MIN_BADGES: usize = 3;

/// Homepage picks from TIER_1/TIER_2 sources.
///
/// Games with at least three badges are preferred when there are enough of
/// them to fill the request; otherwise the whole pool is used.
pub fn featured_games<R: Rng + ?Sized>(
    conn: &Connection,
    count: usize,
    rng: &mut R,
) -> Result<Vec<GameRecord>, CatalogError> {
    let pool = active_games_in_tiers(conn, &[TrustTier::Tier1, TrustTier::Tier2])?;

    let high_quality: Vec<GameRecord> = pool
        .iter()
        .filter(|g| count_badges(&g.badges) >= FEATURED_MIN_BADGES)
        .cloned()
        .collect();

    let mut candidates = if high_quality.len() >= count {
        high_quality
    } else {
        pool
    };

    candidates.shuffle(rng);
    candidates.truncate(count);
    Ok(candidates)
}

/// Same-age-group games ordered by shared categories.
///
/// Ties keep the newest-first order of the candidate query.
pub fn related_games(
    conn: &Connection,
    game: &GameRecord,
    count: usize,
) -> Result<Vec<GameRecord>, CatalogError> {
    let candidates = active_games_in_age_group(conn, game.age_group, &game.id, RELATED_CANDIDATES)?;

    let mut scored: Vec<(usize, GameRecord)> = candidates
        .into_iter()
        .map(|g| (category_overlap(&game.categories, &g.categories), g))
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(scored.into_iter().take(count).map(|(_, g)| g).collect())
}

fn category_overlap(a: &[Category], b: &[Category]) -> usize {
    a.iter().filter(|c| b.contains(c)).count()
}

/// Badge with its display info
#[derive(Debug, Clone, Serialize)]
pub struct BadgeInfo {
    pub key: Badge,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl From<Badge> for BadgeInfo {
    fn from(badge: Badge) -> Self {
        Self {
            key: badge,
            label: badge.label(),
            icon: badge.icon(),
            description: badge.description(),
        }
    }
}

/// Everything the game page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    pub game: GameRecord,
    pub badges: Vec<BadgeInfo>,
    pub age_range: String,
    pub related: Vec<GameRecord>,
}

/// Detail for an active game, `None` when missing or inactive
pub fn game_detail(conn: &Connection, slug: &str) -> Result<Option<GameDetail>, CatalogError> {
    let Some(game) = get_active_game_by_slug(conn, slug)? else {
        return Ok(None);
    };

    let related = related_games(conn, &game, RELATED_COUNT)?;
    Ok(Some(GameDetail {
        badges: get_active_badges(&game.badges).into_iter().map(BadgeInfo::from).collect(),
        age_range: format_age_range(game.min_age, game.max_age),
        related,
        game,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeGroupInfo {
    pub key: AgeGroup,
    pub label: &'static str,
    pub range: &'static str,
    pub description: &'static str,
}

pub fn age_groups() -> Vec<AgeGroupInfo> {
    AgeGroup::ALL
        .iter()
        .map(|g| AgeGroupInfo {
            key: *g,
            label: g.label(),
            range: g.range(),
            description: g.description(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub key: Category,
    pub name: &'static str,
    pub icon: &'static str,
}

pub fn categories() -> Vec<CategoryInfo> {
    Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            key: *c,
            name: c.name(),
            icon: c.icon(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_overlap() {
        let a = [Category::Puzzle, Category::Music, Category::Counting];
        assert_eq!(category_overlap(&a, &[Category::Music, Category::Counting]), 2);
        assert_eq!(category_overlap(&a, &[Category::Coloring]), 0);
        assert_eq!(category_overlap(&[], &a), 0);
    }

    #[test]
    fn test_taxonomy_listings_cover_all_keys() {
        assert_eq!(age_groups().len(), 5);
        assert_eq!(age_groups()[0].range, AgeGroup::Baby.range());
        assert_eq!(categories().len(), Category::ALL.len());
    }
}
