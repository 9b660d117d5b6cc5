//! Fixtures shared by the integration tests

#![allow(dead_code)]

use playguide::curation::{Category, QualityConfidence, SafetyFlags, SystemMode, TrustTier};
use playguide::db::games::create_game;
use playguide::db::{GameRecord, NewGame};
use playguide::CatalogDb;

/// Input that clears every gate from a TIER_1 source
pub fn publishable(title: &str, min_age: u32, max_age: u32) -> NewGame {
    let mut input = NewGame::new(
        title,
        &format!("https://games.example.org/{}", title.to_lowercase().replace(' ', "-")),
        min_age,
        max_age,
        TrustTier::Tier1,
        QualityConfidence::High,
    );
    input.safety = SafetyFlags::all_passing();
    input
}

pub fn with_categories(mut input: NewGame, categories: &[Category]) -> NewGame {
    input.categories = categories.to_vec();
    input
}

pub fn insert(db: &CatalogDb, input: NewGame) -> GameRecord {
    db.with_conn_mut(|conn| create_game(conn, input, SystemMode::Bootstrap))
        .expect("create game")
}
