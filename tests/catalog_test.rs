//! Store, read model and curation path integration tests

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{insert, publishable, with_categories};
use playguide::curation::{
    AgeGroup, AssignedBadges, Category, LinkStatus, PricingModel, QualityConfidence, SessionLength,
    SystemMode, TrustTier,
};
use playguide::db::curation_log::{self, CurationAction, CurationSource};
use playguide::db::games::{self, record_link_probe, GamePatch};
use playguide::db::listing::{list_active_games, ListingFilter, ListingParams};
use playguide::db::GameRecord;
use playguide::discovery::{featured_games, game_detail, related_games};
use playguide::enhance::{enhance_pending, Enhancement, Enhancer};
use playguide::CatalogDb;

fn listing(db: &CatalogDb, params: ListingParams) -> playguide::db::GamePage {
    db.with_conn(|conn| list_active_games(conn, &ListingFilter::from(&params)))
        .unwrap()
}

fn titles(games: &[GameRecord]) -> Vec<&str> {
    games.iter().map(|g| g.title.as_str()).collect()
}

#[test]
fn test_listing_only_shows_active_newest_first() {
    let db = CatalogDb::open_in_memory().unwrap();
    insert(&db, publishable("First", 3, 5));
    let mut hidden = publishable("Hidden", 3, 5);
    hidden.quality_confidence = QualityConfidence::Low;
    insert(&db, hidden);
    insert(&db, publishable("Second", 3, 5));

    let page = listing(&db, ListingParams::default());
    assert_eq!(titles(&page.games), vec!["Second", "First"]);
    assert_eq!(page.total, 2);
    assert!(!page.has_more);
}

#[test]
fn test_listing_pagination() {
    let db = CatalogDb::open_in_memory().unwrap();
    for i in 0..5 {
        insert(&db, publishable(&format!("Game {}", i), 3, 5));
    }

    let first = listing(
        &db,
        ListingParams {
            limit: Some("2".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&first.games), vec!["Game 4", "Game 3"]);
    assert!(first.has_more);
    assert_eq!(first.total, 5);

    let last = listing(
        &db,
        ListingParams {
            limit: Some("2".into()),
            offset: Some("4".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&last.games), vec!["Game 0"]);
    assert!(!last.has_more);

    let garbage = listing(
        &db,
        ListingParams {
            limit: Some("lots".into()),
            offset: Some("-1".into()),
            ..Default::default()
        },
    );
    assert_eq!(garbage.games.len(), 5);
}

#[test]
fn test_listing_filters() {
    let db = CatalogDb::open_in_memory().unwrap();

    let mut toddler = with_categories(publishable("Peekaboo Barn", 2, 4), &[Category::Music]);
    toddler.description = Some("Animals hide behind barn doors".into());
    insert(&db, toddler);

    let mut puzzle = with_categories(
        publishable("Shape Sorter", 3, 5),
        &[Category::Puzzle, Category::Matching],
    );
    puzzle.pricing_model = PricingModel::OneTime;
    insert(&db, puzzle);

    insert(
        &db,
        with_categories(publishable("Number Train", 6, 8), &[Category::Counting]),
    );

    let by_age = listing(
        &db,
        ListingParams {
            age_groups: Some("2-4,4-6,bogus".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&by_age.games), vec!["Shape Sorter", "Peekaboo Barn"]);

    let by_category = listing(
        &db,
        ListingParams {
            categories: Some("matching,counting".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&by_category.games), vec!["Number Train", "Shape Sorter"]);

    let paid = listing(
        &db,
        ListingParams {
            pricing: Some("paid".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&paid.games), vec!["Shape Sorter"]);

    let free = listing(
        &db,
        ListingParams {
            pricing: Some("free".into()),
            ..Default::default()
        },
    );
    assert_eq!(free.total, 2);

    let search = listing(
        &db,
        ListingParams {
            search: Some("BARN".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&search.games), vec!["Peekaboo Barn"]);

    let description_hit = listing(
        &db,
        ListingParams {
            search: Some("behind".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&description_hit.games), vec!["Peekaboo Barn"]);

    let too_short = listing(
        &db,
        ListingParams {
            search: Some("z".into()),
            ..Default::default()
        },
    );
    assert_eq!(too_short.total, 3);

    let wildcard = listing(
        &db,
        ListingParams {
            search: Some("%%".into()),
            ..Default::default()
        },
    );
    assert_eq!(wildcard.total, 0);
}

#[test]
fn test_search_folds_non_ascii_case() {
    let db = CatalogDb::open_in_memory().unwrap();
    insert(&db, publishable("ÉCOLE Letters", 4, 6));
    let mut described = publishable("Forest Walk", 4, 6);
    described.description = Some("Spot the ÜBER-tiny snails".into());
    insert(&db, described);
    insert(&db, publishable("Counting Bears", 4, 6));

    for query in ["ÉCOLE", "école", "École Let"] {
        let page = listing(
            &db,
            ListingParams {
                search: Some(query.into()),
                ..Default::default()
            },
        );
        assert_eq!(titles(&page.games), vec!["ÉCOLE Letters"], "query {:?}", query);
    }

    let description_hit = listing(
        &db,
        ListingParams {
            search: Some("über".into()),
            ..Default::default()
        },
    );
    assert_eq!(titles(&description_hit.games), vec!["Forest Walk"]);
}

#[test]
fn test_detail_and_related() {
    let db = CatalogDb::open_in_memory().unwrap();
    let main = insert(
        &db,
        with_categories(
            publishable("Main Game", 3, 5),
            &[Category::Puzzle, Category::Matching],
        ),
    );
    insert(&db, with_categories(publishable("Both", 4, 6), &[Category::Puzzle, Category::Matching]));
    insert(&db, with_categories(publishable("None", 4, 5), &[Category::Music]));
    insert(&db, with_categories(publishable("One", 3, 6), &[Category::Puzzle]));
    insert(&db, with_categories(publishable("Other Age", 8, 10), &[Category::Puzzle]));

    let related = db.with_conn(|conn| related_games(conn, &main, 4)).unwrap();
    assert_eq!(titles(&related), vec!["Both", "One", "None"]);

    let detail = db
        .with_conn(|conn| game_detail(conn, "main-game"))
        .unwrap()
        .unwrap();
    assert_eq!(detail.game.id, main.id);
    assert_eq!(detail.age_range, "Ages 3-5");
    assert_eq!(detail.related.len(), 3);
    assert!(detail.badges.iter().any(|b| b.label == "Trusted Source"));

    assert!(db
        .with_conn(|conn| game_detail(conn, "missing"))
        .unwrap()
        .is_none());
}

#[test]
fn test_inactive_game_has_no_public_detail() {
    let db = CatalogDb::open_in_memory().unwrap();
    let mut input = publishable("Unsafe", 3, 5);
    input.safety.has_no_in_game_ads = Some(false);
    let game = insert(&db, input);
    assert!(!game.is_active);

    assert!(db
        .with_conn(|conn| game_detail(conn, &game.slug))
        .unwrap()
        .is_none());
}

#[test]
fn test_featured_prefers_well_badged_games() {
    let db = CatalogDb::open_in_memory().unwrap();

    // TIER_1 + offline + quick = 3 badges
    for i in 0..4 {
        let mut input = publishable(&format!("Badged {}", i), 3, 5);
        input.works_offline = true;
        input.session_length = Some(SessionLength::Quick);
        insert(&db, input);
    }
    let mut plain = publishable("Plain", 3, 5);
    plain.trust_tier = TrustTier::Tier2;
    insert(&db, plain);

    let mut rng = StdRng::seed_from_u64(7);
    let featured = db
        .with_conn(|conn| featured_games(conn, 4, &mut rng))
        .unwrap();
    assert_eq!(featured.len(), 4);
    assert!(featured.iter().all(|g| g.title.starts_with("Badged")));

    // Not enough badged games for five slots: the whole pool is used
    let featured = db
        .with_conn(|conn| featured_games(conn, 5, &mut rng))
        .unwrap();
    assert_eq!(featured.len(), 5);
    assert!(featured.iter().any(|g| g.title == "Plain"));
}

#[test]
fn test_featured_excludes_tier_three() {
    let db = CatalogDb::open_in_memory().unwrap();
    let mut portal = publishable("Portal", 3, 5);
    portal.trust_tier = TrustTier::Tier3;
    insert(&db, portal);

    let mut rng = StdRng::seed_from_u64(1);
    let featured = db
        .with_conn(|conn| featured_games(conn, 4, &mut rng))
        .unwrap();
    assert!(featured.is_empty());
}

#[test]
fn test_link_deactivation_survives_update_and_approval() {
    let db = CatalogDb::open_in_memory().unwrap();
    let game = insert(&db, publishable("Flaky", 3, 5));

    for _ in 0..3 {
        db.with_conn_mut(|conn| record_link_probe(conn, &game.id, false, Utc::now()))
            .unwrap();
    }

    let dead = db
        .with_conn(|conn| games::get_game(conn, &game.id))
        .unwrap()
        .unwrap();
    assert!(!dead.is_active);
    assert_eq!(dead.link_status, LinkStatus::Broken);
    assert_eq!(dead.consecutive_link_failures, 3);
    assert!(dead.last_link_check.is_some());

    // Unrelated edits keep it down
    let patched = db
        .with_conn_mut(|conn| {
            games::update_game(
                conn,
                &game.id,
                GamePatch {
                    pricing_note: Some("Free".into()),
                    ..Default::default()
                },
                SystemMode::Bootstrap,
            )
        })
        .unwrap();
    assert!(!patched.is_active);

    let approved = db
        .with_conn_mut(|conn| games::approve_game(conn, &game.id, SystemMode::Bootstrap))
        .unwrap();
    assert!(!approved.is_active);

    // A new URL starts a fresh link history
    let moved = db
        .with_conn_mut(|conn| {
            games::update_game(
                conn,
                &game.id,
                GamePatch {
                    game_url: Some("https://games.example.org/flaky-v2".into()),
                    ..Default::default()
                },
                SystemMode::Bootstrap,
            )
        })
        .unwrap();
    assert!(moved.is_active);
    assert_eq!(moved.link_status, LinkStatus::Unknown);
    assert_eq!(moved.consecutive_link_failures, 0);
    assert!(moved.last_link_check.is_none());
}

#[test]
fn test_unrecognized_mode_never_activates() {
    let db = CatalogDb::open_in_memory().unwrap();
    let game = db
        .with_conn_mut(|conn| {
            games::create_game(conn, publishable("Strict", 3, 5), SystemMode::Unrecognized)
        })
        .unwrap();
    assert!(!game.is_active);

    let approved = db
        .with_conn_mut(|conn| games::approve_game(conn, &game.id, SystemMode::Unrecognized))
        .unwrap();
    assert!(!approved.is_active);
}

#[test]
fn test_concurrent_creates_get_distinct_slugs() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(CatalogDb::open(&dir.path().join("catalog.db")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            std::thread::spawn(move || insert(&db, publishable("Same Title", 3, 5)).slug)
        })
        .collect();

    let mut slugs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    slugs.sort();
    slugs.dedup();
    assert_eq!(slugs.len(), 8);
    assert!(slugs.contains(&"same-title".to_string()));
    assert!(slugs.contains(&"same-title-8".to_string()));
}

#[test]
fn test_on_disk_database_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("catalog.db");

    let id = {
        let db = CatalogDb::open(&path).unwrap();
        insert(&db, publishable("Persistent", 2, 4)).id
    };

    let db = CatalogDb::open(&path).unwrap();
    let game = db
        .with_conn(|conn| games::get_game(conn, &id))
        .unwrap()
        .unwrap();
    assert_eq!(game.age_group, AgeGroup::Toddler);
    assert_eq!(db.stats().unwrap().active_count, 1);
}

struct ScriptedEnhancer {
    fail_titles: Vec<&'static str>,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Enhancer for ScriptedEnhancer {
    async fn enhance(&self, game: &GameRecord) -> anyhow::Result<Enhancement> {
        self.seen.lock().unwrap().push(game.title.clone());
        if self.fail_titles.contains(&game.title.as_str()) {
            anyhow::bail!("model returned prose");
        }
        Ok(Enhancement {
            short_description: format!("{} in one line.", game.title),
            why_we_picked: "Simple controls for small hands.".into(),
            badge_educational: true,
            badge_creative: false,
            badge_popular: true,
            badge_polished: false,
        })
    }
}

#[tokio::test]
async fn test_enhance_pending_counts_and_logs() {
    let db = Arc::new(CatalogDb::open_in_memory().unwrap());
    let good = insert(&db, publishable("Good", 3, 5));
    insert(&db, publishable("Bad", 3, 5));

    let enhancer = ScriptedEnhancer {
        fail_titles: vec!["Bad"],
        seen: Mutex::new(vec![]),
    };

    let summary = enhance_pending(db.clone(), &enhancer, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(summary.enhanced, 1);
    assert_eq!(summary.failed, 1);

    let enhanced = db
        .with_conn(|conn| games::get_game(conn, &good.id))
        .unwrap()
        .unwrap();
    assert_eq!(enhanced.short_description.as_deref(), Some("Good in one line."));
    assert!(enhanced.badges.educational);
    assert!(enhanced.badges.popular);
    // Rule-derived badges are untouched
    assert!(enhanced.badges.trusted_source);

    let log = db.with_conn(|conn| curation_log::recent(conn, 10)).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, CurationAction::Enhanced);
    assert_eq!(log[0].source, CurationSource::Ai);
    assert_eq!(log[0].game_id.as_deref(), Some(good.id.as_str()));

    // Second run only retries the failure
    let summary = enhance_pending(db.clone(), &enhancer, Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(summary.enhanced, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        *enhancer.seen.lock().unwrap(),
        vec!["Good".to_string(), "Bad".to_string(), "Bad".to_string()]
    );
}

#[test]
fn test_assigned_badges_survive_field_updates() {
    let db = CatalogDb::open_in_memory().unwrap();
    let mut input = publishable("Paint Pad", 3, 5);
    input.assigned_badges = AssignedBadges {
        creative: Some(true),
        ..Default::default()
    };
    let game = insert(&db, input);
    assert!(game.badges.creative);
    assert!(!game.badges.offline_friendly);

    let updated = db
        .with_conn_mut(|conn| {
            games::update_game(
                conn,
                &game.id,
                GamePatch {
                    works_offline: Some(true),
                    ..Default::default()
                },
                SystemMode::Bootstrap,
            )
        })
        .unwrap();
    assert!(updated.badges.creative);
    assert!(updated.badges.offline_friendly);
}
