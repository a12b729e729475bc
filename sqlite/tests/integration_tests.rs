//! Integration tests for the interview-deck-sqlite crate.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use interview_deck_core::{Direction, SeedCategory, SeedPackage, SeedQuestion, UserStats};
use interview_deck_db::SeedDatabase;
use interview_deck_sqlite::{
    Gateway, QuestionBank, SchemaManager, Session, SessionConfig, SqliteError, queries,
};
use rusqlite::params;

/// Builds a seed with two populated categories and one empty one.
fn sample_package() -> SeedPackage {
    let mut package = SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z");
    package.name = Some("sample".to_string());

    for (id, name, day) in [(1, "Java Basics", 1), (2, "Concurrency", 2), (3, "Empty", 3)] {
        package.categories.push(SeedCategory {
            id,
            name: name.to_string(),
            create_time: format!("2024-01-0{day} 00:00:00"),
        });
    }

    let mut next_id = 1;
    for (category_id, count) in [(1, 4), (2, 3)] {
        for n in 1..=count {
            package.questions.push(SeedQuestion {
                id: next_id,
                category_id,
                uri: format!("https://example.com/{category_id}/{n}"),
                title: format!("Question {category_id}.{n}"),
                answer: Some(format!("Answer {category_id}.{n}")),
                sort_order: n * 10,
                create_time: "2024-01-01 00:00:00".to_string(),
            });
            next_id += 1;
        }
    }
    package
}

struct Fixture {
    _dir: tempfile::TempDir,
    session: Arc<Session>,
    manager: SchemaManager,
    bank: QuestionBank,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(Session::new(SessionConfig::new(
        "integration",
        dir.path().join("deck.db"),
    )));
    let manager = SchemaManager::new(Gateway::new(Arc::clone(&session)));
    let bank = QuestionBank::new(Arc::clone(&session));
    Fixture {
        _dir: dir,
        session,
        manager,
        bank,
    }
}

fn seeded() -> Fixture {
    let fx = fixture();
    fx.manager.ensure_schema(&sample_package()).unwrap();
    fx
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[test]
fn test_ensure_schema_from_seed_directory() {
    let seed_dir = tempfile::tempdir().unwrap();
    SeedDatabase::from_package(sample_package())
        .write_dir(seed_dir.path())
        .unwrap();
    let seed = SeedDatabase::from_dir(seed_dir.path()).unwrap();

    let fx = fixture();
    let report = fx.manager.ensure_schema(seed.package()).unwrap();
    assert_eq!(report.tables_created.len(), 2);
    assert_eq!(report.seed.categories_inserted, 3);
    assert_eq!(report.seed.questions_inserted, 7);
    assert!(!fx.session.is_open());
}

#[test]
fn test_ensure_schema_twice_leaves_contents_unchanged() {
    let fx = seeded();
    fx.bank.mark_learned(1);
    fx.bank.toggle_favorite(2);
    let before = fx.manager.status().unwrap();

    let report = fx.manager.ensure_schema(&sample_package()).unwrap();
    assert!(report.is_noop());
    assert_eq!(fx.manager.status().unwrap(), before);
}

#[test]
fn test_ensure_schema_reimports_emptied_questions() {
    let fx = seeded();
    fx.manager
        .gateway()
        .unit_of_work(|gw| gw.execute("DELETE FROM question_map", []))
        .unwrap();

    let report = fx.manager.ensure_schema(&sample_package()).unwrap();
    assert!(report.tables_created.is_empty());
    assert_eq!(report.seed.categories_inserted, 0);
    assert_eq!(report.seed.questions_inserted, 7);
}

#[test]
fn test_reset_schema_matches_seed_counts() {
    let fx = seeded();
    fx.bank.mark_learned(3);
    fx.bank.toggle_favorite(4);

    let report = fx.manager.reset_schema(&sample_package()).unwrap();
    assert_eq!(report.categories_inserted, 3);
    assert_eq!(report.questions_inserted, 7);

    let status = fx.manager.status().unwrap();
    assert_eq!(status.category_count, 3);
    assert_eq!(status.question_count, 7);
    assert_eq!(status.learned_count, 0);
    assert_eq!(status.favorite_count, 0);
}

#[test]
fn test_invalid_seed_aborts_bootstrap() {
    let fx = fixture();
    let mut package = sample_package();
    package.questions[1].sort_order = package.questions[0].sort_order;

    let err = fx.manager.ensure_schema(&package).unwrap_err();
    assert!(matches!(err, SqliteError::ImportError(_)));
    assert!(!fx.manager.status().unwrap().tables_exist);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[test]
fn test_completed_never_exceeds_question_count() {
    let fx = seeded();
    for id in [1, 2, 5] {
        fx.bank.mark_learned(id);
    }
    for category in fx.bank.categories() {
        assert!(category.completed_count <= category.question_count);
    }
    let java = &fx.bank.categories()[0];
    assert_eq!((java.completed_count, java.question_count), (2, 4));
}

#[test]
fn test_categories_ordered_by_create_time() {
    let fx = seeded();
    let names: Vec<String> = fx.bank.categories().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Java Basics", "Concurrency", "Empty"]);
}

#[test]
fn test_adjacent_walk_returns_to_start() {
    let fx = seeded();
    let next = fx.bank.adjacent_question(2, 1, Direction::Next).unwrap();
    let back = fx
        .bank
        .adjacent_question(next.id, 1, Direction::Prev)
        .unwrap();
    assert_eq!(back.id, 2);
}

#[test]
fn test_adjacent_stays_within_category() {
    let fx = seeded();
    // Question 4 is the last of category 1; question 5 opens category 2.
    assert!(fx.bank.adjacent_question(4, 1, Direction::Next).is_none());
    assert!(fx.bank.adjacent_question(5, 2, Direction::Prev).is_none());
}

#[test]
fn test_toggle_favorite_twice_restores_state() {
    let fx = seeded();
    let before = fx.bank.question_detail(6).unwrap().question;
    assert!(fx.bank.toggle_favorite(6));
    assert!(fx.bank.toggle_favorite(6));
    let after = fx.bank.question_detail(6).unwrap().question;
    assert_eq!(after.is_favorite, before.is_favorite);
    assert!(after.favorite_time.is_none());
}

#[test]
fn test_recent_questions_carry_category_name() {
    let fx = seeded();
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    fx.bank.mark_learned_at(1, base);
    fx.bank.mark_learned_at(6, base + Duration::hours(1));

    let recent = fx.bank.recent_questions(None);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].question.id, 6);
    assert_eq!(recent[0].category_name.as_deref(), Some("Concurrency"));
    assert_eq!(recent[1].category_name.as_deref(), Some("Java Basics"));
}

#[test]
fn test_user_stats_on_empty_tables() {
    let fx = fixture();
    fx.manager.up().unwrap();
    assert_eq!(fx.bank.user_stats(), UserStats::default());
}

#[test]
fn test_fallible_queries_surface_errors() {
    let fx = fixture();
    let result = fx.bank.run(|gw| queries::question_detail(gw, 1));
    assert!(matches!(result, Err(SqliteError::StatementError(_))));
    assert!(!fx.session.is_open());
}

#[test]
fn test_timestamps_stored_as_text() {
    let fx = seeded();
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    fx.bank.mark_learned_at(1, at);

    let stored = fx
        .bank
        .run(|gw| {
            gw.query(
                "SELECT learn_time FROM question_map WHERE id = ?1",
                params![1],
                |row| row.get::<_, String>(0),
            )
        })
        .unwrap();
    assert_eq!(stored, vec!["2024-03-01 08:30:00.000"]);
}

// ---------------------------------------------------------------------------
// Session sharing
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_banks_share_one_session() {
    let fx = seeded();
    let bank = fx.bank.clone();

    let handles: Vec<_> = (1..=7)
        .map(|id| {
            let bank = bank.clone();
            thread::spawn(move || bank.mark_learned(id))
        })
        .collect();
    let marked = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    // Overlapping units of work can close the handle under one another.
    // A write either lands or reports false; it never half-applies.
    assert!(marked >= 1);
    assert_eq!(fx.bank.user_stats().completed as usize, marked);
    assert!(!fx.session.is_open());
}

#[test]
fn test_gateway_reopens_closed_session() {
    let fx = seeded();
    let gateway = Gateway::new(Arc::clone(&fx.session));
    assert!(!fx.session.is_open());
    let opens_before = fx.session.open_count();

    let titles = gateway
        .query(
            "SELECT title FROM question_map WHERE category_id = ?1 ORDER BY sort_order",
            params![2],
            |row| row.get::<_, String>(0),
        )
        .unwrap();
    assert_eq!(titles.len(), 3);
    assert_eq!(fx.session.open_count(), opens_before + 1);
}
