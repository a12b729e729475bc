//! Database lifecycle and query library walkthrough.
//!
//! Writes a small seed directory, bootstraps a database from it, then reads
//! and updates study progress through the query library.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p interview-deck-demos --example deck_lifecycle
//! ```

use std::sync::Arc;

use interview_deck_core::{Direction, SeedCategory, SeedPackage, SeedQuestion};
use interview_deck_db::SeedDatabase;
use interview_deck_sqlite::{Gateway, QuestionBank, SchemaManager, Session, SessionConfig};

fn main() {
    let workdir = std::env::temp_dir().join("interview_deck_lifecycle_demo");
    let _ = std::fs::remove_dir_all(&workdir);
    std::fs::create_dir_all(&workdir).unwrap();

    // === Step 1: Write seed files ===
    let seed_dir = workdir.join("seed");
    SeedDatabase::from_package(sample_package())
        .write_dir(&seed_dir)
        .unwrap();
    let seed = SeedDatabase::from_dir(&seed_dir).unwrap();
    println!(
        "Seed: {} categories, {} questions",
        seed.package().category_count(),
        seed.package().question_count()
    );

    // === Step 2: Bootstrap ===
    println!("\n=== Bootstrap ===");
    let session = Arc::new(Session::new(SessionConfig::new(
        "demo",
        workdir.join("deck.db"),
    )));
    let manager = SchemaManager::new(Gateway::new(Arc::clone(&session)));
    let report = manager.ensure_schema(seed.package()).unwrap();
    println!("Tables created: {:?}", report.tables_created);
    println!("Questions inserted: {}", report.seed.questions_inserted);

    let again = manager.ensure_schema(seed.package()).unwrap();
    println!("Second ensure is a no-op: {}", again.is_noop());

    // === Step 3: Browse ===
    println!("\n=== Categories ===");
    let bank = QuestionBank::new(Arc::clone(&session));
    for category in bank.categories() {
        println!(
            "  {} {} ({} questions)",
            category.id, category.name, category.question_count
        );
    }

    let questions = bank.questions_by_category(1);
    println!("\n=== Category 1 ===");
    for question in &questions {
        println!("  [{}] {}", question.sort_order, question.title);
    }

    if let Some(next) = bank.adjacent_question(questions[0].id, 1, Direction::Next) {
        println!("After '{}' comes '{}'", questions[0].title, next.title);
    }

    // === Step 4: Track progress ===
    println!("\n=== Progress ===");
    bank.mark_learned(questions[0].id);
    bank.mark_learned(questions[1].id);
    bank.toggle_favorite(questions[1].id);

    let stats = bank.user_stats();
    println!(
        "Learned {}/{} ({:.0}%), {} favorite(s)",
        stats.completed,
        stats.total,
        stats.completion_rate(),
        stats.favorites
    );
    let progress = bank.category_progress(1);
    println!("Category 1: {}/{}", progress.completed, progress.total);

    for detail in bank.recent_questions(None) {
        println!(
            "  recently learned: {}",
            serde_json::to_string(&detail).unwrap()
        );
    }

    // === Step 5: Status and cleanup ===
    let status = manager.status().unwrap();
    println!(
        "\nStatus: {} categories, {} questions, {} learned",
        status.category_count, status.question_count, status.learned_count
    );
    manager.down().unwrap();
    println!("Tables dropped: {}", !manager.status().unwrap().tables_exist);

    std::fs::remove_dir_all(&workdir).unwrap();
}

fn sample_package() -> SeedPackage {
    let mut package = SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z");
    package.categories = vec![
        SeedCategory {
            id: 1,
            name: "Java Concurrency".into(),
            create_time: "2024-01-01 00:00:00".into(),
        },
        SeedCategory {
            id: 2,
            name: "Databases".into(),
            create_time: "2024-01-01 00:00:00".into(),
        },
    ];
    let titles = [
        (1, "What does volatile guarantee?"),
        (1, "How does synchronized work?"),
        (1, "When would you use a ReentrantLock?"),
        (2, "Explain transaction isolation levels"),
        (2, "What is a covering index?"),
    ];
    for (n, (category_id, title)) in titles.into_iter().enumerate() {
        let id = n as i64 + 1;
        package.questions.push(SeedQuestion {
            id,
            category_id,
            uri: format!("https://example.com/questions/{id}"),
            title: title.into(),
            answer: Some(format!("Answer to: {title}")),
            sort_order: id * 10,
            create_time: "2024-01-01 00:00:00".into(),
        });
    }
    package
}
