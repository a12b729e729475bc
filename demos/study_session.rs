//! View-state containers driving a study session.
//!
//! Seeds a database, then uses the category, question, and user stores the
//! way a front end would: pick a category, step through its questions, and
//! record progress. Snapshots land in a directory and are restored by a
//! second set of stores.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p interview-deck-demos --example study_session
//! ```

use std::sync::Arc;

use interview_deck_core::{SeedCategory, SeedPackage, SeedQuestion};
use interview_deck_sqlite::{Gateway, QuestionBank, SchemaManager, Session, SessionConfig};
use interview_deck_store::{
    CategoryStore, FileStorage, LogNotifier, QuestionStore, StoreContext, UserStore,
};

fn main() {
    let workdir = std::env::temp_dir().join("interview_deck_study_demo");
    let _ = std::fs::remove_dir_all(&workdir);
    std::fs::create_dir_all(&workdir).unwrap();

    let session = Arc::new(Session::new(SessionConfig::new(
        "study-demo",
        workdir.join("deck.db"),
    )));
    SchemaManager::new(Gateway::new(Arc::clone(&session)))
        .ensure_schema(&sample_package())
        .unwrap();

    let ctx = StoreContext::new(
        Arc::new(QuestionBank::new(session)),
        Arc::new(FileStorage::new(workdir.join("state"))),
        Arc::new(LogNotifier),
    );

    // === Pick a category ===
    let mut categories = CategoryStore::new(ctx.clone());
    categories.fetch_categories().unwrap();
    let category = categories.current_category().cloned().unwrap();
    println!("Studying '{}'", category.name);

    // === Step through questions ===
    let mut questions = QuestionStore::new(ctx.clone());
    let mut user = UserStore::new(ctx.clone());
    questions.load_questions(category.id).unwrap();
    loop {
        let Some(current) = questions.current_question().cloned() else {
            break;
        };
        println!(
            "  [{}/{}] {}",
            questions.current_index() + 1,
            questions.questions().len(),
            current.title
        );
        questions.mark_learned(current.id).unwrap();
        if let Some(detail) = questions.load_question_detail(current.id).unwrap() {
            user.add_recent_question(detail);
        }
        if !questions.go_to_next() {
            break;
        }
    }

    let first = questions.questions()[0].id;
    let favorite = user.toggle_favorite(first).unwrap();
    println!("Question {first} favorite: {favorite}");

    user.fetch_user_stats().unwrap();
    categories.fetch_categories().unwrap();
    println!(
        "Completion: {:.0}%, category progress {}/{}",
        user.completion_rate(),
        categories.current_category().unwrap().completed_count,
        category.question_count
    );

    // === Restore from snapshots ===
    let restored = UserStore::new(ctx.clone());
    println!(
        "\nRestored {} recent question(s), favorites {:?}",
        restored.recent_questions().len(),
        restored.favorite_ids()
    );
    let restored = QuestionStore::new(ctx);
    println!(
        "Restored cursor at {} of {}",
        restored.current_index() + 1,
        restored.questions().len()
    );

    std::fs::remove_dir_all(&workdir).unwrap();
}

fn sample_package() -> SeedPackage {
    let mut package = SeedPackage::new("1.0.0", "2024-01-01T00:00:00Z");
    package.categories.push(SeedCategory {
        id: 1,
        name: "Networking".into(),
        create_time: "2024-01-01 00:00:00".into(),
    });
    for (n, title) in ["What happens in a TCP handshake?", "HTTP/1.1 vs HTTP/2", "What is DNS?"]
        .into_iter()
        .enumerate()
    {
        let id = n as i64 + 1;
        package.questions.push(SeedQuestion {
            id,
            category_id: 1,
            uri: format!("https://example.com/net/{id}"),
            title: title.into(),
            answer: None,
            sort_order: id * 10,
            create_time: "2024-01-01 00:00:00".into(),
        });
    }
    package
}
