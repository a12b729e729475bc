use std::fs;
use std::path::Path;

use interview_deck_core::{SeedPackage, ValidationError, validate_seed};
use interview_deck_db::{
    CATEGORY_FILE, DatabaseError, DeckConfig, QUESTION_FILE, SeedDatabase, SeedSource,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Writes seed files in the layout the mobile app shipped, including the
/// extra fields the loader ignores.
fn write_app_seed(dir: &Path) {
    let categories = serde_json::json!([
        { "id": 1, "name": "Java Basics", "createTime": "2023-05-01 08:00:00", "icon": "java.png" },
        { "id": 2, "name": "MySQL", "createTime": "2023-05-02T08:00:00Z" }
    ]);
    let questions = serde_json::json!([
        { "id": 11, "categoryId": 1, "uri": "/q/11", "title": "== vs equals",
          "answer": "Reference vs value equality.", "sortOrder": 1,
          "createTime": "2023-05-01 08:00:00", "views": 42 },
        { "id": 12, "categoryId": 1, "uri": "/q/12", "title": "String immutability",
          "sortOrder": 2, "createTime": "2023-05-01 08:00:00" },
        { "id": 21, "categoryId": 2, "uri": "/q/21", "title": "InnoDB vs MyISAM",
          "answer": null, "sortOrder": 1, "createTime": "1683014400000" }
    ]);
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(CATEGORY_FILE), categories.to_string()).unwrap();
    fs::write(dir.join(QUESTION_FILE), questions.to_string()).unwrap();
}

fn write_bundle(path: &Path, name: &str) {
    let mut package = SeedPackage::new("2.0.0", "2024-03-01T00:00:00Z");
    package.name = Some(name.to_string());
    fs::write(path, serde_json::to_string_pretty(&package).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Directory loading
// ---------------------------------------------------------------------------

#[test]
fn test_load_app_seed_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_app_seed(dir.path());

    let seed = SeedDatabase::from_dir(dir.path()).unwrap();
    assert_eq!(seed.package().category_count(), 2);
    assert_eq!(seed.package().question_count(), 3);
    assert_eq!(seed.question(12).unwrap().answer, None);
    assert_eq!(seed.category(2).unwrap().name, "MySQL");
    assert!(matches!(seed.source(), SeedSource::Directory(_)));
    assert!(validate_seed(seed.package()).is_empty());
}

#[test]
fn test_loaded_seed_reports_validation_problems() {
    let dir = tempfile::tempdir().unwrap();
    write_app_seed(dir.path());
    let questions = serde_json::json!([
        { "id": 1, "categoryId": 1, "uri": "/q/1", "title": "A", "sortOrder": 5,
          "createTime": "2023-05-01 08:00:00" },
        { "id": 2, "categoryId": 1, "uri": "/q/2", "title": "B", "sortOrder": 5,
          "createTime": "2023-05-01 08:00:00" }
    ]);
    fs::write(dir.path().join(QUESTION_FILE), questions.to_string()).unwrap();

    let seed = SeedDatabase::from_dir(dir.path()).unwrap();
    assert_eq!(
        validate_seed(seed.package()),
        vec![ValidationError::DuplicateSortOrder {
            category_id: 1,
            sort_order: 5
        }]
    );
}

#[test]
fn test_write_dir_then_reload() {
    let src = tempfile::tempdir().unwrap();
    write_app_seed(src.path());
    let seed = SeedDatabase::from_dir(src.path()).unwrap();

    let out = tempfile::tempdir().unwrap();
    let copy = out.path().join("nested").join("seed");
    seed.write_dir(&copy).unwrap();

    let reloaded = SeedDatabase::from_dir(&copy).unwrap();
    assert_eq!(reloaded.package().categories, seed.package().categories);
    assert_eq!(reloaded.package().questions, seed.package().questions);
}

// ---------------------------------------------------------------------------
// Configuration-driven loading
// ---------------------------------------------------------------------------

#[test]
fn test_config_seed_falls_back_to_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("deck.json");
    write_bundle(&bundle, "fallback");

    let yaml = format!(
        "seed:\n  dir: {}\n  bundle: {}\n",
        dir.path().join("missing").display(),
        bundle.display()
    );
    let config_path = dir.path().join("deck.yml");
    fs::write(&config_path, yaml).unwrap();

    let config = DeckConfig::load(&config_path).unwrap();
    let seed = config.seed.load().unwrap();
    assert_eq!(seed.package().name.as_deref(), Some("fallback"));
    assert!(matches!(seed.source(), SeedSource::Multiple(sources) if sources.len() == 2));
}

#[test]
fn test_config_seed_prefers_directory() {
    let dir = tempfile::tempdir().unwrap();
    let seed_dir = dir.path().join("data");
    write_app_seed(&seed_dir);
    let bundle = dir.path().join("deck.json");
    write_bundle(&bundle, "unused");

    let yaml = format!(
        "seed:\n  dir: {}\n  bundle: {}\n",
        seed_dir.display(),
        bundle.display()
    );
    let config: DeckConfig = serde_yaml::from_str(&yaml).unwrap();
    let seed = config.seed.load().unwrap();
    assert_eq!(seed.package().question_count(), 3);
    assert!(seed.package().name.is_none());
}

#[test]
fn test_config_with_no_usable_source() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = format!("seed:\n  dir: {}\n", dir.path().join("nowhere").display());
    let config: DeckConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(matches!(
        config.seed.load(),
        Err(DatabaseError::NoSourcesAvailable)
    ));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.yml");
    fs::write(&path, "recent: [not, a, map]").unwrap();
    assert!(matches!(
        DeckConfig::load_or_default(&path),
        Err(DatabaseError::YamlError(_))
    ));
}
