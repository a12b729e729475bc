use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use interview_deck_core::{Direction, Question, QuestionDetail};
use interview_deck_db::{DeckConfig, SeedDatabase};
use interview_deck_sqlite::{
    Gateway, QuestionBank, SchemaManager, Session, SessionConfig, SqliteError, queries,
};
use interview_deck_store::{
    CategoryStore, FileStorage, LogNotifier, QuestionStore, StoreContext, UserStore,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "deck")]
#[command(about = "Interview question deck: browse questions and track study progress")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to a YAML configuration file. Defaults apply when omitted or missing.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file path, overriding the configuration.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Output format.
    #[arg(long, global = true, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Schema lifecycle and seeding operations.
    Migrate(MigrateArgs),
    /// List categories with question and learned counts.
    Categories,
    /// List the questions of one category in study order.
    Questions(CategoryArgs),
    /// Show one question with its answer.
    Show(IdArgs),
    /// Find the previous or next question within a category.
    Adjacent(AdjacentArgs),
    /// Mark a question learned, or clear the flag with --undo.
    Learn(LearnArgs),
    /// Toggle a question's favorite flag.
    Favorite(IdArgs),
    /// List favorite questions, most recent first.
    Favorites,
    /// Show deck-wide totals.
    Stats,
    /// List recently learned questions.
    Recent(RecentArgs),
    /// Show learned progress for one category.
    Progress(CategoryArgs),
    /// Walk a category question by question, persisting view state.
    Study(StudyArgs),
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create the deck tables.
    Up,
    /// Drop the deck tables.
    Down,
    /// Import seed data into existing tables.
    Seed(SeedArgs),
    /// Create missing tables and seed empty ones.
    Ensure(SeedArgs),
    /// Drop, recreate, and reseed. Discards all progress.
    Reset(SeedArgs),
    /// Show table and row status.
    Status,
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Seed directory holding Category.json and question_map.json.
    #[arg(long, conflicts_with = "bundle")]
    source: Option<PathBuf>,
    /// Seed bundle JSON file.
    #[arg(long)]
    bundle: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CategoryArgs {
    /// Category id.
    #[arg(long)]
    category: i64,
}

#[derive(Debug, Args)]
struct IdArgs {
    /// Question id.
    #[arg(long)]
    id: i64,
}

#[derive(Debug, Args)]
struct AdjacentArgs {
    /// Current question id.
    #[arg(long)]
    id: i64,
    /// Category id.
    #[arg(long)]
    category: i64,
    /// Direction to move (prev or next).
    #[arg(long, default_value = "next")]
    direction: Direction,
}

#[derive(Debug, Args)]
struct LearnArgs {
    /// Question id.
    #[arg(long)]
    id: i64,
    /// Clear the learned flag instead of setting it.
    #[arg(long)]
    undo: bool,
}

#[derive(Debug, Args)]
struct RecentArgs {
    /// Maximum number of questions (default from configuration).
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
struct StudyArgs {
    /// Category id. Defaults to the last selected category.
    #[arg(long)]
    category: Option<i64>,
    /// Stop after this many questions.
    #[arg(long)]
    limit: Option<usize>,
    /// Mark each visited question learned.
    #[arg(long)]
    mark_learned: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate(args) => run_migrate(&cli.global, args),
        command => run_query(&cli.global, command),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Resolved configuration plus the one session every command shares.
struct Deck {
    config: DeckConfig,
    session: Arc<Session>,
    format: CliOutputFormat,
}

impl Deck {
    fn open(global: &GlobalArgs) -> Result<Self, String> {
        let mut config = match &global.config {
            Some(path) => DeckConfig::load_or_default(path)
                .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
            None => DeckConfig::default(),
        };
        if let Some(db) = &global.db {
            config.database.path = db.clone();
        }
        debug!(db = %config.database.path.display(), "resolved configuration");

        let session = Arc::new(Session::new(SessionConfig::from(&config.database)));
        Ok(Self {
            config,
            session,
            format: global.format,
        })
    }

    fn manager(&self) -> SchemaManager {
        SchemaManager::new(Gateway::new(Arc::clone(&self.session)))
    }

    fn bank(&self) -> QuestionBank {
        QuestionBank::new(Arc::clone(&self.session))
    }

    /// Creates and seeds the schema when a seed source is configured. A seed
    /// that fails to import aborts the command.
    fn bootstrap(&self) -> Result<(), String> {
        if self.config.seed.is_empty() {
            return Ok(());
        }
        let seed = self
            .config
            .seed
            .load()
            .map_err(|e| format!("Failed to load seed data: {e}"))?;
        let report = self
            .manager()
            .ensure_schema(seed.package())
            .map_err(|e| format!("Database initialization failed: {e}"))?;
        if !report.is_noop() {
            info!(
                tables = ?report.tables_created,
                categories = report.seed.categories_inserted,
                questions = report.seed.questions_inserted,
                "initialized database"
            );
        }
        Ok(())
    }

    fn store_context(&self) -> StoreContext {
        StoreContext::new(
            Arc::new(self.bank()),
            Arc::new(FileStorage::new(&self.config.storage.dir)),
            Arc::new(LogNotifier),
        )
    }
}

// ---------------------------------------------------------------------------
// Migrate
// ---------------------------------------------------------------------------

fn run_migrate(global: &GlobalArgs, args: MigrateArgs) -> Result<(), String> {
    let deck = Deck::open(global)?;
    let manager = deck.manager();
    let db = deck.config.database.path.display().to_string();

    match args.operation {
        MigrateOperation::Up => {
            manager
                .up()
                .map_err(|e| format!("Migration up failed: {e}"))?;
            println!("Migration up complete. Tables created in '{db}'.");
        }
        MigrateOperation::Down => {
            manager
                .down()
                .map_err(|e| format!("Migration down failed: {e}"))?;
            println!("Migration down complete. Tables dropped from '{db}'.");
        }
        MigrateOperation::Seed(seed) => {
            let seed = resolve_seed(&deck.config, &seed)?;
            let report = manager
                .seed(seed.package())
                .map_err(|e| format!("Seed failed: {e}"))?;
            emit(deck.format, &report, |report| {
                println!("Seed complete:");
                println!("  Categories inserted: {}", report.categories_inserted);
                println!("  Questions inserted: {}", report.questions_inserted);
            })?;
        }
        MigrateOperation::Ensure(seed) => {
            let seed = resolve_seed(&deck.config, &seed)?;
            let report = manager
                .ensure_schema(seed.package())
                .map_err(|e| format!("Ensure failed: {e}"))?;
            emit(deck.format, &report, |report| {
                if report.is_noop() {
                    println!("Database '{db}' is already up to date.");
                    return;
                }
                println!("Ensure complete:");
                if !report.tables_created.is_empty() {
                    println!("  Tables created: {}", report.tables_created.join(", "));
                }
                println!("  Categories inserted: {}", report.seed.categories_inserted);
                println!("  Questions inserted: {}", report.seed.questions_inserted);
            })?;
        }
        MigrateOperation::Reset(seed) => {
            let seed = resolve_seed(&deck.config, &seed)?;
            let report = manager
                .reset_schema(seed.package())
                .map_err(|e| format!("Reset failed: {e}"))?;
            emit(deck.format, &report, |report| {
                println!("Reset complete (tables dropped, recreated, and reseeded):");
                println!("  Categories inserted: {}", report.categories_inserted);
                println!("  Questions inserted: {}", report.questions_inserted);
            })?;
        }
        MigrateOperation::Status => {
            let status = manager
                .status()
                .map_err(|e| format!("Failed to get migration status: {e}"))?;
            emit(deck.format, &status, |status| {
                println!("Migration Status:");
                println!("  Tables exist: {}", yes_no(status.tables_exist));
                println!("  Category count: {}", status.category_count);
                println!("  Question count: {}", status.question_count);
                println!("  Learned: {}", status.learned_count);
                println!("  Favorites: {}", status.favorite_count);
            })?;
        }
    }
    Ok(())
}

/// Picks the seed source from the flags, falling back to the configuration.
fn resolve_seed(config: &DeckConfig, args: &SeedArgs) -> Result<SeedDatabase, String> {
    let load = |what: &str, path: &Path, result: interview_deck_db::Result<SeedDatabase>| {
        result.map_err(|e| format!("Failed to load seed {what} '{}': {e}", path.display()))
    };
    if let Some(dir) = &args.source {
        return load("directory", dir, SeedDatabase::from_dir(dir));
    }
    if let Some(bundle) = &args.bundle {
        return load("bundle", bundle, SeedDatabase::from_bundle(bundle));
    }
    if config.seed.is_empty() {
        return Err(
            "No seed source: pass --source or --bundle, or set seed.dir in the config".to_string(),
        );
    }
    config
        .seed
        .load()
        .map_err(|e| format!("Failed to load seed data: {e}"))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn run_query(global: &GlobalArgs, command: Command) -> Result<(), String> {
    let deck = Deck::open(global)?;
    deck.bootstrap()?;
    let bank = deck.bank();
    let format = deck.format;

    match command {
        Command::Categories => {
            let categories = bank.run(queries::categories).map_err(query_error)?;
            emit(format, &categories, |categories| {
                if categories.is_empty() {
                    println!("No categories.");
                }
                for c in categories {
                    println!(
                        "{:>4}  {:<32} {:>3}/{:<3} learned",
                        c.id, c.name, c.completed_count, c.question_count
                    );
                }
            })
        }
        Command::Questions(args) => {
            let questions = bank
                .run(|gw| queries::questions_by_category(gw, args.category))
                .map_err(query_error)?;
            emit(format, &questions, |questions| {
                if questions.is_empty() {
                    println!("No questions in category {}.", args.category);
                }
                for q in questions {
                    print_question_row(q);
                }
            })
        }
        Command::Show(args) => {
            let detail = bank
                .run(|gw| queries::question_detail(gw, args.id))
                .map_err(query_error)?
                .ok_or_else(|| not_found(args.id))?;
            emit(format, &detail, print_detail)
        }
        Command::Adjacent(args) => {
            let adjacent = bank
                .run(|gw| queries::adjacent_question(gw, args.id, args.category, args.direction))
                .map_err(query_error)?;
            emit(format, &adjacent, |adjacent| match adjacent {
                Some(a) => println!("{:>4}  {}", a.id, a.title),
                None => println!("No {} question.", args.direction),
            })
        }
        Command::Learn(args) => {
            let changed = if args.undo {
                bank.run(|gw| queries::cancel_learned(gw, args.id))
            } else {
                bank.run(|gw| queries::mark_learned(gw, args.id, Utc::now()))
            }
            .map_err(query_error)?;
            if !changed {
                return Err(not_found(args.id));
            }
            let state = if args.undo { "not learned" } else { "learned" };
            println!("Question {} marked {state}.", args.id);
            Ok(())
        }
        Command::Favorite(args) => {
            let detail = bank
                .run(|gw| {
                    if !queries::toggle_favorite(gw, args.id, Utc::now())? {
                        return Ok(None);
                    }
                    queries::question_detail(gw, args.id)
                })
                .map_err(query_error)?
                .ok_or_else(|| not_found(args.id))?;
            let verb = if detail.question.is_favorite { "added to" } else { "removed from" };
            println!("Question {} {verb} favorites.", args.id);
            Ok(())
        }
        Command::Favorites => {
            let favorites = bank.run(queries::favorites).map_err(query_error)?;
            emit(format, &favorites, |favorites| print_detail_list(favorites, "No favorites."))
        }
        Command::Stats => {
            let stats = bank.run(queries::user_stats).map_err(query_error)?;
            emit(format, &stats, |stats| {
                println!("Questions: {}", stats.total);
                println!("Learned: {} ({:.1}%)", stats.completed, stats.completion_rate());
                println!("Favorites: {}", stats.favorites);
            })
        }
        Command::Recent(args) => {
            let limit = args.limit.unwrap_or(deck.config.recent.default_limit);
            let recent = bank
                .run(|gw| queries::recent_questions(gw, Some(limit)))
                .map_err(query_error)?;
            emit(format, &recent, |recent| {
                print_detail_list(recent, "Nothing learned yet.")
            })
        }
        Command::Progress(args) => {
            let progress = bank
                .run(|gw| queries::category_progress(gw, args.category))
                .map_err(query_error)?;
            emit(format, &progress, |progress| {
                println!(
                    "Category {}: {}/{} learned",
                    args.category, progress.completed, progress.total
                );
            })
        }
        Command::Study(args) => run_study(&deck, args),
        Command::Migrate(_) => Err("migrate is handled separately".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Study
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StudySummary {
    category_id: i64,
    visited: Vec<i64>,
    completion_rate: f64,
}

fn run_study(deck: &Deck, args: StudyArgs) -> Result<(), String> {
    let ctx = deck.store_context();
    let mut categories = CategoryStore::new(ctx.clone());
    let mut questions = QuestionStore::new(ctx.clone());
    let mut user = UserStore::with_capacity(ctx, deck.config.recent.capacity);

    categories.fetch_categories().map_err(|e| e.to_string())?;
    if let Some(id) = args.category {
        if !categories.switch_category(id) {
            return Err(format!("No category with id {id}"));
        }
    }
    let category = categories
        .current_category()
        .cloned()
        .ok_or_else(|| "No categories to study".to_string())?;

    questions
        .load_questions(category.id)
        .map_err(|e| e.to_string())?;
    let total = questions.questions().len();
    let limit = args.limit.unwrap_or(total);
    let mut visited = Vec::new();

    if deck.format == CliOutputFormat::Table {
        println!("Studying '{}' ({total} questions)", category.name);
    }
    while let Some(current) = questions.current_question().cloned() {
        if visited.len() >= limit {
            break;
        }
        if args.mark_learned && !current.is_learned {
            questions
                .mark_learned(current.id)
                .map_err(|e| e.to_string())?;
        }
        if let Some(detail) = questions
            .load_question_detail(current.id)
            .map_err(|e| e.to_string())?
        {
            if deck.format == CliOutputFormat::Table {
                println!(
                    "[{}/{total}] {}{}",
                    questions.current_index() + 1,
                    detail.question.title,
                    flags(&detail.question)
                );
            }
            user.add_recent_question(detail);
        }
        visited.push(current.id);
        if !questions.go_to_next() {
            break;
        }
    }

    user.fetch_user_stats().map_err(|e| e.to_string())?;
    let completed = deck
        .bank()
        .run(|gw| queries::category_progress(gw, category.id))
        .map_err(query_error)?
        .completed;
    categories.update_category_progress(category.id, completed);

    let summary = StudySummary {
        category_id: category.id,
        visited,
        completion_rate: user.completion_rate(),
    };
    emit(deck.format, &summary, |summary| {
        println!(
            "Visited {} question(s). Deck completion: {:.1}%",
            summary.visited.len(),
            summary.completion_rate
        );
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Prints `value` as pretty JSON, or hands it to `table` for text output.
fn emit<T: Serialize>(
    format: CliOutputFormat,
    value: &T,
    table: impl FnOnce(&T),
) -> Result<(), String> {
    match format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(value)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Table => table(value),
    }
    Ok(())
}

fn query_error(err: SqliteError) -> String {
    format!("Query failed: {err}")
}

fn not_found(id: i64) -> String {
    format!("No question with id {id}")
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Marker suffix for a question's learned and favorite flags.
fn flags(question: &Question) -> String {
    let mut out = String::new();
    if question.is_learned {
        out.push_str(" [learned]");
    }
    if question.is_favorite {
        out.push_str(" [favorite]");
    }
    out
}

fn print_question_row(question: &Question) {
    println!(
        "{:>4}  {:>5}  {}{}",
        question.id,
        question.sort_order,
        question.title,
        flags(question)
    );
}

fn print_detail(detail: &QuestionDetail) {
    let q = &detail.question;
    println!("#{} {}{}", q.id, q.title, flags(q));
    if let Some(name) = &detail.category_name {
        println!("Category: {name}");
    }
    if !q.uri.is_empty() {
        println!("Source: {}", q.uri);
    }
    println!();
    println!("{}", q.answer.as_deref().unwrap_or("(no answer)"));
}

fn print_detail_list(details: &[QuestionDetail], empty: &str) {
    if details.is_empty() {
        println!("{empty}");
    }
    for detail in details {
        let category = detail.category_name.as_deref().unwrap_or("?");
        println!(
            "{:>4}  {:<20} {}{}",
            detail.question.id,
            category,
            detail.question.title,
            flags(&detail.question)
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["deck", "stats", "--db", "x.db", "--format", "json"]).unwrap();
        assert_eq!(cli.global.db, Some(PathBuf::from("x.db")));
        assert_eq!(cli.global.format, CliOutputFormat::Json);
        assert!(matches!(cli.command, Command::Stats));
    }

    #[test]
    fn test_adjacent_parses_direction() {
        let cli = Cli::try_parse_from([
            "deck", "adjacent", "--id", "3", "--category", "1", "--direction", "prev",
        ])
        .unwrap();
        let Command::Adjacent(args) = cli.command else {
            panic!("expected adjacent");
        };
        assert_eq!(args.direction, Direction::Prev);
        assert!(
            Cli::try_parse_from(["deck", "adjacent", "--id", "3", "--category", "1", "--direction", "up"])
                .is_err()
        );
    }

    #[test]
    fn test_seed_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "deck", "migrate", "seed", "--source", "data", "--bundle", "deck.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_resolve_seed_without_source() {
        let args = SeedArgs {
            source: None,
            bundle: None,
        };
        let err = resolve_seed(&DeckConfig::default(), &args).unwrap_err();
        assert!(err.contains("--source"));
    }

    #[test]
    fn test_flags_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut question = Question::new(1, 1, "Q", 10, at);
        assert_eq!(flags(&question), "");
        question.set_learned(true, at);
        question.set_favorite(true, at);
        assert_eq!(flags(&question), " [learned] [favorite]");
    }
}
