use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use srs_engine::database::{SqliteAdapter, db};
use srs_engine::export::json::{export_to_path, import_from_path};
use srs_engine::progress::{calculate_level, experience_gain, unlocked_achievements};
use srs_engine::{DifficultyFilter, EngineConfig, ItemId, ReviewStore, StaticPool, queue};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "srs", about = "Spaced repetition review scheduler", version)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database (overrides the config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade an item 0-5
    Review {
        item: ItemId,
        #[arg(allow_negative_numbers = true)]
        quality: i64,
    },
    /// List items due now
    Due,
    /// Pick unseen items from a pool file
    New {
        /// JSON pool: {"name": ..., "items": [{"id": .., "difficulty": ..}]}
        #[arg(long)]
        pool: PathBuf,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        difficulty: Option<DifficultyFilter>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build a practice queue of due items followed by new ones
    Plan {
        #[arg(long)]
        pool: PathBuf,
    },
    /// Show statistics and achievements
    Stats,
    /// Show level and experience
    Level,
    /// Write a snapshot document
    Export { path: PathBuf },
    /// Replace all state with a snapshot document
    Import { path: PathBuf },
    /// Erase all review state and today's progress
    Reset,
    /// Show the simulated date and today's progress
    Today,
    /// Advance the simulated date by one day
    NextDay,
}

fn load_pool(path: &Path) -> Result<StaticPool, Box<dyn StdError>> {
    let pool: StaticPool = serde_json::from_str(&fs::read_to_string(path)?)?;
    log::info!("pool '{}' has {} items", pool.name, pool.items.len());
    Ok(pool)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let db_path = cli.database.unwrap_or_else(|| config.database_path.clone());

    let adapter = SqliteAdapter::open(&db_path)?;
    let mut store = ReviewStore::open(adapter)?;
    let now = db::get_current_date(store.adapter().connection())?;

    match cli.command {
        Command::Review { item, quality } => {
            let summary = store.apply_review(item, quality, now)?;
            if summary.quality.is_passing() {
                let conn = store.adapter().connection();
                let mut progress = db::load_daily_progress(conn)?;
                progress.record(1, now.date_naive());
                db::save_daily_progress(&progress, conn)?;
            }
            println!(
                "item {item}: next review {} (interval {}d, ease {:.2}, streak {}) +{} exp",
                summary.next_review_at.format("%Y-%m-%d"),
                summary.interval,
                summary.ease_factor,
                summary.repetitions,
                experience_gain(summary.quality)
            );
        }
        Command::Due => {
            let due = store.due_items(now);
            println!("{} items due", due.len());
            for record in due {
                let when = record
                    .next_review_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "new".to_string());
                println!("  - {} ({when})", record.item_id);
            }
        }
        Command::New {
            pool,
            count,
            difficulty,
            seed,
        } => {
            let pool = load_pool(&pool)?;
            let filter = difficulty.unwrap_or(config.difficulty);
            let mut rng = make_rng(seed.or(config.seed));
            let picked = store.new_items(
                &pool,
                &HashSet::new(),
                count.unwrap_or(config.max_new_per_session),
                &|d| filter.matches(d),
                &mut rng,
            );
            for item in picked {
                println!("  - {} (difficulty {})", item.id, item.difficulty);
            }
        }
        Command::Plan { pool } => {
            let pool = load_pool(&pool)?;
            let conn = store.adapter().connection();
            let remaining = db::load_daily_progress(conn)?
                .remaining(config.daily_target, now.date_naive()) as usize;

            let due = store.due_items(now);
            let exclude: HashSet<ItemId> = due.iter().map(|r| r.item_id).collect();
            let mut rng = make_rng(config.seed);
            let fresh = store.new_items(
                &pool,
                &exclude,
                config.max_new_per_session.min(remaining),
                &|d| config.difficulty.matches(d),
                &mut rng,
            );
            let queue = queue::plan_practice(
                &due,
                &fresh,
                config.max_due_per_session,
                config.max_new_per_session,
            );
            println!("practice queue ({} items): {:?}", queue.len(), queue);
        }
        Command::Stats => {
            let stats = store.stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
            for achievement in unlocked_achievements(&stats) {
                println!("  * {}", achievement.title());
            }
        }
        Command::Level => {
            let level = calculate_level(&store.stats());
            println!(
                "level {} ({} / 1000 exp, {} to next, {} total)",
                level.level, level.current_exp, level.next_exp, level.total_exp
            );
        }
        Command::Export { path } => {
            export_to_path(&store.export_snapshot(now), &path)?;
            println!("exported {} records to '{}'", store.len(), path.display());
        }
        Command::Import { path } => {
            let doc = import_from_path(&path)?;
            store.import_snapshot(doc, now)?;
            println!("imported {} records", store.len());
        }
        Command::Reset => {
            store.reset(now)?;
            db::clear_daily_progress(store.adapter().connection())?;
            println!("review state cleared");
        }
        Command::Today => {
            let progress = db::load_daily_progress(store.adapter().connection())?;
            let today = now.date_naive();
            println!(
                "{today}: {} done, {} left of {}",
                progress.completed_on(today),
                progress.remaining(config.daily_target, today),
                config.daily_target
            );
        }
        Command::NextDay => {
            let next = db::advance_day(store.adapter().connection())?;
            println!("{}", next.format("%Y-%m-%d"));
        }
    }

    Ok(())
}
