//! Implementação dos comandos CLI do recokit.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use crate::cursors::{Cursor, DelimitedTextProducer};
use crate::scoring::{CachingItemScorer, FallbackItemScorer, PrecomputedItemScorer, UserMeanScorer};
use crate::types::config::{Config, DEFAULT_CONFIG_FILE};
use crate::{ItemId, ItemScorer, Rating, UserId};

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> anyhow::Result<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)
            .with_context(|| format!("creating {}", target_dir.display()))?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config()
        .save(&config_path)
        .with_context(|| format!("writing {}", config_path.display()))?;

    println!("Configuration created at: {}", config_path.display());
    Ok(())
}

/// Opens a rating cursor over a delimited file or, by extension, a SQLite database.
pub fn open_source(source: &Path, config: &Config) -> anyhow::Result<Cursor<Rating>> {
    if is_database(source) {
        return open_database(source, config);
    }

    DelimitedTextProducer::open_cursor(source, &config.cursor)
        .with_context(|| format!("opening rating file {}", source.display()))
}

fn is_database(source: &Path) -> bool {
    matches!(
        source.extension().and_then(|ext| ext.to_str()),
        Some("db" | "sqlite" | "sqlite3")
    )
}

#[cfg(feature = "sqlite")]
fn open_database(source: &Path, config: &Config) -> anyhow::Result<Cursor<Rating>> {
    use crate::cursors::SqliteRatingProducer;

    let producer = SqliteRatingProducer::open(source, config.cursor.page_size)
        .with_context(|| format!("opening rating database {}", source.display()))?;
    Ok(Cursor::new(producer))
}

#[cfg(not(feature = "sqlite"))]
fn open_database(source: &Path, _config: &Config) -> anyhow::Result<Cursor<Rating>> {
    bail!(
        "{} looks like a SQLite database, but recokit was built without the sqlite feature",
        source.display()
    )
}

/// Streams ratings from a source, optionally filtered by user and limited.
pub fn scan(
    source: &Path,
    user: Option<UserId>,
    limit: Option<usize>,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut cursor = open_source(source, config)?;

    if let Some(user) = user {
        cursor = cursor.filter(move |rating| rating.user == user);
    }
    if let Some(limit) = limit {
        cursor = cursor.limit(limit);
    }

    let mut count = 0usize;
    for rating in &mut cursor {
        let rating = rating.with_context(|| format!("reading {}", source.display()))?;
        if json {
            println!("{}", serde_json::to_string(&rating)?);
        } else {
            println!("{}", rating.to_line(&config.cursor.delimiter));
        }
        count += 1;
    }
    cursor.close()?;

    tracing::info!(source = %source.display(), count, "Scan complete");
    eprintln!("{} ratings", count);
    Ok(())
}

/// Scores items for one or more users, reusing the per-user cache between calls.
pub fn score(
    source: &Path,
    users: &[UserId],
    items: &[ItemId],
    baseline: bool,
    config: &Config,
) -> anyhow::Result<()> {
    if users.is_empty() || items.is_empty() {
        bail!("at least one user and one item are required");
    }

    let ratings = open_source(source, config)?
        .collect_vec()
        .with_context(|| format!("loading ratings from {}", source.display()))?;

    let precomputed = PrecomputedItemScorer::from_ratings(Cursor::from_vec(ratings.clone()))?;
    let scorer: Box<dyn ItemScorer> = if baseline {
        let mean = UserMeanScorer::from_ratings(Cursor::from_vec(ratings))?;
        Box::new(FallbackItemScorer::new(precomputed, mean))
    } else {
        Box::new(precomputed)
    };

    let items: BTreeSet<ItemId> = items.iter().copied().collect();

    if config.cache.enabled {
        let cached = CachingItemScorer::from_config(scorer, &config.cache);
        print_scores(&cached, users, &items)?;

        let stats = cached.stats();
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            invalidations = stats.invalidations,
            "Score cache stats"
        );
        eprintln!(
            "cache: hits={} misses={} invalidations={} delegate_calls={}",
            stats.hits, stats.misses, stats.invalidations, stats.delegate_calls
        );
    } else {
        print_scores(&scorer, users, &items)?;
    }

    Ok(())
}

fn print_scores(
    scorer: &dyn ItemScorer,
    users: &[UserId],
    items: &BTreeSet<ItemId>,
) -> anyhow::Result<()> {
    for &user in users {
        let scores = scorer
            .score_items(user, items)
            .with_context(|| format!("scoring items for user {}", user))?;

        for item in items {
            match scores.get(item) {
                Some(score) => println!("{}\t{}\t{}", user, item, score),
                None => println!("{}\t{}\t-", user, item),
            }
        }
    }
    Ok(())
}

/// Imports a delimited rating file into a SQLite database.
#[cfg(feature = "sqlite")]
pub fn import(input: &Path, db: &Path, config: &Config) -> anyhow::Result<()> {
    use crate::cursors::RatingStore;
    use indicatif::{ProgressBar, ProgressStyle};

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner} {pos} ratings imported")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let ticker = progress.clone();
    let cursor = open_source(input, config)?.map(move |rating| {
        ticker.inc(1);
        rating
    });

    let mut store =
        RatingStore::open(db).with_context(|| format!("opening database {}", db.display()))?;
    let count = store
        .import(cursor)
        .with_context(|| format!("importing {} into {}", input.display(), db.display()))?;

    progress.finish_and_clear();
    println!("Imported {} ratings into {}", count, db.display());
    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("recokit {}", env!("CARGO_PKG_VERSION"));
}
