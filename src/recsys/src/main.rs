//! recsys: hybrid news article recommendations from a prepared dataset.
//!
//! Loads the dataset once, builds the engine and answers a single command.
//! Results go to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use recsys_core::RecommendationConfig;
use recsys_data::DataLoader;
use recsys_engine::RecommendationEngine;
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::info;

/// Number of categories listed by `summary`.
const TOP_CATEGORIES: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "recsys")]
#[command(about = "Hybrid content, collaborative and popularity article recommendations")]
#[command(version)]
struct Cli {
    /// Directory holding the prepared dataset files
    #[arg(long, env = "RECSYS_DATA_DIR", default_value = "processed_data")]
    data_dir: PathBuf,

    /// Optional TOML file with engine settings
    #[arg(long, env = "RECSYS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend unread articles for one user
    Recommend {
        #[arg(long)]
        user_id: i64,

        /// Number of recommendations
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Print dataset counts, engine statistics and category popularity
    Summary,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recsys=info,recsys_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = RecommendationConfig::load(cli.config.as_deref())?;
    info!(
        min_interactions_collab = config.min_interactions_collab,
        max_similar_users = config.max_similar_users,
        "Configuration loaded"
    );

    let dataset = DataLoader::new(&cli.data_dir).load()?;
    let summary = dataset.summary.clone();
    let engine = RecommendationEngine::new(
        dataset.catalog,
        dataset.interactions,
        dataset.embeddings,
        config,
    )?;

    match cli.command {
        Command::Recommend { user_id, count } => {
            let recommendations = engine.recommend(user_id, count)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        Command::Summary => {
            let mut categories: Vec<(i64, f64)> = engine
                .category_popularity()
                .iter()
                .map(|(&category, &score)| (category, score))
                .collect();
            categories.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            categories.truncate(TOP_CATEGORIES);

            let top_categories: Vec<serde_json::Value> = categories
                .iter()
                .map(|(category, score)| {
                    serde_json::json!({ "category_id": category, "popularity": score })
                })
                .collect();

            let report = serde_json::json!({
                "data": summary,
                "engine": engine.stats(),
                "top_categories": top_categories,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
