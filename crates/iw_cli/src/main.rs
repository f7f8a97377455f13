use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use iw_core::{
    ArticleCatalog, ArticleFilter, ReadingHistoryEntry, RecommendationRequest, DEFAULT_HISTORY_LEN,
    DEFAULT_LIMIT,
};
use iw_recommend::{Recommender, RecommenderConfig};
use iw_web::AppState;
use tracing::{info, warn};

mod history_file;
mod logging;

const CATALOG_CHECK_RETRIES: u32 = 3;
const CATALOG_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(author, version, about = "Reading-history driven article recommendations", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, env = "IW_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,
    /// Catalog backend: memory or http
    #[arg(long, global = true, env = "IW_CATALOG", default_value = "memory")]
    catalog: String,
    /// Seed file for the memory catalog, base URL for the http catalog
    #[arg(long, global = true, env = "IW_CATALOG_LOCATION")]
    catalog_location: Option<String>,
    #[arg(long, global = true, env = "IW_HISTORY_MAX_LEN", default_value_t = DEFAULT_HISTORY_LEN)]
    history_max_len: usize,
    #[command(flatten)]
    scoring: ScoringArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ScoringArgs {
    #[arg(long, global = true, env = "IW_RECENCY_DECAY", default_value_t = RecommenderConfig::default().recency_decay)]
    recency_decay: f64,
    #[arg(long, global = true, env = "IW_CATEGORY_WEIGHT", default_value_t = RecommenderConfig::default().category_weight)]
    category_weight: f64,
    #[arg(long, global = true, env = "IW_TAG_WEIGHT", default_value_t = RecommenderConfig::default().tag_weight)]
    tag_weight: f64,
    #[arg(long, global = true, env = "IW_MAX_LIMIT", default_value_t = RecommenderConfig::default().max_limit)]
    max_limit: usize,
}

impl From<&ScoringArgs> for RecommenderConfig {
    fn from(args: &ScoringArgs) -> Self {
        Self {
            recency_decay: args.recency_decay,
            category_weight: args.category_weight,
            tag_weight: args.tag_weight,
            max_limit: args.max_limit,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "IW_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
    /// Print recommendations for a local reading-history file
    Recommend {
        #[arg(long)]
        history: PathBuf,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Maintain a local reading-history file
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// Record a catalog article as viewed
    Record {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        article_id: String,
    },
    Show {
        #[arg(long)]
        file: PathBuf,
    },
}

async fn check_catalog(catalog: &Arc<dyn ArticleCatalog>) -> iw_core::Result<usize> {
    let sample = ArticleFilter {
        limit: Some(1),
        ..Default::default()
    };
    let articles = catalog.get_articles(&sample).await?;
    Ok(articles.len())
}

async fn check_catalog_with_retry(
    catalog: &Arc<dyn ArticleCatalog>,
    max_retries: u32,
    timeout: Duration,
) -> anyhow::Result<()> {
    let mut retries = 0;
    loop {
        let error = match tokio::time::timeout(timeout, check_catalog(catalog)).await {
            Ok(Ok(found)) => {
                info!(
                    "🏦 Catalog reachable (using {}, {} sample article(s))",
                    catalog.name(),
                    found
                );
                return Ok(());
            }
            Ok(Err(e)) => anyhow::Error::from(e),
            Err(elapsed) => anyhow::anyhow!("catalog health check timed out: {}", elapsed),
        };
        retries += 1;
        if retries >= max_retries {
            return Err(error.context(format!(
                "catalog {} unavailable after {} attempts",
                catalog.name(),
                retries
            )));
        }
        warn!(
            "Catalog health check failed ({}), retrying {}/{}...",
            error, retries, max_retries
        );
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let catalog = iw_storage::create_catalog(&cli.catalog, cli.catalog_location.as_deref())
        .await
        .with_context(|| match cli.catalog.parse::<iw_storage::CatalogKind>() {
            Ok(kind) => kind.get_error_message().to_string(),
            Err(_) => format!("cannot create catalog {:?}", cli.catalog),
        })?;

    match cli.command {
        Commands::Serve { bind } => {
            check_catalog_with_retry(&catalog, CATALOG_CHECK_RETRIES, CATALOG_CHECK_TIMEOUT).await?;
            let recommender = Recommender::new(catalog, RecommenderConfig::from(&cli.scoring))?;
            info!("🧠 Recommender ready ({:?})", recommender.config());
            iw_web::serve(AppState::new(recommender), bind).await?;
        }
        Commands::Recommend { history, limit } => {
            let reading_history = history_file::load(&history, cli.history_max_len)
                .await
                .with_context(|| format!("reading history file {}", history.display()))?;
            let recommender = Recommender::new(catalog, RecommenderConfig::from(&cli.scoring))?;
            let request = RecommendationRequest::new(reading_history.as_refs(), limit)?;
            let recommendations = recommender.recommend(&request).await?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        Commands::History { command } => match command {
            HistoryCommands::Record { file, article_id } => {
                let article = catalog
                    .get_article_by_id(&article_id)
                    .await?
                    .ok_or_else(|| iw_core::Error::NotFound(format!("article {}", article_id)))?;
                let mut history = history_file::load(&file, cli.history_max_len).await?;
                history.record(ReadingHistoryEntry::from(&article));
                history_file::save(&file, &history).await?;
                info!(
                    "📖 Recorded {:?} ({} of {} entries)",
                    article.title,
                    history.len(),
                    history.max_len()
                );
            }
            HistoryCommands::Show { file } => {
                let history = history_file::load(&file, cli.history_max_len).await?;
                println!("{}", serde_json::to_string_pretty(&history)?);
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);
    run(cli).await
}
