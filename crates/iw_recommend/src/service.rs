use std::fmt;
use std::sync::Arc;

use iw_core::{ArticleCatalog, ArticleFilter, Error, RecommendationRequest, Result, ScoredArticle};
use tracing::info;

use crate::config::RecommenderConfig;
use crate::scorer;

/// Binds a catalog to the scorer.
pub struct Recommender {
    catalog: Arc<dyn ArticleCatalog>,
    config: RecommenderConfig,
}

impl fmt::Debug for Recommender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recommender")
            .field("catalog", &self.catalog.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Recommender {
    pub fn new(catalog: Arc<dyn ArticleCatalog>, config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn ArticleCatalog> {
        &self.catalog
    }

    /// Fetches a catalog snapshot and ranks it. Any catalog failure is
    /// reported as [`Error::Upstream`]; nothing is retried here.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<ScoredArticle>> {
        let articles = self
            .catalog
            .get_articles(&ArticleFilter::default())
            .await
            .map_err(|e| match e {
                Error::Upstream(_) => e,
                other => Error::upstream(format!("catalog {}: {}", self.catalog.name(), other)),
            })?;

        let recommendations = scorer::rank(
            &request.reading_history,
            &articles,
            request.limit,
            &self.config,
        );
        info!(
            "✨ Recommended {} of {} articles from {} history entries",
            recommendations.len(),
            articles.len(),
            request.reading_history.len()
        );
        Ok(recommendations)
    }
}
