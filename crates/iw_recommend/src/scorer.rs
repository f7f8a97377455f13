use std::collections::{BTreeSet, HashMap, HashSet};

use iw_core::{slugify, Article, HistoryRef, ScoredArticle};
use tracing::debug;

use crate::config::RecommenderConfig;

/// Interest accumulated from a reading history.
#[derive(Debug, Clone, Default)]
pub struct InterestProfile {
    categories: HashMap<String, f64>,
    tags: HashMap<String, f64>,
    seen: HashSet<String>,
}

impl InterestProfile {
    /// History is most-recent-last. The last entry weighs 1.0 and each step
    /// back multiplies by `recency_decay`.
    pub fn from_history(history: &[HistoryRef], recency_decay: f64) -> Self {
        let mut profile = Self::default();
        let mut weight = 1.0;
        for entry in history.iter().rev() {
            profile.seen.insert(entry.id.clone());

            let category = entry.category_key();
            if !category.is_empty() {
                *profile.categories.entry(category).or_insert(0.0) += weight;
            }

            let tags: BTreeSet<String> = entry
                .tags
                .iter()
                .map(|t| slugify(t))
                .filter(|t| !t.is_empty())
                .collect();
            for tag in tags {
                *profile.tags.entry(tag).or_insert(0.0) += weight;
            }

            weight *= recency_decay;
        }
        profile
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn category_weight(&self, key: &str) -> f64 {
        self.categories.get(key).copied().unwrap_or(0.0)
    }

    pub fn tag_weight(&self, key: &str) -> f64 {
        self.tags.get(key).copied().unwrap_or(0.0)
    }

    /// Overlap between an article and this profile; zero without overlap.
    pub fn score(&self, article: &Article, config: &RecommenderConfig) -> f64 {
        let category = self.category_weight(&article.category_key());
        // BTreeSet keeps the summation order fixed so equal inputs give bit-equal scores.
        let tags: BTreeSet<String> = article.tags.iter().map(|t| slugify(t)).collect();
        let tag_sum: f64 = tags.iter().map(|t| self.tag_weight(t)).sum();
        config.category_weight * category + config.tag_weight * tag_sum
    }
}

/// Ranks `catalog` against `history` and returns at most `limit` articles.
///
/// Articles whose id appears in the history are never returned and catalog
/// entries sharing an id are considered once. Ordering is score descending,
/// then date descending, then id ascending. With an empty history every
/// score is zero and the result is simply the most recent articles.
pub fn rank(
    history: &[HistoryRef],
    catalog: &[Article],
    limit: usize,
    config: &RecommenderConfig,
) -> Vec<ScoredArticle> {
    let limit = limit.min(config.max_limit);
    let profile = InterestProfile::from_history(history, config.recency_decay);

    let mut considered = HashSet::with_capacity(catalog.len());
    let mut candidates: Vec<(&Article, f64)> = catalog
        .iter()
        .filter(|article| !profile.has_seen(&article.id))
        .filter(|article| considered.insert(article.id.as_str()))
        .map(|article| (article, profile.score(article, config)))
        .collect();

    candidates.sort_by(|(a, a_score), (b, b_score)| {
        b_score
            .total_cmp(a_score)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(
        history = history.len(),
        eligible = candidates.len(),
        limit,
        cold_start = profile.is_empty(),
        "ranked recommendation candidates"
    );

    candidates
        .into_iter()
        .take(limit)
        .map(|(article, score)| ScoredArticle {
            article: article.summary(),
            score,
        })
        .collect()
}
