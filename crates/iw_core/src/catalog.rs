use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{slugify, Article};
use crate::Result;

/// Narrows a catalog listing. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(category) = &self.category {
            if slugify(category) != article.category_key() {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            let tag = slugify(tag);
            if !article.tags.iter().any(|t| slugify(t) == tag) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !article.author.trim().eq_ignore_ascii_case(author.trim()) {
                return false;
            }
        }
        true
    }
}

/// Read access to the article catalog.
#[async_trait]
pub trait ArticleCatalog: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Articles matching the filter, most recent first
    async fn get_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>>;

    /// A single article, `None` when the id is unknown
    async fn get_article_by_id(&self, id: &str) -> Result<Option<Article>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article() -> Article {
        Article {
            id: "a1".to_string(),
            slug: "grid-layouts".to_string(),
            title: "Grid layouts".to_string(),
            excerpt: String::new(),
            cover_image: None,
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            category: "Web Design".to_string(),
            category_slug: "web-design".to_string(),
            author: "Ana Lima".to_string(),
            tags: vec!["CSS".to_string(), "layout".to_string()],
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ArticleFilter::default().matches(&article()));
    }

    #[test]
    fn test_filter_fields() {
        let article = article();
        let by_category = ArticleFilter {
            category: Some("Web Design".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&article));

        let by_tag = ArticleFilter {
            tag: Some("css".to_string()),
            ..Default::default()
        };
        assert!(by_tag.matches(&article));

        let by_author = ArticleFilter {
            author: Some("ana lima".to_string()),
            ..Default::default()
        };
        assert!(by_author.matches(&article));

        let mismatch = ArticleFilter {
            category: Some("web-design".to_string()),
            tag: Some("rust".to_string()),
            ..Default::default()
        };
        assert!(!mismatch.matches(&article));
    }
}
