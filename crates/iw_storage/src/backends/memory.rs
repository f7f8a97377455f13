use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use iw_core::{Article, ArticleCatalog, ArticleFilter, Result};
use tokio::sync::RwLock;
use tracing::info;

pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn new(articles: Vec<Article>) -> Self {
        let mut store = Self {
            articles: Vec::with_capacity(articles.len()),
        };
        for article in articles {
            store.upsert_article(article);
        }
        store
    }

    /// Returns true when the article was new.
    pub fn upsert_article(&mut self, article: Article) -> bool {
        if let Some(existing) = self.articles.iter_mut().find(|a| a.id == article.id) {
            *existing = article;
            false
        } else {
            self.articles.push(article);
            true
        }
    }

    pub fn get_articles(&self, filter: &ArticleFilter) -> Vec<Article> {
        let mut articles = self
            .articles
            .iter()
            .filter(|article| filter.matches(article))
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = filter.limit {
            articles.truncate(limit);
        }
        articles
    }

    pub fn get_article_by_id(&self, id: &str) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Catalog held in process memory, optionally seeded from a JSON file.
#[derive(Clone)]
pub struct MemoryCatalog {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_articles(Vec::new())
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new(articles))),
        }
    }

    /// Loads a JSON array of articles.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        let articles: Vec<Article> = serde_json::from_slice(&raw)?;
        info!("📚 Loaded {} articles from {}", articles.len(), path.display());
        Ok(Self::with_articles(articles))
    }

    pub async fn upsert_article(&self, article: Article) -> bool {
        self.store.write().await.upsert_article(article)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleCatalog for MemoryCatalog {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.get_articles(filter))
    }

    async fn get_article_by_id(&self, id: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get_article_by_id(id))
    }
}
