pub mod catalog;
pub mod error;
pub mod history;
pub mod request;
pub mod types;

pub use catalog::{ArticleCatalog, ArticleFilter};
pub use error::{Error, Result};
pub use history::{ReadingHistory, DEFAULT_HISTORY_LEN};
pub use request::{RecommendationRequest, DEFAULT_LIMIT};
pub use types::{
    slugify, Article, ArticleSummary, HistoryRef, ReadingHistoryEntry, ScoredArticle,
};
