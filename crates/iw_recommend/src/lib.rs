pub mod config;
pub mod scorer;
pub mod service;

pub use config::RecommenderConfig;
pub use scorer::{rank, InterestProfile};
pub use service::Recommender;

pub mod prelude {
    pub use super::{rank, Recommender, RecommenderConfig};
    pub use iw_core::{HistoryRef, RecommendationRequest, Result, ScoredArticle};
}
