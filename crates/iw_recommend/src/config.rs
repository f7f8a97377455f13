use iw_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Weights and bounds for the recommendation scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommenderConfig {
    /// Multiplier applied per step back in the reading history. The most
    /// recent entry weighs 1.0; `1.0` turns the profile into a plain count.
    pub recency_decay: f64,
    pub category_weight: f64,
    pub tag_weight: f64,
    /// Requests asking for more results are clamped to this.
    pub max_limit: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            recency_decay: 0.85,
            category_weight: 1.0,
            tag_weight: 0.5,
            max_limit: 50,
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.recency_decay > 0.0 && self.recency_decay <= 1.0) {
            return Err(Error::Config(format!(
                "recency decay must be in (0, 1], got {}",
                self.recency_decay
            )));
        }
        for (name, weight) in [
            ("category", self.category_weight),
            ("tag", self.tag_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if self.max_limit == 0 {
            return Err(Error::Config("max limit must be at least 1".to_string()));
        }
        Ok(())
    }
}
