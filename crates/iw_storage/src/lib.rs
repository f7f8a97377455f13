use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use iw_core::{ArticleCatalog, Error, Result};
use tracing::info;

pub mod backends;
pub mod subscriptions;

pub use backends::*;
pub use subscriptions::{PushSubscription, SubscribeOutcome, SubscriptionKeys, SubscriptionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogKind {
    #[default]
    Memory,
    Http,
}

impl CatalogKind {
    pub fn get_error_message(&self) -> &'static str {
        match self {
            Self::Memory => "Memory catalog should be readable (check the seed file path)",
            Self::Http => "HTTP catalog should be reachable at the configured URL",
        }
    }
}

impl FromStr for CatalogKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "http" => Ok(Self::Http),
            other => Err(Error::Config(format!(
                "unknown catalog backend {:?} (expected memory or http)",
                other
            ))),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Builds a catalog backend. `location` is an optional seed file for
/// `memory` and the required base URL for `http`.
pub async fn create_catalog(kind: &str, location: Option<&str>) -> Result<Arc<dyn ArticleCatalog>> {
    let kind = CatalogKind::from_str(kind)?;
    let catalog: Arc<dyn ArticleCatalog> = match (kind, location) {
        (CatalogKind::Memory, None) => Arc::new(MemoryCatalog::new()),
        (CatalogKind::Memory, Some(path)) => Arc::new(MemoryCatalog::from_json_file(path).await?),
        (CatalogKind::Http, Some(url)) => Arc::new(HttpCatalog::new(url)?),
        (CatalogKind::Http, None) => {
            return Err(Error::Config("http catalog requires a base URL".to_string()))
        }
    };
    info!("🏦 Catalog backend created (using {})", kind);
    Ok(catalog)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_catalog, CatalogKind, SubscriptionStore};
}
