use std::sync::Arc;

use iw_core::ArticleCatalog;
use iw_recommend::Recommender;
use iw_storage::SubscriptionStore;

pub struct AppState {
    pub recommender: Recommender,
    pub subscriptions: SubscriptionStore,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender,
            subscriptions: SubscriptionStore::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ArticleCatalog> {
        self.recommender.catalog()
    }
}
