use std::collections::HashMap;

use chrono::{DateTime, Utc};
use iw_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser push subscription, keyed by its endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PushSubscription {
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint)?;
        if self.keys.p256dh.trim().is_empty() || self.keys.auth.trim().is_empty() {
            return Err(Error::invalid_input("subscription keys must not be empty"));
        }
        Ok(())
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::invalid_input(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::invalid_input(format!(
            "endpoint must use http or https, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Replaced,
}

/// Push subscriptions keyed by endpoint. All writes go through one lock.
#[derive(Debug, Default)]
pub struct SubscriptionStore {
    subscriptions: RwLock<HashMap<String, PushSubscription>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, subscription: PushSubscription) -> Result<SubscribeOutcome> {
        subscription.validate()?;
        let mut subscriptions = self.subscriptions.write().await;
        let outcome = match subscriptions.insert(subscription.endpoint.clone(), subscription) {
            Some(_) => SubscribeOutcome::Replaced,
            None => SubscribeOutcome::Created,
        };
        info!("🔔 Push subscription {:?} ({} total)", outcome, subscriptions.len());
        Ok(outcome)
    }

    /// Returns false when the endpoint was not subscribed.
    pub async fn unsubscribe(&self, endpoint: &str) -> bool {
        let removed = self.subscriptions.write().await.remove(endpoint).is_some();
        if removed {
            info!("🔕 Push subscription removed");
        }
        removed
    }

    pub async fn get(&self, endpoint: &str) -> Option<PushSubscription> {
        self.subscriptions.read().await.get(endpoint).cloned()
    }

    /// Oldest first.
    pub async fn list(&self) -> Vec<PushSubscription> {
        let mut all: Vec<_> = self.subscriptions.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.endpoint.cmp(&b.endpoint))
        });
        all
    }

    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }
}
