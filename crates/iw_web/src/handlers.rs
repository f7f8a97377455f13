use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use iw_core::{Article, ArticleFilter, Error, RecommendationRequest, ScoredArticle};
use iw_storage::{PushSubscription, SubscribeOutcome};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// `POST /api/recommendations`
///
/// The body is taken as raw JSON so shape problems (a missing or non-array
/// `readingHistory`, a bad `limit`) come back as 400 with a precise message.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Vec<ScoredArticle>>> {
    let Json(body) = body.map_err(|e| Error::invalid_input(e.body_text()))?;
    let request = RecommendationRequest::from_value(body)?;
    debug!(
        history = request.reading_history.len(),
        limit = request.limit,
        "recommendation request"
    );
    let recommendations = state.recommender.recommend(&request).await?;
    Ok(Json(recommendations))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ArticleFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Article>>> {
    let Query(filter) = filter.map_err(|e| Error::invalid_input(e.body_text()))?;
    let articles = state.catalog().get_articles(&filter).await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    state
        .catalog()
        .get_article_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("article {}", id)).into())
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PushSubscription>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PushSubscription>)> {
    let Json(subscription) = body.map_err(|e| Error::invalid_input(e.body_text()))?;
    let status = match state.subscriptions.subscribe(subscription.clone()).await? {
        SubscribeOutcome::Created => StatusCode::CREATED,
        SubscribeOutcome::Replaced => StatusCode::OK,
    };
    Ok((status, Json(subscription)))
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = body.map_err(|e| Error::invalid_input(e.body_text()))?;
    if state.subscriptions.unsubscribe(&request.endpoint).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound(format!("subscription {}", request.endpoint)).into())
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let articles = state
        .catalog()
        .get_articles(&ArticleFilter::default())
        .await?
        .len();
    Ok(Json(json!({
        "status": "ok",
        "catalog": state.catalog().name(),
        "articles": articles,
        "subscriptions": state.subscriptions.len().await,
    })))
}
