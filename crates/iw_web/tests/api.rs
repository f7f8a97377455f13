use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use iw_core::{Article, ArticleCatalog, ArticleFilter, Error, Result};
use iw_recommend::{Recommender, RecommenderConfig};
use iw_storage::MemoryCatalog;
use iw_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn article(id: &str, category: &str, days_ago: i64) -> Article {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    Article {
        id: id.to_string(),
        slug: format!("{}-slug", id),
        title: format!("Article {}", id),
        excerpt: "excerpt".to_string(),
        cover_image: Some(format!("/covers/{}.png", id)),
        date: now - Duration::days(days_ago),
        category: category.to_string(),
        category_slug: category.to_string(),
        author: "Ana".to_string(),
        tags: vec![],
    }
}

fn app_with(catalog: Arc<dyn ArticleCatalog>) -> Router {
    let recommender = Recommender::new(catalog, RecommenderConfig::default()).unwrap();
    create_app(AppState::new(recommender))
}

fn app() -> Router {
    let mut articles = Vec::new();
    for i in 0..5 {
        articles.push(article(&format!("design-{}", i), "design", i));
        articles.push(article(&format!("dev-{}", i), "dev", i));
    }
    articles.push(article("a1", "design", 10));
    app_with(Arc::new(MemoryCatalog::with_articles(articles)))
}

struct DownCatalog;

#[async_trait]
impl ArticleCatalog for DownCatalog {
    fn name(&self) -> &str {
        "down"
    }

    async fn get_articles(&self, _filter: &ArticleFilter) -> Result<Vec<Article>> {
        Err(Error::upstream("connection refused"))
    }

    async fn get_article_by_id(&self, _id: &str) -> Result<Option<Article>> {
        Err(Error::upstream("connection refused"))
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request succeeds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("valid json")
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|a| a["id"].as_str().expect("id"))
        .collect()
}

#[tokio::test]
async fn recommends_from_reading_history() {
    let (status, body) = send(
        app(),
        post_json(
            "/api/recommendations",
            json!({
                "readingHistory": [{
                    "id": "a1",
                    "slug": "a1-slug",
                    "title": "Article a1",
                    "coverImage": "/covers/a1.png",
                    "category": "design",
                    "categorySlug": "design"
                }],
                "limit": 3
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["design-0", "design-1", "design-2"]);
    assert_eq!(body[0]["categorySlug"], "design");
    assert_eq!(body[0]["coverImage"], "/covers/design-0.png");
    assert!(body[0]["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn empty_history_uses_default_limit_and_recency() {
    let (status, body) = send(
        app(),
        post_json("/api/recommendations", json!({ "readingHistory": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["design-0", "dev-0", "design-1", "dev-1"]);
}

#[tokio::test]
async fn malformed_history_is_a_client_error() {
    let (status, body) = send(
        app(),
        post_json(
            "/api/recommendations",
            json!({ "readingHistory": "not-an-array" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("readingHistory"));
}

#[tokio::test]
async fn non_json_body_is_a_client_error() {
    let request = Request::post("/api/recommendations")
        .header("content-type", "application/json")
        .body(Body::from("{ nope"))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn catalog_failure_is_a_server_error() {
    let (status, body) = send(
        app_with(Arc::new(DownCatalog)),
        post_json("/api/recommendations", json!({ "readingHistory": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn lists_and_fetches_articles() {
    let request = Request::get("/api/articles?category=dev&limit=2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["dev-0", "dev-1"]);

    let request = Request::get("/api/articles/a1").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Article a1");

    let request = Request::get("/api/articles/missing")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manages_push_subscriptions() {
    let app = app();
    let subscription = json!({
        "endpoint": "https://push.example.com/send/abc",
        "keys": { "p256dh": "key", "auth": "secret" }
    });

    let (status, _) = send(
        app.clone(),
        post_json("/api/subscriptions", subscription.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(app.clone(), post_json("/api/subscriptions", subscription)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app.clone(),
        Request::get("/api/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptions"], 1);
    assert_eq!(body["articles"], 11);

    let delete = |endpoint: &str| {
        Request::delete("/api/subscriptions")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "endpoint": endpoint }).to_string()))
            .unwrap()
    };
    let (status, _) = send(app.clone(), delete("https://push.example.com/send/abc")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app.clone(), delete("https://push.example.com/send/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app,
        post_json(
            "/api/subscriptions",
            json!({ "endpoint": "not a url", "keys": { "p256dh": "k", "auth": "a" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
