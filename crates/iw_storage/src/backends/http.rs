use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use iw_core::{Article, ArticleCatalog, ArticleFilter, Error, Result};
use reqwest::{Client, StatusCode};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog served by a remote HTTP API exposing `GET /articles` and
/// `GET /articles/{id}`.
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// `timeout` bounds each whole request, so a stalled catalog surfaces as
    /// an upstream failure instead of hanging the caller.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid catalog URL {}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "catalog URL must use http or https, got {}",
                base_url.scheme()
            )));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build catalog client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn articles_url(&self) -> Result<Url> {
        self.base_url
            .join("articles")
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub(crate) fn article_url(&self, id: &str) -> Result<Url> {
        let mut url = self.articles_url()?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be a base URL", self.base_url)))?
            .push(id);
        Ok(url)
    }
}

fn upstream(context: &str, e: reqwest::Error) -> Error {
    Error::upstream(format!("{}: {}", context, e))
}

#[async_trait]
impl ArticleCatalog for HttpCatalog {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_articles(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let url = self.articles_url()?;
        let response = self
            .client
            .get(url.clone())
            .query(filter)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream(url.as_str(), e))?;
        response
            .json::<Vec<Article>>()
            .await
            .map_err(|e| upstream(url.as_str(), e))
    }

    async fn get_article_by_id(&self, id: &str) -> Result<Option<Article>> {
        let url = self.article_url(id)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| upstream(url.as_str(), e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| upstream(url.as_str(), e))?;
        response
            .json::<Article>()
            .await
            .map(Some)
            .map_err(|e| upstream(url.as_str(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_urls() {
        let catalog = HttpCatalog::new("https://blog.example.com/api").unwrap();
        assert_eq!(
            catalog.articles_url().unwrap().as_str(),
            "https://blog.example.com/api/articles"
        );
        assert_eq!(
            catalog.article_url("a 1/b").unwrap().as_str(),
            "https://blog.example.com/api/articles/a%201%2Fb"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(HttpCatalog::new("not a url"), Err(Error::Config(_))));
        assert!(matches!(
            HttpCatalog::new("ftp://example.com/"),
            Err(Error::Config(_))
        ));
    }

    fn article_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "slug": id,
            "title": format!("Article {}", id),
            "excerpt": null,
            "date": "2024-04-01T00:00:00Z",
            "category": "Design",
            "categorySlug": "design",
            "author": null
        })
    }

    #[tokio::test]
    async fn test_get_articles_forwards_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("category", "design"))
            .and(query_param("limit", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([article_json("a1"), article_json("a2")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let catalog = HttpCatalog::new(&format!("{}/api", server.uri())).unwrap();
        let filter = ArticleFilter {
            category: Some("design".to_string()),
            limit: Some(2),
            ..Default::default()
        };
        let articles = catalog.get_articles(&filter).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].author, "");
    }

    #[tokio::test]
    async fn test_get_article_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(article_json("a1")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/articles/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let catalog = HttpCatalog::new(&server.uri()).unwrap();
        let found = catalog.get_article_by_id("a1").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some("a1".to_string()));
        assert!(catalog.get_article_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = HttpCatalog::new(&server.uri()).unwrap();
        let err = catalog
            .get_articles(&ArticleFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        let err = catalog.get_article_by_id("a1").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/articles/a1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "a1" })),
            )
            .mount(&server)
            .await;

        let catalog = HttpCatalog::new(&server.uri()).unwrap();
        let err = catalog
            .get_articles(&ArticleFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        let err = catalog.get_article_by_id("a1").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_stalled_catalog_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let catalog =
            HttpCatalog::with_timeout(&server.uri(), Duration::from_millis(200)).unwrap();
        let err = catalog
            .get_articles(&ArticleFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
