use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error_handling::{Result, SurveyError};

const SEARCH_URL: &str = "https://api.github.com/search/repositories";
pub const SEARCH_QUERY: &str = "\"eslint-plugin\" in:name";

/// One page of repository search results, as raw JSON items.
#[async_trait]
pub trait RepositorySearch {
    async fn search_page(&self, page: usize, per_page: usize) -> Result<Vec<Value>>;
}

#[derive(Debug, Deserialize)]
struct GitHubSearchResponse {
    #[serde(default)]
    total_count: u64,
    items: Vec<Value>,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        info!("Token detected (authenticated GitHub requests enabled)");
        Ok(Self {
            client,
            token,
        })
    }

    fn query(page: usize, per_page: usize) -> [(&'static str, String); 3] {
        [
            ("q", SEARCH_QUERY.to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ]
    }
}

#[async_trait]
impl RepositorySearch for GitHubClient {
    async fn search_page(&self, page: usize, per_page: usize) -> Result<Vec<Value>> {
        info!("Searching GitHub for {} (page {}, per_page {})", SEARCH_QUERY, page, per_page);

        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&Self::query(page, per_page))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SurveyError::GitHub(format!(
                "Search failed for page {} ({}): {}",
                page, status, body
            )));
        }

        let search_resp: GitHubSearchResponse = resp.json().await?;
        debug!("Search reports {} total matches", search_resp.total_count);
        info!("Found {} repositories on page {}", search_resp.items.len(), page);
        Ok(search_resp.items)
    }
}
