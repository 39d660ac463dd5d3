use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{domain::search_result::SearchResult, error::Result};

use super::SearchProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google results through the Serper.dev API.
pub struct SerperClient {
    client: Client,
    api_key: String,
    url: String,
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    num: usize,
    #[serde(rename = "type")]
    search_type: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl SerperClient {
    pub fn new(api_key: String, url: String) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(SerperClient {
            client,
            api_key,
            url,
        })
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        log::info!("Searching for: {}", query);

        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchQuery {
                q: query,
                num: count,
                search_type: "search",
            })
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = response.json().await?;
        let results = into_search_results(body);

        log::info!("Found {} search results for: {}", results.len(), query);
        Ok(results)
    }
}

fn into_search_results(body: ApiResponse) -> Vec<SearchResult> {
    body.organic
        .into_iter()
        .filter(|r| !r.link.trim().is_empty())
        .map(|r| SearchResult {
            title: r.title,
            snippet: r.snippet,
            link: r.link,
        })
        .collect()
}
