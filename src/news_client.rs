use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::dispatch::{Article, NewsSource};

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const WEEKLY_QUERY: &str = "artificial intelligence OR \"machine learning\" OR \"generative AI\" OR \"AI agents\" OR \"LLM breakthroughs\"";
const PAGE_SIZE: u32 = 30;
const MAX_ARTICLES: usize = 15;

/// Client for the news aggregation API that feeds the weekly briefing.
pub struct NewsClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(serde::Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(serde::Deserialize)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    source: RawSource,
}

#[derive(serde::Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl NewsClient {
    pub fn new(base_url: String, api_key: Secret<String>, timeout: Option<time::Duration>) -> Self {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    /// Pulls the last seven days of AI coverage, keeping only articles with a
    /// title, description and image, capped at the 15 most popular.
    pub async fn fetch_articles(&self) -> Result<Vec<Article>, reqwest::Error> {
        let url = format!("{}/v2/everything", self.base_url);
        let from = (Utc::now() - Duration::days(7)).to_rfc3339();
        let page_size = PAGE_SIZE.to_string();

        let response: EverythingResponse = self
            .http_client
            .get(&url)
            .header("X-Api-Key", self.api_key.expose_secret())
            .query(&[
                ("q", WEEKLY_QUERY),
                ("from", from.as_str()),
                ("sortBy", "popularity"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let articles = response
            .articles
            .into_iter()
            .filter_map(|raw| {
                Some(Article {
                    title: raw.title?,
                    description: raw.description?,
                    url: raw.url?,
                    image_url: raw.url_to_image?,
                    source_name: raw.source.name.unwrap_or_default(),
                })
            })
            .take(MAX_ARTICLES)
            .collect();

        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn fetch_weekly(&self) -> Result<Vec<Article>, anyhow::Error> {
        let articles = self.fetch_articles().await?;

        Ok(articles)
    }
}
