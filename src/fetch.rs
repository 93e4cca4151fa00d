use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::tweet::{Tweet, TweetId};

/// The fetch seam between the bridge relay and the remote tweet API.
/// Tests substitute an in-memory implementation.
#[async_trait]
pub trait TweetFetcher: Send + Sync {
    async fn fetch(&self, id: &TweetId) -> Result<Tweet>;
}

/// Fetches tweets from the chirp web service: `GET <base>/api/tweet/<id>`.
/// The endpoint is idempotent per id; caching and revalidation are its
/// concern, not ours.
pub struct HttpTweetFetcher {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTweetFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("chirp-widget/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl TweetFetcher for HttpTweetFetcher {
    async fn fetch(&self, id: &TweetId) -> Result<Tweet> {
        let url = format!("{}/api/tweet/{}", self.base_url, id);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("tweet API error: {}", response.status()));
        }

        let tweet: Tweet = response.json().await?;
        Ok(tweet)
    }
}
