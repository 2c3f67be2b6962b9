//! Shared HTTP plumbing for the adapters.

use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use tokio::time::sleep;

use crate::model::ScrapeError;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ScrapeError::InvalidResponse(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    /// Sleeps for the configured delay with up to 20% jitter, so request
    /// spacing doesn't look mechanical.
    pub async fn polite_delay(&self, base_seconds: u64) {
        if base_seconds == 0 {
            return;
        }
        let jitter = rand::rng().random_range(0.9..1.2);
        let millis = (base_seconds as f64 * 1000.0 * jitter) as u64;
        sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
