use crate::prelude::*;
use std::future::Future;
use std::time::Duration;

use hnscan_core::hn::HnItem;
use serde_json::Value;

pub const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Ranked story lists served by the HackerNews API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StoryList {
    Topstories,
    Newstories,
    Beststories,
}

impl StoryList {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryList::Topstories => "topstories",
            StoryList::Newstories => "newstories",
            StoryList::Beststories => "beststories",
        }
    }
}

/// HTTP client for the HackerNews API.
///
/// Wraps a `reqwest::Client` configured once with the user agent and
/// per-request timeout, and retries every request with exponential backoff.
#[derive(Debug, Clone)]
pub struct HnClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl HnClient {
    pub fn new(timeout: Duration, retries: u32, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: HN_API_BASE.to_string(),
            retries,
        })
    }

    /// Point the client at a different API base, for tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// GET a JSON document, retrying transient failures.
    ///
    /// Send errors, error statuses and undecodable bodies are all retried the
    /// same way; whatever error the last attempt produced is returned.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, Error> {
        with_retries(self.retries, || async move {
            self.http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        })
        .await
        .map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch the ranked id list for a story list.
    pub async fn story_ids(&self, list: StoryList) -> Result<Vec<u64>, Error> {
        let url = format!("{}/{}.json", self.base_url, list.as_str());
        let value = self.fetch_json(&url).await?;

        value
            .as_array()
            .and_then(|values| values.iter().map(Value::as_u64).collect::<Option<Vec<u64>>>())
            .ok_or_else(|| Error::InvalidResponse {
                list: list.as_str().to_string(),
                body: truncate_text(&value.to_string(), 200),
            })
    }

    /// Fetch one item. Absent and malformed records both come back as `None`.
    pub async fn item(&self, id: u64) -> Result<Option<HnItem>, Error> {
        let url = format!("{}/item/{id}.json", self.base_url);
        let value = self.fetch_json(&url).await?;

        if !value.is_object() {
            return Ok(None);
        }

        Ok(serde_json::from_value(value).ok())
    }
}

/// Delay before the next attempt: 0.5s, doubled each retry.
fn backoff_delay(attempt: u32) -> Duration {
    // Clamp the exponent so the shift cannot overflow.
    Duration::from_millis(500u64 << attempt.min(32))
}

/// Run an async operation up to `retries + 1` times, backing off between attempts.
pub(crate) async fn with_retries<T, E, F, Fut>(retries: u32, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= retries {
                    return Err(err);
                }
                tokio::time::sleep(backoff_delay(attempt)).await;
                attempt += 1;
            }
        }
    }
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}
