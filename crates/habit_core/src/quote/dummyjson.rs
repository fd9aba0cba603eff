//! Random quote source backed by the dummyjson quotes API.

use super::{QuoteError, QuoteResult, QuoteSource, RawQuote};
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct RandomQuoteBody {
    quote: Option<String>,
    author: Option<String>,
}

/// Fetches `{base_url}/quotes/random`.
pub struct DummyJsonSource {
    client: reqwest::Client,
    url: String,
}

impl DummyJsonSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/quotes/random", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl QuoteSource for DummyJsonSource {
    async fn fetch(&self) -> QuoteResult<RawQuote> {
        let started_at = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        let body: RandomQuoteBody = match response {
            Ok(response) => response.json().await?,
            Err(err) => {
                error!(
                    "event=quote_fetch module=quote status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        info!(
            "event=quote_fetch module=quote status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );

        Ok(RawQuote {
            text: body
                .quote
                .filter(|value| !value.trim().is_empty())
                .ok_or(QuoteError::MissingField("quote"))?,
            author: body
                .author
                .filter(|value| !value.trim().is_empty())
                .ok_or(QuoteError::MissingField("author"))?,
        })
    }
}
