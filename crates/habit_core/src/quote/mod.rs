//! Reward quote acquisition.
//!
//! # Responsibility
//! - Fetch one English quote from a remote source.
//! - Translate it into the stored bilingual shape.
//!
//! # Invariants
//! - Sources and translators never touch storage; persistence stays in the
//!   quote service.
//! - The English author is kept as-is, only the text is translated.
//! - A quote leaving the pipeline has every field filled; a blank field is an
//!   upstream failure, not a caller mistake.

mod dummyjson;
mod gemini;
mod stub;

pub use dummyjson::DummyJsonSource;
pub use gemini::{extract_json_object, GeminiTranslator};
pub use stub::{PassthroughTranslator, StaticQuoteSource};

use crate::config::QuoteConfig;
use crate::model::quote::NewQuote;
use crate::model::ValidationError;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub type QuoteResult<T> = Result<T, QuoteError>;

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("quote response is missing `{0}`")]
    MissingField(&'static str),
    #[error("could not parse translation: {0}")]
    Parse(String),
    #[error("quote source has no quotes")]
    Exhausted,
    #[error("translated quote is incomplete: {0}")]
    Incomplete(#[from] ValidationError),
}

/// Untranslated quote as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuote {
    pub text: String,
    pub author: String,
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> QuoteResult<RawQuote>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, raw: RawQuote) -> QuoteResult<NewQuote>;
}

/// Source plus translator, shared across request handlers.
#[derive(Clone)]
pub struct QuotePipeline {
    source: Arc<dyn QuoteSource>,
    translator: Arc<dyn Translator>,
}

impl QuotePipeline {
    pub fn new(source: Arc<dyn QuoteSource>, translator: Arc<dyn Translator>) -> Self {
        Self { source, translator }
    }

    /// Builds the remote pipeline described by `config`.
    ///
    /// Falls back to [`PassthroughTranslator`] when the API key variable is unset.
    pub fn from_config(config: &QuoteConfig) -> QuoteResult<Self> {
        let client = build_client(config.timeout_secs)?;
        let source: Arc<dyn QuoteSource> =
            Arc::new(DummyJsonSource::new(client.clone(), &config.source_base_url));

        let translator: Arc<dyn Translator> = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                info!(
                    "event=quote_pipeline module=quote status=ok translator=gemini model={}",
                    config.translator_model
                );
                Arc::new(GeminiTranslator::new(
                    client,
                    &config.translator_base_url,
                    &config.translator_model,
                    key,
                ))
            }
            _ => {
                warn!(
                    "event=quote_pipeline module=quote status=degraded translator=passthrough reason=missing_api_key env={}",
                    config.api_key_env
                );
                Arc::new(PassthroughTranslator)
            }
        };

        Ok(Self::new(source, translator))
    }

    /// Fetches and translates one quote.
    ///
    /// # Errors
    /// - `Incomplete` when the translator left a field blank.
    pub async fn next_quote(&self) -> QuoteResult<NewQuote> {
        let raw = self.source.fetch().await?;
        let quote = self.translator.translate(raw).await?;
        quote.validate()?;
        Ok(quote)
    }
}

/// Shared HTTP client for quote sources and translators.
pub fn build_client(timeout_secs: u64) -> QuoteResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("habit/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pipeline_runs_source_then_translator() {
        let pipeline = QuotePipeline::new(
            Arc::new(StaticQuoteSource::new(vec![RawQuote {
                text: "Well begun is half done.".to_string(),
                author: "Aristotle".to_string(),
            }])),
            Arc::new(PassthroughTranslator),
        );

        let quote = pipeline.next_quote().await.unwrap();
        assert_eq!(quote.quote_en, "Well begun is half done.");
        assert_eq!(quote.quote_ja, "Well begun is half done.");
        assert_eq!(quote.author, "Aristotle");
    }

    struct BlankJapanese;

    #[async_trait]
    impl Translator for BlankJapanese {
        async fn translate(&self, raw: RawQuote) -> QuoteResult<NewQuote> {
            Ok(NewQuote {
                quote_en: raw.text,
                quote_ja: "  ".to_string(),
                author: raw.author,
            })
        }
    }

    #[tokio::test]
    async fn blank_translation_is_incomplete() {
        let pipeline = QuotePipeline::new(
            Arc::new(StaticQuoteSource::new(vec![RawQuote {
                text: "Fortune favors the bold.".to_string(),
                author: "Virgil".to_string(),
            }])),
            Arc::new(BlankJapanese),
        );

        let err = pipeline.next_quote().await.unwrap_err();
        assert!(matches!(
            err,
            QuoteError::Incomplete(ValidationError::EmptyQuoteField("quote_ja"))
        ));
    }

    #[test]
    fn build_client_with_default_timeout() {
        assert!(build_client(QuoteConfig::default().timeout_secs).is_ok());
    }
}
