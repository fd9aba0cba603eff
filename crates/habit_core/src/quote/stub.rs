//! Offline quote source and translator.

use super::{QuoteError, QuoteResult, QuoteSource, RawQuote, Translator};
use crate::model::quote::NewQuote;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a fixed list of quotes round-robin.
pub struct StaticQuoteSource {
    quotes: Vec<RawQuote>,
    cursor: AtomicUsize,
}

impl StaticQuoteSource {
    pub fn new(quotes: Vec<RawQuote>) -> Self {
        Self {
            quotes,
            cursor: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn fetch(&self) -> QuoteResult<RawQuote> {
        if self.quotes.is_empty() {
            return Err(QuoteError::Exhausted);
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.quotes.len();
        Ok(self.quotes[index].clone())
    }
}

/// Copies the English text into the Japanese slot.
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, raw: RawQuote) -> QuoteResult<NewQuote> {
        Ok(NewQuote {
            quote_ja: raw.text.clone(),
            quote_en: raw.text,
            author: raw.author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawQuote {
        RawQuote {
            text: text.to_string(),
            author: "anon".to_string(),
        }
    }

    #[tokio::test]
    async fn static_source_cycles() {
        let source = StaticQuoteSource::new(vec![raw("a"), raw("b")]);
        let texts = [
            source.fetch().await.unwrap().text,
            source.fetch().await.unwrap().text,
            source.fetch().await.unwrap().text,
        ];
        assert_eq!(texts, ["a", "b", "a"]);
    }

    #[tokio::test]
    async fn empty_static_source_is_exhausted() {
        let source = StaticQuoteSource::new(Vec::new());
        assert!(matches!(source.fetch().await, Err(QuoteError::Exhausted)));
    }
}
