//! Japanese translation through the Gemini `generateContent` API.

use super::{QuoteError, QuoteResult, RawQuote, Translator};
use crate::model::quote::NewQuote;
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

pub struct GeminiTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiTranslator {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, api_key: String) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TranslatedQuote {
    quote: String,
}

fn build_prompt(raw: &RawQuote) -> String {
    format!(
        "以下の英語の名言と作者名を自然な日本語に翻訳してください。\
         結果は必ず下記のJSON形式で、他のテキストは一切含めずに返してください。\n\
         {{\"quote\": \"翻訳された名言\",\"author\": \"翻訳された作者名\"}}\n\
         ---Text: \"{}\"\nAuthor: \"{}\"",
        raw.text, raw.author
    )
}

/// Returns the slice between the first `{` and the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(&self, raw: RawQuote) -> QuoteResult<NewQuote> {
        let started_at = Instant::now();
        let body = json!({
            "contents": [
                { "parts": [ { "text": build_prompt(&raw) } ] }
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);
        let reply: GenerateResponse = match response {
            Ok(response) => response.json().await.map_err(reqwest::Error::without_url)?,
            Err(err) => {
                // Strip the URL: it carries the API key in its query string.
                let err = err.without_url();
                error!(
                    "event=quote_translate module=quote status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let text = reply
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or(QuoteError::MissingField("candidates[0].content.parts[0].text"))?;

        let object = extract_json_object(text)
            .ok_or_else(|| QuoteError::Parse(format!("no JSON object in reply: {text}")))?;
        let translated: TranslatedQuote =
            serde_json::from_str(object).map_err(|err| QuoteError::Parse(err.to_string()))?;

        info!(
            "event=quote_translate module=quote status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );

        Ok(NewQuote {
            quote_en: raw.text,
            quote_ja: translated.quote,
            author: raw.author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let reply = "```json\n{\"quote\": \"千里の道も一歩から\", \"author\": \"老子\"}\n```";
        assert_eq!(
            extract_json_object(reply),
            Some("{\"quote\": \"千里の道も一歩から\", \"author\": \"老子\"}")
        );
    }

    #[test]
    fn extraction_fails_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[test]
    fn prompt_embeds_text_and_author() {
        let prompt = build_prompt(&RawQuote {
            text: "Carpe diem.".to_string(),
            author: "Horace".to_string(),
        });
        assert!(prompt.contains("---Text: \"Carpe diem.\""));
        assert!(prompt.contains("Author: \"Horace\""));
    }

    #[test]
    fn endpoint_targets_model() {
        let translator = GeminiTranslator::new(
            reqwest::Client::new(),
            "https://example.test/v1beta/",
            "gemini-1.5-flash-latest",
            "secret".to_string(),
        );
        assert_eq!(
            translator.endpoint,
            "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }
}
