//! HTTP client for the habit API.

use chrono::NaiveDate;
use habit_core::{
    Achievement, AchievementId, AchievementRecord, CalendarEntry, Item, NewItem, NewQuote, Quote,
    YearMonth,
};
use log::debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded {status}: {detail}")]
    Status { status: u16, detail: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Typed wrapper over every API endpoint.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("habit-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_items(&self) -> ClientResult<Vec<Item>> {
        let response = self.http.get(self.url("/items")).send().await?;
        decode("list_items", response).await
    }

    pub async fn create_item(&self, item: &NewItem) -> ClientResult<Item> {
        let response = self.http.post(self.url("/items")).json(item).send().await?;
        decode("create_item", response).await
    }

    /// Returns `None` when the day has no record.
    pub async fn achievement(&self, date: NaiveDate) -> ClientResult<Option<Achievement>> {
        let response = self
            .http
            .get(self.url(&format!("/achievements/{date}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode("get_achievement", response).await.map(Some)
    }

    pub async fn month(&self, month: YearMonth) -> ClientResult<Vec<CalendarEntry>> {
        let response = self
            .http
            .get(self.url("/achievements"))
            .query(&[("month", month.to_string())])
            .send()
            .await?;
        decode("list_month", response).await
    }

    pub async fn record(&self, record: &AchievementRecord) -> ClientResult<Achievement> {
        let response = self
            .http
            .post(self.url("/achievements"))
            .json(record)
            .send()
            .await?;
        decode("record", response).await
    }

    pub async fn reveal_quote(&self, achievement_id: AchievementId) -> ClientResult<Quote> {
        let response = self
            .http
            .post(self.url("/achievements/quotes"))
            .query(&[("achievement_id", achievement_id)])
            .send()
            .await?;
        decode("reveal_quote", response).await
    }

    pub async fn attach_quote(
        &self,
        achievement_id: AchievementId,
        quote: &NewQuote,
    ) -> ClientResult<Quote> {
        let response = self
            .http
            .post(self.url(&format!("/achievements/{achievement_id}/quotes")))
            .json(quote)
            .send()
            .await?;
        decode("attach_quote", response).await
    }
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.detail)
            .unwrap_or(text);
        debug!(
            "event=api_call module=client status=error operation={operation} code={}",
            status.as_u16()
        );
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    let body = response.json().await?;
    debug!(
        "event=api_call module=client status=ok operation={operation} code={}",
        status.as_u16()
    );
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_api::AppState;
    use habit_core::db::{open_db_in_memory, share};
    use habit_core::quote::{PassthroughTranslator, StaticQuoteSource};
    use habit_core::{ItemStatus, QuotePipeline, RawQuote};
    use std::sync::Arc;

    async fn start_server() -> (ApiClient, tokio::task::JoinHandle<()>) {
        let pipeline = QuotePipeline::new(
            Arc::new(StaticQuoteSource::new(vec![RawQuote {
                text: "Stay hungry, stay foolish.".to_string(),
                author: "Steve Jobs".to_string(),
            }])),
            Arc::new(PassthroughTranslator),
        );
        let state = AppState::new(share(open_db_in_memory().unwrap()), pipeline);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            habit_api::serve(listener, state, Vec::new()).await.unwrap();
        });
        (ApiClient::new(&format!("http://{addr}/")).unwrap(), handle)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 11).unwrap()
    }

    #[tokio::test]
    async fn client_drives_a_full_day() {
        let (client, handle) = start_server().await;

        let item = client.create_item(&NewItem::new("日記を書く", false)).await.unwrap();
        assert_eq!(client.list_items().await.unwrap(), vec![item.clone()]);
        assert!(client.achievement(date()).await.unwrap().is_none());

        let recorded = client
            .record(&AchievementRecord {
                date: date(),
                items: vec![ItemStatus {
                    item_id: item.id,
                    status: true,
                    persistent: false,
                }],
            })
            .await
            .unwrap();
        assert_eq!(recorded.quote_chances, 1);

        let revealed = client.reveal_quote(recorded.id).await.unwrap();
        assert_eq!(revealed.author, "Steve Jobs");
        let own = client
            .attach_quote(
                recorded.id,
                &NewQuote {
                    quote_en: "Done is better than perfect.".to_string(),
                    quote_ja: "完璧より完了。".to_string(),
                    author: "anon".to_string(),
                },
            )
            .await
            .unwrap();

        let day = client.achievement(date()).await.unwrap().unwrap();
        assert_eq!(day.quotes, vec![revealed, own]);

        let entries = client.month(YearMonth::of(date())).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].completed_count, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let (client, handle) = start_server().await;

        let err = client.reveal_quote(404).await.unwrap_err();
        match err {
            ClientError::Status { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Achievement not found");
            }
            other => panic!("unexpected error: {other}"),
        }

        handle.abort();
    }
}
