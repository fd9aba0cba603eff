//! Quote reveal service.
//!
//! Fetching a quote involves network calls, so this service owns the shared
//! connection and locks it only around the storage steps.

use super::{ServiceError, ServiceResult};
use crate::db::SharedConnection;
use crate::model::achievement::AchievementId;
use crate::model::quote::{NewQuote, Quote};
use crate::quote::QuotePipeline;
use crate::repo::quote_repo::{QuoteRepository, SqliteQuoteRepository};
use log::{info, warn};

#[derive(Clone)]
pub struct QuoteService {
    conn: SharedConnection,
    pipeline: QuotePipeline,
}

impl QuoteService {
    pub fn new(conn: SharedConnection, pipeline: QuotePipeline) -> Self {
        Self { conn, pipeline }
    }

    /// Fetches, translates and stores one new quote for the achievement.
    pub async fn reveal(&self, achievement_id: AchievementId) -> ServiceResult<Quote> {
        {
            let conn = self.conn.lock().map_err(|_| ServiceError::StorageUnavailable)?;
            if !SqliteQuoteRepository::new(&conn).achievement_exists(achievement_id)? {
                return Err(ServiceError::AchievementNotFound(achievement_id));
            }
        }

        let quote = match self.pipeline.next_quote().await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(
                    "event=quote_reveal module=service status=error achievement_id={achievement_id} error={err}"
                );
                return Err(err.into());
            }
        };

        let stored = self.attach(achievement_id, &quote)?;
        info!(
            "event=quote_reveal module=service status=ok achievement_id={achievement_id} quote_id={}",
            stored.id
        );
        Ok(stored)
    }

    /// Stores a caller-provided quote for the achievement.
    pub fn attach(&self, achievement_id: AchievementId, quote: &NewQuote) -> ServiceResult<Quote> {
        let conn = self.conn.lock().map_err(|_| ServiceError::StorageUnavailable)?;
        Ok(SqliteQuoteRepository::new(&conn).create_quote(achievement_id, quote)?)
    }
}
