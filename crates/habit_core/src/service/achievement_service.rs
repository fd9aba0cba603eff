//! Achievement use-case service.
//!
//! # Invariants
//! - A record response grants `quote_chances == completed_count`; the count
//!   is cumulative for the day, not a delta against the previous record.

use super::{ServiceError, ServiceResult};
use crate::calendar::YearMonth;
use crate::model::achievement::{Achievement, AchievementRecord, CalendarEntry};
use crate::repo::achievement_repo::AchievementRepository;
use chrono::NaiveDate;

pub struct AchievementService<R: AchievementRepository> {
    repo: R,
}

impl<R: AchievementRepository> AchievementService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores the day's completion snapshot and returns it with quote chances.
    pub fn record(&mut self, record: &AchievementRecord) -> ServiceResult<Achievement> {
        let mut achievement = self.repo.upsert_achievement(record)?;
        achievement.quote_chances = achievement.completed_count;
        Ok(achievement)
    }

    pub fn get_by_date(&self, date: NaiveDate) -> ServiceResult<Achievement> {
        self.repo
            .get_achievement_by_date(date)?
            .ok_or(ServiceError::NoRecordForDate(date))
    }

    /// Calendar entries for `month`, ordered by date.
    pub fn month(&self, month: YearMonth) -> ServiceResult<Vec<CalendarEntry>> {
        Ok(self.repo.list_month(month)?)
    }
}
