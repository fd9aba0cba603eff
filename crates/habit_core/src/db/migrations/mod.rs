//! Schema migrations for the habit store.
//!
//! Each step is an embedded SQL file tagged with the `user_version` it leaves
//! the database at. Steps above the stored version run in order inside a
//! single transaction, so a failed upgrade leaves the file untouched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs, strictly increasing.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_init.sql")),
    (2, include_str!("0002_item_persistent.sql")),
];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

fn pending(stored: u32) -> impl Iterator<Item = &'static (u32, &'static str)> {
    STEPS.iter().filter(move |&&(version, _)| version > stored)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }
    if stored == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, sql) in pending(stored) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={stored} to_version={latest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_strictly_increasing_from_one() {
        assert_eq!(STEPS[0].0, 1);
        assert!(STEPS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn pending_skips_applied_steps() {
        assert_eq!(pending(0).count(), STEPS.len());
        assert_eq!(pending(1).map(|&(version, _)| version).collect::<Vec<_>>(), vec![2]);
        assert_eq!(pending(latest_version()).count(), 0);
    }
}
