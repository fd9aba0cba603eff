use habit_core::db::migrations::latest_version;
use habit_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

const V1_SCHEMA: &str = include_str!("../src/db/migrations/0001_init.sql");

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name;",
        )
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    stmt.query_map([], |row| row.get(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn fresh_database_has_full_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(
        table_names(&conn),
        vec!["achievement_items", "achievements", "items", "quotes"]
    );
    assert!(column_names(&conn, "items").contains(&"persistent".to_string()));
    assert!(column_names(&conn, "achievement_items").contains(&"persistent".to_string()));
}

#[test]
fn v1_database_is_upgraded_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habit.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(V1_SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO items (title, is_custom) VALUES ('早起きする', 1);
             PRAGMA user_version = 1;",
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let (title, persistent): (String, i64) = conn
        .query_row("SELECT title, persistent FROM items;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(title, "早起きする");
    assert_eq!(persistent, 0);
}

#[test]
fn reopening_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("habit.db");

    open_db(&path)
        .unwrap()
        .execute("INSERT INTO achievements (date) VALUES ('2025-09-11');", [])
        .unwrap();

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM achievements;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn unknown_future_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
    assert!(err.to_string().contains("999"));
}

#[test]
fn one_achievement_per_date() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO achievements (date) VALUES ('2025-09-11');", [])
        .unwrap();
    assert!(conn
        .execute("INSERT INTO achievements (date) VALUES ('2025-09-11');", [])
        .is_err());
}

#[test]
fn deleting_an_achievement_cascades_to_its_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO items (title) VALUES ('a');
         INSERT INTO achievements (date) VALUES ('2025-09-11');
         INSERT INTO achievement_items (achievement_id, item_id, status) VALUES (1, 1, 1);
         INSERT INTO quotes (achievement_id, quote_en, quote_ja, author) VALUES (1, 'e', 'j', 'a');
         DELETE FROM achievements WHERE id = 1;",
    )
    .unwrap();

    for table in ["achievement_items", "quotes"] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "{table} rows survived");
    }
}
