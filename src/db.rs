// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Billetera", "billetera"));

pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("billetera.sqlite"))
}

pub fn open_at(path: &Path) -> anyhow::Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- key/value blobs, one serialized document per key
    CREATE TABLE IF NOT EXISTS storage(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- per-day TRM lookups, cleared by a manual refresh
    CREATE TABLE IF NOT EXISTS fx_cache(
        date TEXT PRIMARY KEY,
        rate TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Stored baseline TRM, if any parses as a positive decimal.
pub fn get_base_rate(conn: &Connection) -> Result<Option<Decimal>> {
    Ok(get_setting(conn, "base_rate")?
        .and_then(|s| s.parse::<Decimal>().ok())
        .filter(|r| *r > Decimal::ZERO))
}

pub fn set_base_rate(conn: &Connection, rate: Decimal) -> Result<()> {
    set_setting(conn, "base_rate", &rate.to_string())
}

pub fn load_rate_cache(conn: &Connection) -> Result<BTreeMap<String, Decimal>> {
    let mut stmt = conn.prepare("SELECT date, rate FROM fx_cache ORDER BY date")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = BTreeMap::new();
    for row in rows {
        let (date, rate) = row?;
        match rate.parse::<Decimal>() {
            Ok(r) => {
                out.insert(date, r);
            }
            Err(_) => tracing::warn!(%date, %rate, "skipping unreadable cached rate"),
        }
    }
    Ok(out)
}

/// Replaces the persisted cache with `entries`.
pub fn save_rate_cache(conn: &mut Connection, entries: &BTreeMap<String, Decimal>) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM fx_cache", [])?;
    for (date, rate) in entries {
        tx.execute(
            "INSERT INTO fx_cache(date, rate) VALUES (?1, ?2)",
            params![date, rate.to_string()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn read_blob(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM storage WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn write_blob(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO storage(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn base_rate_round_trip() {
        let conn = mem();
        assert_eq!(get_base_rate(&conn).unwrap(), None);
        set_base_rate(&conn, Decimal::new(395012, 2)).unwrap();
        assert_eq!(get_base_rate(&conn).unwrap(), Some(Decimal::new(395012, 2)));
        set_setting(&conn, "base_rate", "garbage").unwrap();
        assert_eq!(get_base_rate(&conn).unwrap(), None);
    }

    #[test]
    fn rate_cache_is_replaced() {
        let mut conn = mem();
        let mut m = BTreeMap::new();
        m.insert("2025-08-01".to_string(), Decimal::new(4000, 0));
        m.insert("2025-08-02".to_string(), Decimal::new(4010, 0));
        save_rate_cache(&mut conn, &m).unwrap();
        assert_eq!(load_rate_cache(&conn).unwrap(), m);

        save_rate_cache(&mut conn, &BTreeMap::new()).unwrap();
        assert!(load_rate_cache(&conn).unwrap().is_empty());
    }
}
