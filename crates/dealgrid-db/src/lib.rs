// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod seed;

use anyhow::{Context, Result, anyhow, bail};
use dealgrid_app::ViewSlot;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

pub use seed::seed_deals;

pub const APP_NAME: &str = "dealgrid";
pub const VIEW_STATE_KEY: &str = "view_state";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("settings", &["key", "value", "updated_at"])];

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read setting {key}"))
    }

    pub fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert setting {key}"))?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?", params![key])
            .with_context(|| format!("delete setting {key}"))?;
        Ok(removed > 0)
    }

    /// Drops the persisted view so the next load starts from defaults.
    pub fn reset_view_state(&self) -> Result<bool> {
        let removed = self.delete_setting(VIEW_STATE_KEY)?;
        debug!(removed, "reset persisted view state");
        Ok(removed)
    }
}

impl ViewSlot for Store {
    fn read_view(&self) -> Result<Option<String>> {
        self.get_setting(VIEW_STATE_KEY)
    }

    fn write_view(&mut self, blob: &str) -> Result<()> {
        self.put_setting(VIEW_STATE_KEY, blob)
    }

    fn clear_view(&mut self) -> Result<()> {
        self.reset_view_state().map(|_| ())
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("DEALGRID_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set DEALGRID_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("dealgrid.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at a dealgrid database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("prepare table info for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query table info for {table}"))?;
    let mut columns = BTreeSet::new();
    for row in rows {
        columns.insert(row.with_context(|| format!("read column name for {table}"))?);
    }
    Ok(columns)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
