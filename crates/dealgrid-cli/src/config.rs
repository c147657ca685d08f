// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ui {
    pub page_rows: Option<i64>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_rows: Some(dealgrid_tui::DEFAULT_PAGE_ROWS as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("DEALGRID_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set DEALGRID_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(dealgrid_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [storage], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            dealgrid_db::validate_db_path(db_path)?;
        }

        if let Some(page_rows) = self.ui.page_rows
            && page_rows <= 0
        {
            bail!(
                "ui.page_rows in {} must be positive, got {}",
                path.display(),
                page_rows
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter: {level:?}; use a level such as \"info\" or \"dealgrid_app=debug\"",
                    path.display()
                )
            })?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!("log.file in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => dealgrid_db::default_db_path(),
        }
    }

    pub fn page_rows(&self) -> usize {
        self.ui
            .page_rows
            .and_then(|rows| usize::try_from(rows).ok())
            .filter(|rows| *rows > 0)
            .unwrap_or(dealgrid_tui::DEFAULT_PAGE_ROWS)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }

        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to a writable log path")
        })?;
        Ok(data_root
            .join(dealgrid_db::APP_NAME)
            .join(format!("{}.log", dealgrid_db::APP_NAME)))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# dealgrid config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/dealgrid/dealgrid.db)\n# db_path = \"/absolute/path/to/dealgrid.db\"\n\n[ui]\n# Rows moved by ctrl+d and ctrl+u\npage_rows = {}\n\n[log]\n# Overridden by DEALGRID_LOG when set\nlevel = \"{}\"\n# file = \"/absolute/path/to/dealgrid.log\"\n",
            path.display(),
            dealgrid_tui::DEFAULT_PAGE_ROWS,
            DEFAULT_LOG_LEVEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.page_rows(), 10);
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\npage_rows = 5\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[storage], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[storage]\ndb_path = \"/data/deals.db\"\n[ui]\npage_rows = 25\n[log]\nlevel = \"dealgrid_app=debug\"\nfile = \"/tmp/dealgrid-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.db_path()?, PathBuf::from("/data/deals.db"));
        assert_eq!(config.page_rows(), 25);
        assert_eq!(config.log_level(), "dealgrid_app=debug");
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/dealgrid-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_sections_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[llm]\nmodel = \"qwen3\"\n")?;
        let error = Config::load(&path).expect_err("unknown section should fail");
        assert!(error.to_string().contains("decode config"));
        Ok(())
    }

    #[test]
    fn page_rows_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\npage_rows = 0\n")?;
        let error = Config::load(&path).expect_err("zero page rows should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"dealgrid=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad filter should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("DEALGRID_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("DEALGRID_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn db_path_prefers_storage_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"/explicit/from-config.db\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("DEALGRID_DB_PATH", "/from/env.db");
        }
        let config = Config::load(&path)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("DEALGRID_DB_PATH");
        }
        assert_eq!(config.db_path()?, PathBuf::from("/explicit/from-config.db"));
        Ok(())
    }

    #[test]
    fn db_path_uses_env_override_when_storage_db_path_missing() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("DEALGRID_DB_PATH", "/from/env-only.db");
        }
        let config = Config::load(&path)?;
        let resolved = config.db_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("DEALGRID_DB_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.db"));
        Ok(())
    }

    #[test]
    fn db_path_rejects_uri_style_storage_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[storage]\ndb_path = \"https://evil.example/deals.db\"\n")?;
        let error = Config::load(&path).expect_err("URI db_path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("[storage]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.page_rows(), 10);
        Ok(())
    }
}
