// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DEALGRID_LOG";

/// Filter directive: a non-blank `DEALGRID_LOG` wins over the config level.
pub fn filter_directive(env_value: Option<String>, config_level: &str) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ => config_level.to_owned(),
    }
}

/// Routes `tracing` output to `path`. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr.
pub fn init(path: &Path, config_level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {}; set [log].file to a writable path",
                path.display()
            )
        })?;

    let directive = filter_directive(env::var(LOG_ENV).ok(), config_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("parse log filter {directive:?} from {LOG_ENV} or [log].level"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::filter_directive;

    #[test]
    fn env_value_overrides_config_level() {
        assert_eq!(
            filter_directive(Some("dealgrid_app=trace".to_owned()), "info"),
            "dealgrid_app=trace"
        );
    }

    #[test]
    fn blank_env_value_falls_back_to_config() {
        assert_eq!(filter_directive(Some("  ".to_owned()), "warn"), "warn");
        assert_eq!(filter_directive(None, "debug"), "debug");
    }
}
