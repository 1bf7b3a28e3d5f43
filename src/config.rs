// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

pub const DEFAULT_USER_ID: i64 = 1;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Identity context: every command runs on behalf of this user.
    pub user_id: i64,
    pub busy_timeout: Duration,
}

impl Config {
    /// Resolve settings from top-level CLI matches. Flags already fold in their
    /// environment variables, so anything still missing falls back to defaults.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let db_path = match m.get_one::<String>("db") {
            Some(p) => PathBuf::from(p.trim()),
            None => default_db_path()?,
        };
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        }
        let user_id = m
            .get_one::<i64>("user")
            .copied()
            .unwrap_or(DEFAULT_USER_ID);
        let busy_ms = m
            .get_one::<u64>("busy-timeout")
            .copied()
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
        Ok(Self {
            db_path,
            user_id,
            busy_timeout: Duration::from_millis(busy_ms),
        })
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketledger.sqlite"))
}
