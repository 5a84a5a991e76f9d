use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::domain::entities::query::DEFAULT_PAGE_SIZE;

pub const DB_PATH_ENV: &str = "BACKOFFICE_DB_PATH";
pub const PAGE_SIZE_ENV: &str = "BACKOFFICE_PAGE_SIZE";
pub const LOG_ENV: &str = "BACKOFFICE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "backoffice=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub page_size: i64,
    pub log_filter: String,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "backoffice", "backoffice")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("backoffice.sqlite"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn parse_page_size(raw: &str) -> Result<i64> {
    let page_size = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("{PAGE_SIZE_ENV} must be an integer, got {raw:?}"))?;
    if page_size <= 0 {
        anyhow::bail!("{PAGE_SIZE_ENV} must be greater than zero, got {page_size}")
    }
    Ok(page_size)
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = project_dirs()?.data_local_dir().to_path_buf();
        let db_path = match lookup(DB_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => data_dir.join("backoffice.sqlite"),
        };
        let page_size = match lookup(PAGE_SIZE_ENV) {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let log_filter = lookup(LOG_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            db_path,
            data_dir,
            page_size,
            log_filter,
        })
    }

    pub fn webview_data_dir(&self) -> Result<PathBuf> {
        ensure_webview_data_dir(&self.data_dir)
    }
}
