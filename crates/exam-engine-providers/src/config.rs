//! Configuration loading and sync backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use exam_engine_core::traits::ExamSync;

use crate::directory::DirectorySync;
use crate::error::ProviderError;
use crate::mock::MemorySync;

/// Configuration for the sync backend.
///
/// Note: Custom Debug impl masks the access token to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyncConfig {
    Memory,
    Directory {
        path: PathBuf,
        /// Remote the directory mirrors, e.g. `https://github.com/acme/exam-questions`.
        /// Shown alongside the store location; the directory itself is local.
        #[serde(default)]
        repo_url: Option<String>,
        /// Credential for the remote. Reserved: no backend sends it yet.
        #[serde(default)]
        access_token: Option<String>,
        #[serde(default = "default_branch")]
        branch: String,
    },
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncConfig::Memory => f.debug_struct("Memory").finish(),
            SyncConfig::Directory {
                path,
                repo_url,
                access_token,
                branch,
            } => f
                .debug_struct("Directory")
                .field("path", path)
                .field("repo_url", repo_url)
                .field("access_token", &access_token.as_ref().map(|_| "***"))
                .field("branch", branch)
                .finish(),
        }
    }
}

impl SyncConfig {
    /// Human-readable description of where this store lives.
    pub fn location(&self) -> String {
        match self {
            SyncConfig::Memory => "in-memory store".to_string(),
            SyncConfig::Directory {
                path,
                repo_url,
                branch,
                ..
            } => match repo_url {
                Some(url) => format!("{} ({url}, branch {branch})", path.display()),
                None => format!("{} (branch {branch})", path.display()),
            },
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

/// Top-level exam-engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamEngineConfig {
    /// Where exams and records are synced. `None` means not connected.
    #[serde(default)]
    pub sync: Option<SyncConfig>,
    /// Directory archived attempt records are written to.
    #[serde(default = "default_records_dir")]
    pub records_dir: PathBuf,
    /// Countdown tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_records_dir() -> PathBuf {
    PathBuf::from("./exam-results")
}
fn default_tick_interval() -> u64 {
    1000
}

impl Default for ExamEngineConfig {
    fn default() -> Self {
        Self {
            sync: None,
            records_dir: default_records_dir(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_sync_config(config: &SyncConfig) -> SyncConfig {
    match config {
        SyncConfig::Memory => SyncConfig::Memory,
        SyncConfig::Directory {
            path,
            repo_url,
            access_token,
            branch,
        } => SyncConfig::Directory {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
            repo_url: repo_url.as_ref().map(|u| resolve_env_vars(u)),
            access_token: access_token.as_ref().map(|t| resolve_env_vars(t)),
            branch: resolve_env_vars(branch),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `exam-engine.toml` in the current directory
/// 2. `~/.config/exam-engine/config.toml`
///
/// Environment variable override: `EXAM_ENGINE_SYNC_TOKEN`.
pub fn load_config() -> Result<ExamEngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamEngineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("exam-engine.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamEngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamEngineConfig::default(),
    };

    config.sync = config.sync.as_ref().map(resolve_sync_config);

    if let Ok(token) = std::env::var("EXAM_ENGINE_SYNC_TOKEN") {
        if let Some(SyncConfig::Directory { access_token, .. }) = config.sync.as_mut() {
            *access_token = Some(token);
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("exam-engine"))
}

/// Create a sync backend from the configuration.
pub fn create_sync(config: Option<&SyncConfig>) -> Result<Arc<dyn ExamSync>> {
    match config {
        None => Err(ProviderError::NotConnected(
            "add a [sync] section to exam-engine.toml".into(),
        )
        .into()),
        Some(SyncConfig::Memory) => Ok(Arc::new(MemorySync::new())),
        Some(SyncConfig::Directory { path, branch, .. }) => {
            Ok(Arc::new(DirectorySync::new(path.clone(), branch.clone())))
        }
    }
}
