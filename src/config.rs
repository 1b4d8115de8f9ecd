//! Memopad configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the store URL
pub const DATABASE_URL_ENV: &str = "MEMOPAD_DATABASE_URL";

const REDACTED: &str = "********";

/// Main Memopad configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemopadConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Text-generation service configuration
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl MemopadConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from an explicit path, else the default location if it exists,
    /// else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Copy safe to print: an inline API key is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.generation.api_key.is_some() {
            config.generation.api_key = Some(REDACTED.to_string());
        }
        config
    }

    /// Default config file (~/.memopad/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|h| h.join(".memopad").join("config.toml"))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            cors_origins: Vec::new(),
        }
    }
}

/// Relational store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path, or `:memory:`
    pub url: Option<String>,
}

impl StoreConfig {
    /// Resolve the store URL, preferring `$MEMOPAD_DATABASE_URL`.
    ///
    /// A missing store URL is fatal for the server.
    pub fn resolve_url(&self) -> Result<String> {
        std::env::var(DATABASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.url.clone().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "Store URL is not configured (set {} or [store].url)",
                    DATABASE_URL_ENV
                ))
            })
    }
}

/// Text-generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Inline API key (takes precedence over the environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Model id
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash-001".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Resolve the API key. Looked up on every call so a key exported after
    /// startup is picked up; absence is reported per call, not at startup.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .or_else(|_| std::env::var(self.api_key_env.to_uppercase()))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not configured", self.api_key_env)))
    }
}
