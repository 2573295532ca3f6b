//! Client configuration from the environment or a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Everything `FileApiClient::from_config` needs to sign in and reach the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub project_id: String,
    pub user_identifier: String,
    pub user_secret: String,
    /// Files API root without the project segment.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Read `SMARTLING_PROJECT_ID`, `SMARTLING_USER_IDENTIFIER` and
    /// `SMARTLING_USER_SECRET`, plus the optional `SMARTLING_BASE_URL`,
    /// `SMARTLING_AUTH_URL` and `SMARTLING_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{name} environment variable is required")))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let timeout_ms = optional("SMARTLING_TIMEOUT_MS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| ApiError::Config(format!("SMARTLING_TIMEOUT_MS: {e}")))
            })
            .transpose()?;

        let config = Self {
            project_id: required("SMARTLING_PROJECT_ID")?,
            user_identifier: required("SMARTLING_USER_IDENTIFIER")?,
            user_secret: required("SMARTLING_USER_SECRET")?,
            base_url: optional("SMARTLING_BASE_URL"),
            auth_url: optional("SMARTLING_AUTH_URL"),
            timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ApiError::LocalIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ApiError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(ApiError::Config("project id is required".to_string()));
        }
        if self.user_identifier.is_empty() || self.user_secret.is_empty() {
            return Err(ApiError::Config("user identifier and secret are required".to_string()));
        }
        if self.timeout_ms == Some(0) {
            return Err(ApiError::Config("timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}
