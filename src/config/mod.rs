//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Connection settings for the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "http://localhost:5678")
    pub base_url: String,

    /// Bearer token sent with every request, if any
    #[serde(default)]
    pub jwt: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5678".to_string(),
            jwt: None,
        }
    }
}

/// Rules applied to bill attachments and form defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Accepted attachment extensions, compared case-insensitively
    pub accepted_extensions: Vec<String>,

    /// VAT percentage used when the form leaves it empty
    #[serde(default = "default_pct")]
    pub default_pct: f64,
}

fn default_pct() -> f64 {
    20.0
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            default_pct: default_pct(),
        }
    }
}

impl UploadConfig {
    /// Whether `file_name` carries one of the accepted extensions
    pub fn accepts(&self, file_name: &str) -> bool {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilledConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

impl BilledConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}
