use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HeraldError, Result};

/// Top-level configuration for the Herald dispatcher.
///
/// Loaded from `~/.herald/config.toml` by default. Each section corresponds
/// to one concern of the dispatch engine or its collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    /// Project whitelist, keyed by project name.
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectEntry>,
}

impl HeraldConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HeraldConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HeraldError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Confirmation policy and pending-entry lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Age after which a pending confirmation is treated as expired.
    pub expiry_secs: u64,
    /// Interval between background sweeps of the pending store.
    pub sweep_interval_secs: u64,
    /// Classifier confidence at or above which non-critical actions skip confirmation.
    pub bypass_confidence: f64,
    /// Actions that always require confirmation, regardless of confidence.
    ///
    /// Must include `deploy`. Of the built-ins, only create-page,
    /// create-feature, create-task and code-task are configurable here;
    /// process-receipt and check-status are rejected at startup.
    pub critical_actions: Vec<String>,
    /// Actions that require confirmation below `bypass_confidence`.
    ///
    /// Same restrictions on built-ins as `critical_actions`.
    pub gated_actions: Vec<String>,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            expiry_secs: 600,
            sweep_interval_secs: 300,
            bypass_confidence: 0.9,
            critical_actions: vec!["deploy".to_string()],
            gated_actions: vec![
                "deploy".to_string(),
                "create-page".to_string(),
                "create-feature".to_string(),
                "create-task".to_string(),
                "code-task".to_string(),
            ],
        }
    }
}

/// Deployment defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub default_environment: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            default_environment: "production".to_string(),
        }
    }
}

/// Project status report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Task-tracking document fetched for a project.
    pub document_path: String,
    /// Maximum number of incomplete items listed in a report.
    pub max_items: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            document_path: "TODO.md".to_string(),
            max_items: 5,
        }
    }
}

/// Location of project documents for the file-backed fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub root: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            root: "~/.herald/projects".to_string(),
        }
    }
}

/// One entry of the project whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Local path the project is deployed from.
    pub path: String,
    /// Repository slug, e.g. `org/site`.
    #[serde(default)]
    pub repo: Option<String>,
}
