//! Preview configuration: main domain, template descriptors and timing.
//! Loaded from YAML; the three storefront templates ship embedded in the binary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Embedded copy of `config/templates.yaml`.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../config/templates.yaml");

/// Environment variable overriding the HTTP origin used by the `preview` binary.
pub const ORIGIN_ENV: &str = "DIBUNGO_ORIGIN";

pub const DEFAULT_MAIN_DOMAIN: &str = "dibungo.netlify.app";
pub const DEFAULT_TEMPLATES_BASE_PATH: &str = "/templates/";
pub const DEFAULT_CACHE_DURATION_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_LOADING_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PAGE: &str = "index.html";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One template entry as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub id: String,
    pub display_name: String,
    /// Asset folder under `templates_base_path`. Defaults to the id.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub css_files: Vec<String>,
    #[serde(default)]
    pub js_files: Vec<String>,
    #[serde(default = "default_page")]
    pub default_page: String,
}

impl TemplateConfig {
    pub fn folder(&self) -> &str {
        self.folder.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default = "default_main_domain")]
    pub main_domain: String,
    /// Hosts treated like the main domain (local development).
    #[serde(default = "default_dev_hosts")]
    pub dev_hosts: Vec<String>,
    #[serde(default = "default_templates_base_path")]
    pub templates_base_path: String,
    #[serde(default = "default_cache_duration_ms")]
    pub cache_duration_ms: u64,
    #[serde(default = "default_loading_timeout_ms")]
    pub loading_timeout_ms: u64,
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

fn default_main_domain() -> String {
    DEFAULT_MAIN_DOMAIN.to_string()
}

fn default_dev_hosts() -> Vec<String> {
    vec!["localhost".to_string()]
}

fn default_templates_base_path() -> String {
    DEFAULT_TEMPLATES_BASE_PATH.to_string()
}

fn default_cache_duration_ms() -> u64 {
    DEFAULT_CACHE_DURATION_MS
}

fn default_loading_timeout_ms() -> u64 {
    DEFAULT_LOADING_TIMEOUT_MS
}

fn default_debug() -> bool {
    true
}

fn default_page() -> String {
    DEFAULT_PAGE.to_string()
}

impl PreviewConfig {
    /// The embedded configuration with the three storefront templates.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_yaml(DEFAULT_CONFIG_YAML)
    }

    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let mut config: PreviewConfig = serde_yaml::from_str(yaml)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.cache_duration_ms)
    }

    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }

    /// Base path always starts and ends with `/`.
    fn normalize(&mut self) {
        let trimmed = self.templates_base_path.trim_matches('/');
        self.templates_base_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self.main_domain = self.main_domain.trim().to_ascii_lowercase();
        for host in &mut self.dev_hosts {
            *host = host.trim().to_ascii_lowercase();
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.main_domain.is_empty() {
            return Err(ConfigError::Invalid("main_domain is empty".to_string()));
        }
        if self.loading_timeout_ms == 0 {
            return Err(ConfigError::Invalid("loading_timeout_ms must be positive".to_string()));
        }
        let mut seen = HashSet::new();
        for t in &self.templates {
            if t.id.trim().is_empty() {
                return Err(ConfigError::Invalid("template with empty id".to_string()));
            }
            if t.id.contains('.') || t.id.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "template id '{}' is not a DNS label",
                    t.id
                )));
            }
            if !seen.insert(t.id.to_ascii_lowercase()) {
                return Err(ConfigError::Invalid(format!("duplicate template id '{}'", t.id)));
            }
            if t.folder().trim().is_empty() {
                return Err(ConfigError::Invalid(format!("template '{}' has no folder", t.id)));
            }
            if !t.default_page.ends_with(".html") {
                return Err(ConfigError::Invalid(format!(
                    "template '{}' default_page must be an .html file",
                    t.id
                )));
            }
        }
        Ok(())
    }
}
