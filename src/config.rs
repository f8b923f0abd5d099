//! Workspace configuration: watched catalogs and report settings

use crate::error::{Result, ScoutError};
use crate::notes::{MoreInfoLink, NoteStyle};
use crate::report::ReportConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Catalog kinds scout knows how to fetch
pub const SUPPORTED_KINDS: &[&str] = &["socrata"];

/// Where baselines are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Archive,
    DuckDb,
}

impl StoreKind {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "archive" => Ok(Self::Archive),
            "duckdb" => Ok(Self::DuckDb),
            _ => Err(format!("Invalid store: {}. Use 'archive' or 'duckdb'", s)),
        }
    }
}

/// HTTP behaviour of the catalog fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub page_size: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            page_size: crate::DEFAULT_PAGE_SIZE,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

/// One watched catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Display name, also the label of the "more updates" link
    pub name: String,
    /// Catalog host, e.g. `data.cityofnewyork.us`
    pub domain: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Page linked when some updates are left out of a report
    pub link: String,
    /// Slack incoming webhook; reports go to stdout when unset
    #[serde(default)]
    pub slack_url: Option<String>,
}

fn default_kind() -> String {
    "socrata".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

impl TargetConfig {
    pub fn new(name: impl Into<String>, domain: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            kind: default_kind(),
            locale: default_locale(),
            link: link.into(),
            slack_url: None,
        }
    }

    /// Storage key of the target's baseline
    pub fn key(&self) -> &str {
        &self.domain
    }

    pub fn dataset_base_url(&self) -> String {
        format!("https://{}/resource", self.domain)
    }

    pub fn matches(&self, selector: &str) -> bool {
        self.name == selector || self.domain == selector
    }

    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(ScoutError::config(format!("target '{}' has no domain", self.name)));
        }
        if self.domain.contains('/') || self.domain.contains(char::is_whitespace) {
            return Err(ScoutError::config(format!(
                "target domain must be a bare host name: '{}'",
                self.domain
            )));
        }
        if !SUPPORTED_KINDS.contains(&self.kind.as_str()) {
            return Err(ScoutError::config(format!(
                "target '{}' has unsupported kind '{}'",
                self.name, self.kind
            )));
        }
        Ok(())
    }
}

/// Contents of `.scout/config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub style: NoteStyle,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

fn default_version() -> String {
    crate::FORMAT_VERSION.to_string()
}

fn default_max_visible() -> usize {
    crate::DEFAULT_MAX_VISIBLE
}

fn default_description_limit() -> usize {
    crate::DEFAULT_DESCRIPTION_LIMIT
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            created: Utc::now(),
            store: StoreKind::default(),
            max_visible: default_max_visible(),
            description_limit: default_description_limit(),
            request: RequestConfig::default(),
            style: NoteStyle::default(),
            targets: Vec::new(),
        }
    }
}

impl ScoutConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoutError::config(format!(
                "config file not found: {} (run `scout init`)",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ScoutError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_visible == 0 {
            return Err(ScoutError::config("max_visible must be greater than 0"));
        }
        if self.request.page_size == 0 {
            return Err(ScoutError::config("request.page_size must be greater than 0"));
        }
        if self.request.min_delay_ms > self.request.max_delay_ms {
            return Err(ScoutError::config("request.min_delay_ms exceeds request.max_delay_ms"));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            target.validate()?;
            // Two targets sharing a domain would share one baseline
            if !seen.insert(target.key()) {
                return Err(ScoutError::config(format!(
                    "domain '{}' is configured more than once",
                    target.domain
                )));
            }
        }
        Ok(())
    }

    pub fn add_target(&mut self, target: TargetConfig) -> Result<()> {
        target.validate()?;
        if self.targets.iter().any(|t| t.key() == target.key()) {
            return Err(ScoutError::config(format!(
                "domain '{}' is already configured",
                target.domain
            )));
        }
        self.targets.push(target);
        Ok(())
    }

    /// Targets matching `selector` by name or domain, or every target
    pub fn select_targets(&self, selector: Option<&str>) -> Result<Vec<TargetConfig>> {
        let selected: Vec<TargetConfig> = match selector {
            Some(sel) => self.targets.iter().filter(|t| t.matches(sel)).cloned().collect(),
            None => self.targets.clone(),
        };

        if selected.is_empty() {
            return Err(match selector {
                Some(sel) => ScoutError::invalid_input(format!("no target named '{}'", sel)),
                None => ScoutError::config("no targets configured (use `scout add-target`)"),
            });
        }
        Ok(selected)
    }

    pub fn report_config(&self, target: &TargetConfig) -> ReportConfig {
        ReportConfig {
            dataset_base_url: target.dataset_base_url(),
            more_info: MoreInfoLink::new(target.link.clone(), target.name.clone()),
            max_visible: self.max_visible,
            description_limit: self.description_limit,
            style: self.style.clone(),
        }
    }
}
