use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::table::FillMethod;

/// Defaults used by the events accessor, loadable from TOML.
///
/// ```toml
/// [gaps]
/// event_type_column = "event_type"
/// event_type_value = "default"
///
/// [index]
/// name = "event_index"
///
/// [grouping]
/// default_fill = "ffill"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub gaps: GapConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapConfig {
    /// Column that labels synthetic gap events.
    #[serde(default = "default_event_type_column")]
    pub event_type_column: String,
    #[serde(default = "default_event_type_value")]
    pub event_type_value: String,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            event_type_column: default_event_type_column(),
            event_type_value: default_event_type_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name under which an unnamed row index is addressed.
    #[serde(default = "default_index_name")]
    pub name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_fill")]
    pub default_fill: FillMethod,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            default_fill: default_fill(),
        }
    }
}

impl EventsConfig {
    /// # Errors
    ///
    /// Fails if `content` is not valid TOML for this structure.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).context("Failed to parse events config")
    }
}

/// Load the configuration at `path`, or the defaults if there is no file.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<EventsConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no events config, using defaults");
        return Ok(EventsConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EventsConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn default_event_type_column() -> String {
    "event_type".to_string()
}

fn default_event_type_value() -> String {
    "default".to_string()
}

fn default_index_name() -> String {
    "event_index".to_string()
}

const fn default_fill() -> FillMethod {
    FillMethod::Pad
}
