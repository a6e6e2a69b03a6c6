//! Session configuration for reading instance data.
//!
//! Controls how findings are graded and suppressed, and which top-level
//! namespaces are translated.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! findings:
//!   suppress_all: false
//!   severities:
//!     P073_LEAF_VALUE_ALREADY_SET: warning
//!     P079_EMPTY_DATA_FILE: suppress
//!   non_suppressable:
//!     - P000_UNSPECIFIED_ERROR
//!   filters:
//!     - "*;P075_*;*"
//!   severity_filters:
//!     - "*;info"
//! data:
//!   top_level_namespaces:
//!     - "urn:acme:system"
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::{ModuleSeverityFilter, ModuleTypePathFilter};
use crate::manager::FindingsManager;
use crate::severity::{FindingSeverity, SeverityCalculator};

/// How findings are graded and suppressed.
///
/// # Examples
///
/// ```
/// # use yang_data_core::{Finding, FindingsConfig, FindingSeverity};
/// let mut config = FindingsConfig::default();
/// config
///     .severities
///     .insert("P079_EMPTY_DATA_FILE".to_string(), FindingSeverity::Suppress);
///
/// let mut findings = config.build_manager().unwrap();
/// assert!(!findings.add_finding(Finding::new("P079_EMPTY_DATA_FILE", "empty")));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FindingsConfig {
    /// Drop every finding whose type is not listed in `non_suppressable`.
    pub suppress_all: bool,
    /// Severity per finding type code. Unlisted types are errors.
    pub severities: BTreeMap<String, FindingSeverity>,
    /// Finding types that no filter may suppress.
    pub non_suppressable: Vec<String>,
    /// `"modules;types;schema-path"` filters.
    pub filters: Vec<String>,
    /// `"modules;severities"` filters.
    pub severity_filters: Vec<String>,
}

impl FindingsConfig {
    /// Builds a findings collector honoring this configuration.
    ///
    /// Fails when a filter string is malformed.
    pub fn build_manager(&self) -> Result<FindingsManager> {
        let mut severities = SeverityCalculator::new();
        for (finding_type, severity) in &self.severities {
            severities.set_severity(finding_type.clone(), *severity);
        }

        let mut manager = FindingsManager::with_severities(severities);
        manager.set_suppress_all(self.suppress_all);
        for finding_type in &self.non_suppressable {
            manager.add_non_suppressable_finding_type(finding_type.clone());
        }
        for filter in &self.filters {
            manager.add_filter(filter.parse::<ModuleTypePathFilter>()?);
        }
        for filter in &self.severity_filters {
            manager.add_filter(filter.parse::<ModuleSeverityFilter>()?);
        }
        Ok(manager)
    }
}

/// Settings controlling which data is translated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFilterConfig {
    /// When non-empty, only top-level data nodes in these namespaces are
    /// translated into the instance tree.
    pub top_level_namespaces: Vec<String>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Configuration format version.
    pub version: String,
    #[serde(default)]
    pub findings: FindingsConfig,
    #[serde(default)]
    pub data: DataFilterConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            findings: FindingsConfig::default(),
            data: DataFilterConfig::default(),
        }
    }
}

impl DataConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CoreError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::CoreError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: DataConfig = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
