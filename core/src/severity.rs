//! Severity levels and the per-session severity calculator.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How serious a finding type is considered by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    #[default]
    Error,
    Warning,
    Info,
    /// Findings of this severity are never recorded.
    Suppress,
}

impl std::fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
            Self::Suppress => write!(f, "suppress"),
        }
    }
}

impl FromStr for FindingSeverity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "suppress" => Ok(Self::Suppress),
            _ => Err(CoreError::InvalidSeverity(s.to_string())),
        }
    }
}

/// Maps finding type codes to severities. Unconfigured types are errors.
///
/// # Examples
///
/// ```
/// use yang_data_core::{FindingSeverity, SeverityCalculator};
///
/// let mut severities = SeverityCalculator::new();
/// severities.warning_for("P073_LEAF_VALUE_ALREADY_SET");
///
/// assert_eq!(severities.calculate("P073_LEAF_VALUE_ALREADY_SET"), FindingSeverity::Warning);
/// assert_eq!(severities.calculate("P080_NULL_VALUE"), FindingSeverity::Error);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeverityCalculator {
    severities: HashMap<String, FindingSeverity>,
}

impl SeverityCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_severity(&mut self, finding_type: impl Into<String>, severity: FindingSeverity) {
        self.severities.insert(finding_type.into(), severity);
    }

    pub fn error_for(&mut self, finding_type: impl Into<String>) {
        self.set_severity(finding_type, FindingSeverity::Error);
    }

    pub fn warning_for(&mut self, finding_type: impl Into<String>) {
        self.set_severity(finding_type, FindingSeverity::Warning);
    }

    pub fn info_for(&mut self, finding_type: impl Into<String>) {
        self.set_severity(finding_type, FindingSeverity::Info);
    }

    pub fn suppress(&mut self, finding_type: impl Into<String>) {
        self.set_severity(finding_type, FindingSeverity::Suppress);
    }

    pub fn calculate(&self, finding_type: &str) -> FindingSeverity {
        self.severities
            .get(finding_type)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WARNING".parse::<FindingSeverity>().unwrap(), FindingSeverity::Warning);
        assert_eq!(" Suppress ".parse::<FindingSeverity>().unwrap(), FindingSeverity::Suppress);
        assert!("fatal".parse::<FindingSeverity>().is_err());
    }

    #[test]
    fn test_later_setting_wins() {
        let mut calc = SeverityCalculator::new();
        calc.suppress("P079_EMPTY_DATA_FILE");
        calc.info_for("P079_EMPTY_DATA_FILE");
        assert_eq!(calc.calculate("P079_EMPTY_DATA_FILE"), FindingSeverity::Info);
    }

    #[test]
    fn test_serde_lowercase() {
        let yaml = serde_yaml::to_string(&FindingSeverity::Suppress).unwrap();
        assert_eq!(yaml.trim(), "suppress");
    }
}
