//! Filter predicates that suppress findings before they are recorded.
//!
//! Two string-configurable filters are provided, plus [`PredicateFilter`] for
//! arbitrary closures:
//!
//! - [`ModuleTypePathFilter`]: `"modules;types;schema-path"`
//! - [`ModuleSeverityFilter`]: `"modules;severities"`
//!
//! Each section is either `*` (match anything) or a comma-separated list of
//! glob patterns in which `*` matches any run of characters.

use std::collections::HashSet;
use std::str::FromStr;

use regex::Regex;

use crate::error::CoreError;
use crate::finding::Finding;
use crate::severity::{FindingSeverity, SeverityCalculator};

/// Decides whether a finding should be suppressed.
pub trait FindingFilter: Send + Sync {
    /// Returns `true` when `finding` must be dropped.
    fn matches(&self, finding: &Finding, severities: &SeverityCalculator) -> bool;
}

/// Adapts a closure into a [`FindingFilter`].
pub struct PredicateFilter<F>(pub F);

impl<F> FindingFilter for PredicateFilter<F>
where
    F: Fn(&Finding) -> bool + Send + Sync,
{
    fn matches(&self, finding: &Finding, _severities: &SeverityCalculator) -> bool {
        (self.0)(finding)
    }
}

/// Compiles a glob pattern where `*` matches any run of characters and every
/// other character, `.` included, is literal.
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex, CoreError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|_| CoreError::InvalidFilter(pattern.to_string()))
}

fn parse_pattern_list(section: &str) -> Result<Option<Vec<Regex>>, CoreError> {
    let section = section.trim();
    if section == "*" {
        return Ok(None);
    }
    let patterns = section
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(glob_to_regex)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(patterns))
}

fn any_matches(patterns: &[Regex], value: &str) -> bool {
    patterns.iter().any(|p| p.is_match(value))
}

fn module_matches(modules: &Option<Vec<Regex>>, finding: &Finding) -> bool {
    match modules {
        None => true,
        Some(patterns) => finding
            .module_name()
            .is_some_and(|module| any_matches(patterns, module)),
    }
}

/// Suppresses findings by module name, finding type and schema-path prefix.
///
/// # Examples
///
/// ```
/// use yang_data_core::{Finding, FindingFilter, ModuleTypePathFilter, SeverityCalculator};
///
/// let filter: ModuleTypePathFilter = "*;P07*;*".parse().unwrap();
/// let severities = SeverityCalculator::new();
///
/// let missing = Finding::new("P075_CORRESPONDING_SCHEMA_NODE_NOT_FOUND", "x");
/// assert!(filter.matches(&missing, &severities));
/// assert!(!filter.matches(&Finding::new("P015_INVALID_SYNTAX_IN_DOCUMENT", "x"), &severities));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleTypePathFilter {
    modules: Option<Vec<Regex>>,
    finding_types: Option<Vec<Regex>>,
    path_prefix: Option<String>,
}

impl FromStr for ModuleTypePathFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(';').collect();
        let [modules, types, path] = parts.as_slice() else {
            return Err(CoreError::InvalidFilter(s.to_string()));
        };

        let path = path.trim();
        Ok(Self {
            modules: parse_pattern_list(modules)?,
            finding_types: parse_pattern_list(types)?,
            path_prefix: (path != "*" && !path.is_empty()).then(|| path.to_string()),
        })
    }
}

impl FindingFilter for ModuleTypePathFilter {
    fn matches(&self, finding: &Finding, _severities: &SeverityCalculator) -> bool {
        if !module_matches(&self.modules, finding) {
            return false;
        }
        let type_matches = self
            .finding_types
            .as_ref()
            .is_none_or(|types| any_matches(types, &finding.finding_type));
        if !type_matches {
            return false;
        }
        match &self.path_prefix {
            None => true,
            Some(prefix) => finding
                .schema_path()
                .is_some_and(|path| path.starts_with(prefix.as_str())),
        }
    }
}

/// Suppresses findings by module name and the severity their type resolves to.
#[derive(Debug, Clone)]
pub struct ModuleSeverityFilter {
    modules: Option<Vec<Regex>>,
    severities: Option<HashSet<FindingSeverity>>,
}

impl FromStr for ModuleSeverityFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(';').collect();
        let [modules, severities] = parts.as_slice() else {
            return Err(CoreError::InvalidFilter(s.to_string()));
        };

        let severities = severities.trim();
        let severities = if severities == "*" {
            None
        } else {
            Some(
                severities
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(FindingSeverity::from_str)
                    .collect::<Result<HashSet<_>, _>>()?,
            )
        };

        Ok(Self {
            modules: parse_pattern_list(modules)?,
            severities,
        })
    }
}

impl FindingFilter for ModuleSeverityFilter {
    fn matches(&self, finding: &Finding, severities: &SeverityCalculator) -> bool {
        if !module_matches(&self.modules, finding) {
            return false;
        }
        match &self.severities {
            None => true,
            Some(wanted) => wanted.contains(&severities.calculate(&finding.finding_type)),
        }
    }
}
