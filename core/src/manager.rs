//! Session-scoped collector of findings.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use tracing::trace;

use crate::filter::{FindingFilter, PredicateFilter};
use crate::finding::{DocumentId, DomNodeId, Finding, FindingTarget};
use crate::severity::{FindingSeverity, SeverityCalculator};

/// Collects the findings of one parse session.
///
/// A finding is dropped when suppressed (see [`FindingsManager::is_suppressed`]);
/// otherwise it is stored once and attached to every [`FindingTarget`] it
/// references, so per-document and per-node queries do not scan the whole set.
/// Removing a finding detaches it from all of its targets.
///
/// # Examples
///
/// ```
/// use yang_data_core::{DocumentId, Finding, FindingsManager, ParserFindingType};
///
/// let mut findings = FindingsManager::new();
/// findings.severities_mut().suppress(ParserFindingType::P079EmptyDataFile);
///
/// let empty = Finding::on_document(
///     ParserFindingType::P079EmptyDataFile,
///     "The instance data input seems to be empty.",
///     DocumentId(0),
///     "empty.xml",
/// );
/// assert!(!findings.add_finding(empty));
/// assert!(findings.is_empty());
///
/// findings.add_finding(Finding::new(ParserFindingType::P000UnspecifiedError, "boom"));
/// assert!(findings.has_finding_of_type(ParserFindingType::P000UnspecifiedError));
/// ```
#[derive(Default)]
pub struct FindingsManager {
    findings: IndexSet<Finding>,
    attached: HashMap<FindingTarget, IndexSet<Finding>>,
    severities: SeverityCalculator,
    suppress_all: bool,
    filters: Vec<Box<dyn FindingFilter>>,
    non_suppressable: HashSet<String>,
}

impl std::fmt::Debug for FindingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindingsManager")
            .field("findings", &self.findings.len())
            .field("suppress_all", &self.suppress_all)
            .field("filters", &self.filters.len())
            .field("non_suppressable", &self.non_suppressable)
            .finish_non_exhaustive()
    }
}

impl FindingsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severities(severities: SeverityCalculator) -> Self {
        Self {
            severities,
            ..Self::default()
        }
    }

    pub fn severities(&self) -> &SeverityCalculator {
        &self.severities
    }

    pub fn severities_mut(&mut self) -> &mut SeverityCalculator {
        &mut self.severities
    }

    pub fn set_suppress_all(&mut self, suppress_all: bool) {
        self.suppress_all = suppress_all;
    }

    /// Findings of this type are recorded even when a filter matches them.
    pub fn add_non_suppressable_finding_type(&mut self, finding_type: impl Into<String>) {
        self.non_suppressable.insert(finding_type.into());
    }

    pub fn add_filter(&mut self, filter: impl FindingFilter + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Registers a closure returning `true` for findings to drop.
    pub fn add_filter_fn<F>(&mut self, predicate: F)
    where
        F: Fn(&Finding) -> bool + Send + Sync + 'static,
    {
        self.add_filter(PredicateFilter(predicate));
    }

    /// Whether every finding of `finding_type` will be dropped regardless of
    /// what it refers to.
    pub fn is_finding_type_globally_suppressed(&self, finding_type: &str) -> bool {
        if self.non_suppressable.contains(finding_type) {
            return false;
        }
        self.suppress_all || self.severities.calculate(finding_type) == FindingSeverity::Suppress
    }

    /// Whether `finding` would be dropped by [`FindingsManager::add_finding`].
    pub fn is_suppressed(&self, finding: &Finding) -> bool {
        if self.non_suppressable.contains(&finding.finding_type) {
            return false;
        }
        self.is_finding_type_globally_suppressed(&finding.finding_type)
            || self
                .filters
                .iter()
                .any(|filter| filter.matches(finding, &self.severities))
    }

    /// Records `finding` unless it is suppressed. Returns whether it was stored.
    pub fn add_finding(&mut self, finding: Finding) -> bool {
        if self.is_suppressed(&finding) {
            trace!(finding_type = %finding.finding_type, "Suppressed finding");
            return false;
        }
        if self.findings.contains(&finding) {
            return false;
        }

        for target in finding.targets() {
            self.attached
                .entry(target)
                .or_default()
                .insert(finding.clone());
        }
        self.findings.insert(finding);
        true
    }

    /// Records each finding in turn, for example when folding in the findings
    /// of a worker that used its own collector.
    pub fn add_findings(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.add_finding(finding);
        }
    }

    /// All stored findings in the order they were recorded.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings_for<'a>(
        &'a self,
        target: &FindingTarget,
    ) -> impl Iterator<Item = &'a Finding> + use<'a> {
        self.attached.get(target).into_iter().flatten()
    }

    /// Findings on the document itself and on any of its data nodes.
    pub fn findings_for_document(&self, document: DocumentId) -> impl Iterator<Item = &Finding> {
        self.findings_for(&FindingTarget::Document(document))
    }

    pub fn findings_for_data_node(
        &self,
        document: DocumentId,
        node: DomNodeId,
    ) -> impl Iterator<Item = &Finding> {
        self.findings_for(&FindingTarget::DataNode(document, node))
    }

    /// Stored findings that the currently registered filters would let through.
    ///
    /// Useful after adding filters to a collector that already holds findings.
    pub fn filtered_findings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|finding| !self.is_suppressed(finding))
            .collect()
    }

    pub fn has_finding_of_type(&self, finding_type: impl AsRef<str>) -> bool {
        let finding_type = finding_type.as_ref();
        self.findings.iter().any(|f| f.finding_type == finding_type)
    }

    pub fn has_finding_of_any_of<T: AsRef<str>>(&self, finding_types: &[T]) -> bool {
        finding_types.iter().any(|t| self.has_finding_of_type(t))
    }

    /// Whether any stored finding's type resolves to `severity`.
    pub fn has_findings_with_severity(&self, severity: FindingSeverity) -> bool {
        self.findings
            .iter()
            .any(|f| self.severities.calculate(&f.finding_type) == severity)
    }

    /// Removes a single finding and detaches it everywhere.
    pub fn remove_finding(&mut self, finding: &Finding) -> bool {
        if !self.findings.shift_remove(finding) {
            return false;
        }
        for target in finding.targets() {
            if let Some(set) = self.attached.get_mut(&target) {
                set.shift_remove(finding);
                if set.is_empty() {
                    self.attached.remove(&target);
                }
            }
        }
        true
    }

    /// Keeps only findings whose type is listed.
    pub fn retain_findings_of_type<T: AsRef<str>>(&mut self, finding_types: &[T]) {
        let keep: HashSet<&str> = finding_types.iter().map(|t| t.as_ref()).collect();
        let doomed: Vec<Finding> = self
            .findings
            .iter()
            .filter(|f| !keep.contains(f.finding_type.as_str()))
            .cloned()
            .collect();
        for finding in &doomed {
            self.remove_finding(finding);
        }
    }

    /// Removes every finding attached to `target`.
    pub fn remove_findings_on(&mut self, target: &FindingTarget) {
        let doomed: Vec<Finding> = self.findings_for(target).cloned().collect();
        for finding in &doomed {
            self.remove_finding(finding);
        }
    }

    pub fn remove_findings_on_data_node(&mut self, document: DocumentId, node: DomNodeId) {
        self.remove_findings_on(&FindingTarget::DataNode(document, node));
    }

    /// Drops all findings. Filters and severities stay in place.
    pub fn clear(&mut self) {
        self.findings.clear();
        self.attached.clear();
    }
}
