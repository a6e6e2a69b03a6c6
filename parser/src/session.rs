//! One parse run: input documents in, one merged instance tree out.

use tracing::{debug, warn};
use yang_data_core::{
    DataConfig, DataSchema, DocumentId, Finding, FindingsManager, ParserFindingType,
};

use crate::dom::{DocumentSet, DomDocument, SourceDataType};
use crate::error::Result;
use crate::input::{JsonValue, XmlElement};
use crate::instance::builder::{TopLevelFilter, translate_document};
use crate::instance::merge::merge_trees;
use crate::instance::{InstanceArena, InstanceId, InstanceSnapshot};

/// Holds the findings collector, the DOM documents and the instance arena of
/// one parse run.
///
/// Documents are merged in the order they were added; on leaf conflicts the
/// earliest document wins.
#[derive(Debug, Default)]
pub struct DataSession {
    findings: FindingsManager,
    documents: DocumentSet,
    arena: InstanceArena,
    filter: TopLevelFilter,
    combined: Option<InstanceId>,
}

impl DataSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_findings(findings: FindingsManager) -> Self {
        Self {
            findings,
            ..Self::default()
        }
    }

    /// Creates a session graded and filtered according to `config`.
    pub fn from_config(config: &DataConfig) -> Result<Self> {
        let mut session = Self::with_findings(config.findings.build_manager()?);
        session.set_top_level_namespaces(config.data.top_level_namespaces.iter().cloned());
        Ok(session)
    }

    /// Only top-level data nodes in these namespaces are translated. An empty
    /// set translates everything.
    pub fn set_top_level_namespaces<I, S>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = TopLevelFilter::new(namespaces);
    }

    pub fn add_xml_document(
        &mut self,
        input_name: impl Into<String>,
        root: &XmlElement,
    ) -> DocumentId {
        let id = self.documents.next_id();
        let document = DomDocument::from_xml(id, input_name, root, &mut self.findings);
        self.documents.push(document)
    }

    pub fn add_json_document(
        &mut self,
        input_name: impl Into<String>,
        root: &JsonValue,
    ) -> DocumentId {
        let id = self.documents.next_id();
        let document = DomDocument::from_json(id, input_name, root, &mut self.findings);
        self.documents.push(document)
    }

    /// Parses XML text and adds it as a document.
    ///
    /// Text that is not well-formed yields an empty document and a
    /// `P000_UNSPECIFIED_ERROR` finding on it.
    pub fn add_xml_text(&mut self, input_name: impl Into<String>, text: &str) -> DocumentId {
        let input_name = input_name.into();
        match XmlElement::parse(text) {
            Ok(root) => self.add_xml_document(input_name, &root),
            Err(err) => self.add_unreadable(input_name, SourceDataType::Xml, err.to_string()),
        }
    }

    /// Parses JSON text and adds it as a document.
    ///
    /// Text that is not well-formed yields an empty document and a
    /// `P000_UNSPECIFIED_ERROR` finding on it.
    pub fn add_json_text(&mut self, input_name: impl Into<String>, text: &str) -> DocumentId {
        let input_name = input_name.into();
        match JsonValue::parse(text) {
            Ok(root) => self.add_json_document(input_name, &root),
            Err(err) => self.add_unreadable(input_name, SourceDataType::Json, err.to_string()),
        }
    }

    fn add_unreadable(
        &mut self,
        input_name: String,
        source: SourceDataType,
        error: String,
    ) -> DocumentId {
        debug!(input = %input_name, %error, "Input could not be tokenized");
        let document = DomDocument::new(self.documents.next_id(), input_name, source);
        self.findings.add_finding(
            document.finding_on_document(ParserFindingType::P000UnspecifiedError, error),
        );
        self.documents.push(document)
    }

    /// Id the next document added to this session must carry.
    ///
    /// Callers that build documents elsewhere, each with its own findings
    /// collector, number them from here, then hand them over with
    /// [`DataSession::insert_document`] and fold their findings in with
    /// [`FindingsManager::add_findings`].
    pub fn next_document_id(&self) -> DocumentId {
        self.documents.next_id()
    }

    /// Fails with [`DataError::UnexpectedDocumentId`] unless `document`
    /// carries [`DataSession::next_document_id`].
    ///
    /// [`DataError::UnexpectedDocumentId`]: crate::DataError::UnexpectedDocumentId
    pub fn insert_document(&mut self, document: DomDocument) -> Result<DocumentId> {
        self.documents.insert(document)
    }

    /// Translates every document against `schema` and merges the results into
    /// one tree, whose root is returned.
    ///
    /// Problems with the data are recorded as findings. Should an internal
    /// invariant break, it is recorded as a `P000_UNSPECIFIED_ERROR` finding
    /// and an empty tree is returned.
    ///
    /// The session owns one combined tree at a time: building again releases
    /// the previous tree, so ids into it stop resolving.
    pub fn build_combined_tree<S: DataSchema>(&mut self, schema: &S) -> InstanceId {
        if let Some(previous) = self.combined.take() {
            if let Err(err) = self.arena.release(previous) {
                debug!(error = %err, "Previous combined tree was already released");
            }
        }
        let root = match self.try_build_combined_tree(schema) {
            Ok(root) => root,
            Err(err) => {
                warn!(error = %err, "Building the combined instance tree failed");
                self.findings.add_finding(Finding::new(
                    ParserFindingType::P000UnspecifiedError,
                    err.to_string(),
                ));
                self.arena.new_root()
            }
        };
        self.combined = Some(root);
        root
    }

    /// Root of the most recently built combined tree.
    pub fn combined_root(&self) -> Option<InstanceId> {
        self.combined
    }

    fn try_build_combined_tree<S: DataSchema>(&mut self, schema: &S) -> Result<InstanceId> {
        for document in self.documents.iter_mut() {
            document.resolve_module_or_namespace(schema);
        }

        let mut roots = Vec::with_capacity(self.documents.len());
        for document in self.documents.iter() {
            roots.push(translate_document(
                schema,
                document,
                &mut self.arena,
                &mut self.findings,
                &self.filter,
            )?);
        }

        merge_trees(&mut self.arena, &roots, &self.documents, &mut self.findings)
    }

    pub fn findings(&self) -> &FindingsManager {
        &self.findings
    }

    pub fn findings_mut(&mut self) -> &mut FindingsManager {
        &mut self.findings
    }

    pub fn clear_findings(&mut self) {
        self.findings.clear();
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&DomDocument> {
        self.documents.get(id)
    }

    pub fn arena(&self) -> &InstanceArena {
        &self.arena
    }

    /// Owned, serializable copy of the tree below `root`.
    pub fn snapshot(&self, root: InstanceId) -> Result<InstanceSnapshot> {
        self.arena.snapshot(root)
    }
}
