//! Format-agnostic intermediate tree of raw instance data.
//!
//! Each input document becomes one [`DomDocument`]: an arena of [`DomNode`]s
//! whose index 0 is the document root named `/`. Nodes built from XML know
//! their namespace, nodes built from JSON know their module;
//! [`DomDocument::resolve_module_or_namespace`] fills in the other half from
//! the schema.

mod json;
pub mod prefix;
mod xml;

use std::sync::Arc;

use serde_json::Number;
use yang_data_core::{DataSchema, DocumentId, DomNodeId, Finding};

use crate::error::{DataError, Result};

pub use prefix::{PrefixResolver, XSI_NAMESPACE, split_qname};

/// Name, namespace and module of every document root.
pub const ROOT_NAME: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDataType {
    Xml,
    Json,
}

/// Value of a DOM node.
#[derive(Debug, Clone, PartialEq)]
pub enum DomValue {
    /// The node has child elements, or is the document root.
    Absent,
    /// `xsi:nil="true"` in XML, `null` or `[null]` in JSON.
    Null,
    String(String),
    /// JSON only.
    Number(Number),
    /// JSON only.
    Boolean(bool),
}

impl DomValue {
    /// String form used for leaf values and list keys.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Absent | Self::Null => None,
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// An RFC 7952 metadata annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationValue {
    pub namespace: Option<String>,
    pub module_name: Option<String>,
    pub name: String,
    pub value: DomValue,
}

#[derive(Debug, Clone)]
pub struct DomNode {
    name: String,
    namespace: Option<String>,
    module_name: Option<String>,
    value: DomValue,
    line: usize,
    column: usize,
    parent: Option<DomNodeId>,
    children: Vec<DomNodeId>,
    annotations: Vec<AnnotationValue>,
    /// Shared with the parent unless this element declares namespaces.
    prefixes: Option<Arc<PrefixResolver>>,
}

impl DomNode {
    pub(crate) fn new(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            module_name: None,
            value: DomValue::Absent,
            line,
            column,
            parent: None,
            children: Vec::new(),
            annotations: Vec::new(),
            prefixes: None,
        }
    }

    fn root() -> Self {
        Self {
            namespace: Some(ROOT_NAME.to_string()),
            module_name: Some(ROOT_NAME.to_string()),
            ..Self::new(ROOT_NAME, 0, 0)
        }
    }

    pub(crate) fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub(crate) fn with_module(mut self, module_name: Option<String>) -> Self {
        self.module_name = module_name;
        self
    }

    pub(crate) fn with_value(mut self, value: DomValue) -> Self {
        self.value = value;
        self
    }

    pub(crate) fn with_annotations(mut self, annotations: Vec<AnnotationValue>) -> Self {
        self.annotations = annotations;
        self
    }

    pub(crate) fn with_prefixes(mut self, prefixes: Arc<PrefixResolver>) -> Self {
        self.prefixes = Some(prefixes);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    pub fn value(&self) -> &DomValue {
        &self.value
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn parent(&self) -> Option<DomNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[DomNodeId] {
        &self.children
    }

    pub fn annotations(&self) -> &[AnnotationValue] {
        &self.annotations
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationValue> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Prefix table in scope at this element, for XML input.
    pub fn prefix_resolver(&self) -> Option<&Arc<PrefixResolver>> {
        self.prefixes.as_ref()
    }
}

/// The DOM of one input document.
#[derive(Debug, Clone)]
pub struct DomDocument {
    id: DocumentId,
    input_name: String,
    source: SourceDataType,
    nodes: Vec<DomNode>,
}

impl DomDocument {
    pub fn new(id: DocumentId, input_name: impl Into<String>, source: SourceDataType) -> Self {
        Self {
            id,
            input_name: input_name.into(),
            source,
            nodes: vec![DomNode::root()],
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn source(&self) -> SourceDataType {
        self.source
    }

    pub fn root(&self) -> &DomNode {
        &self.nodes[DomNodeId::ROOT.0]
    }

    pub fn node(&self, id: DomNodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Data nodes directly below the document root.
    pub fn top_level_nodes(&self) -> &[DomNodeId] {
        &self.root().children
    }

    pub(crate) fn push_child(&mut self, parent: DomNodeId, mut node: DomNode) -> DomNodeId {
        let id = DomNodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: DomNodeId) -> &mut DomNode {
        &mut self.nodes[id.0]
    }

    /// Slash-separated path of local names, `/` for the root.
    pub fn path(&self, id: DomNodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == DomNodeId::ROOT {
                break;
            }
            let Some(node) = self.node(node_id) else {
                break;
            };
            names.push(node.name.as_str());
            current = node.parent;
        }
        if names.is_empty() {
            return ROOT_NAME.to_string();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// First child with this name whose namespace or module matches.
    pub fn child(
        &self,
        parent: DomNodeId,
        namespace: Option<&str>,
        module_name: Option<&str>,
        name: &str,
    ) -> Option<DomNodeId> {
        self.children_of(parent).find(|&id| {
            let node = &self.nodes[id.0];
            node.name == name
                && ((namespace.is_some() && node.namespace() == namespace)
                    || (module_name.is_some() && node.module_name() == module_name))
        })
    }

    /// First child with this name, ignoring namespaces.
    pub fn child_named(&self, parent: DomNodeId, name: &str) -> Option<DomNodeId> {
        self.children_of(parent)
            .find(|&id| self.nodes[id.0].name == name)
    }

    pub fn children_of(&self, parent: DomNodeId) -> impl Iterator<Item = DomNodeId> + '_ {
        self.node(parent)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    /// Fills in the namespace of JSON nodes and the module of XML nodes,
    /// annotations included.
    pub fn resolve_module_or_namespace<S: DataSchema>(&mut self, schema: &S) {
        for node in self.nodes.iter_mut().skip(1) {
            resolve_pair(schema, &mut node.namespace, &mut node.module_name);
            for annotation in &mut node.annotations {
                resolve_pair(schema, &mut annotation.namespace, &mut annotation.module_name);
            }
        }
    }

    /// Serialized content of an anydata or anyxml node.
    ///
    /// Reassembly of arbitrary content is not supported; this always returns
    /// an empty string.
    pub fn reassembled_children(&self, _id: DomNodeId) -> String {
        String::new()
    }

    /// A finding on `node`, positioned at it.
    pub fn finding_on(
        &self,
        node: DomNodeId,
        finding_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Finding {
        let (line, column) = self.node(node).map(|n| (n.line, n.column)).unwrap_or((0, 0));
        Finding::on_data_node(finding_type, message, self.id, self.input_name.clone(), node)
            .at(line, column)
    }

    pub fn finding_on_document(
        &self,
        finding_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Finding {
        Finding::on_document(finding_type, message, self.id, self.input_name.clone())
    }
}

fn resolve_pair<S: DataSchema>(
    schema: &S,
    namespace: &mut Option<String>,
    module: &mut Option<String>,
) {
    if namespace.is_none() {
        if let Some(m) = module.as_deref() {
            *namespace = schema.namespace_for_module(m).map(str::to_string);
        }
    } else if module.is_none() {
        if let Some(ns) = namespace.as_deref() {
            *module = schema.module_for_namespace(ns).map(str::to_string);
        }
    }
}

/// The documents of a session, addressable by [`DocumentId`].
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: Vec<DomDocument>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted document must carry.
    pub fn next_id(&self) -> DocumentId {
        DocumentId(self.documents.len() as u32)
    }

    /// Adds a document built elsewhere. Its id must be [`DocumentSet::next_id`].
    pub fn insert(&mut self, document: DomDocument) -> Result<DocumentId> {
        let expected = self.next_id();
        if document.id != expected {
            return Err(DataError::UnexpectedDocumentId {
                expected,
                found: document.id,
            });
        }
        Ok(self.push(document))
    }

    /// Adds a document numbered with [`DocumentSet::next_id`] by the caller.
    pub(crate) fn push(&mut self, document: DomDocument) -> DocumentId {
        debug_assert_eq!(document.id, self.next_id());
        let id = document.id;
        self.documents.push(document);
        id
    }

    pub fn get(&self, id: DocumentId) -> Option<&DomDocument> {
        self.documents.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomDocument> {
        self.documents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DomDocument> {
        self.documents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
