//! Schema lookup used when translating instance data.
//!
//! The schema parser itself lives elsewhere; instance translation only needs
//! the data-node view exposed by [`DataSchema`] and [`SchemaNode`].

use serde::{Deserialize, Serialize};

/// Kind of a schema data node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaNodeKind {
    Container,
    List,
    Leaf,
    LeafList,
    #[serde(rename = "anydata")]
    AnyData,
    #[serde(rename = "anyxml")]
    AnyXml,
    /// Transparent: its cases' children are candidates in the parent's scope.
    Choice,
    /// Transparent, like [`SchemaNodeKind::Choice`].
    Case,
}

impl SchemaNodeKind {
    pub fn is_transparent(self) -> bool {
        matches!(self, Self::Choice | Self::Case)
    }
}

/// A data node declared by the schema.
pub trait SchemaNode {
    fn name(&self) -> &str;

    fn kind(&self) -> SchemaNodeKind;

    /// Namespace of the module that effectively owns this node, taking
    /// augmentation and grouping usage into account.
    fn effective_namespace(&self) -> &str;

    fn module_name(&self) -> &str;

    /// Ordered key leaf names. Empty for anything but lists.
    fn key_names(&self) -> &[String];

    /// Effective `config` statement, inherited from ancestors.
    fn is_effective_config(&self) -> bool;

    /// Whether the type of this leaf or leaf-list is, or is a union including,
    /// the built-in type `empty`.
    fn accepts_empty(&self) -> bool;

    /// Schema children in declaration order, choices and cases included.
    fn child_nodes(&self) -> Vec<&Self>;
}

/// The schema a set of instance documents is validated against.
pub trait DataSchema {
    type Node: SchemaNode;

    /// Top-level data nodes of all modules, choices and cases included.
    fn top_level_nodes(&self) -> Vec<&Self::Node>;

    fn namespace_for_module(&self, module: &str) -> Option<&str>;

    fn module_for_namespace(&self, namespace: &str) -> Option<&str>;
}

/// Expands choices and cases so that only matchable data nodes remain.
pub fn flatten_candidates<'a, N: SchemaNode>(nodes: Vec<&'a N>) -> Vec<&'a N> {
    let mut flat = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.kind().is_transparent() {
            flat.extend(flatten_candidates(node.child_nodes()));
        } else {
            flat.push(node);
        }
    }
    flat
}

/// Finds the candidate with the given name and namespace.
///
/// A data node without a namespace never matches.
pub fn find_schema_node<'a, N: SchemaNode>(
    candidates: &[&'a N],
    namespace: Option<&str>,
    name: &str,
) -> Option<&'a N> {
    let namespace = namespace?;
    candidates
        .iter()
        .copied()
        .find(|n| n.name() == name && n.effective_namespace() == namespace)
}

/// Finds a candidate by name only, ignoring namespaces.
pub fn find_schema_node_by_name<'a, N: SchemaNode>(
    candidates: &[&'a N],
    name: &str,
) -> Option<&'a N> {
    candidates.iter().copied().find(|n| n.name() == name)
}
