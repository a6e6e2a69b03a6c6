//! Schema-validated instance trees.
//!
//! All instance nodes of a session live in one [`InstanceArena`]. Structural
//! nodes (root, container, list) own their children by id in two ordered
//! buckets: structural children and content children. Merging moves subtrees
//! between parents with [`InstanceArena::reparent`] and never copies them.

pub mod builder;
pub mod merge;

use std::collections::BTreeMap;

use serde::Serialize;
use yang_data_core::{DocumentId, DomNodeId};

use crate::dom::ROOT_NAME;
use crate::error::{DataError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

/// The DOM node an instance was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomRef {
    pub document: DocumentId,
    pub node: DomNodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureChildren {
    /// Containers and lists.
    pub structure: Vec<InstanceId>,
    /// Leafs, leaf-list entries, anydata and anyxml.
    pub content: Vec<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceKind {
    Root(StructureChildren),
    Container(StructureChildren),
    List {
        children: StructureChildren,
        /// Key leaf names in schema order.
        key_names: Vec<String>,
        key_values: BTreeMap<String, String>,
    },
    Leaf {
        value: String,
    },
    /// One entry of a leaf-list.
    LeafList {
        value: String,
    },
    AnyData {
        value: String,
    },
    AnyXml {
        value: String,
    },
}

impl InstanceKind {
    pub fn children(&self) -> Option<&StructureChildren> {
        match self {
            Self::Root(children) | Self::Container(children) | Self::List { children, .. } => {
                Some(children)
            }
            Self::Leaf { .. }
            | Self::LeafList { .. }
            | Self::AnyData { .. }
            | Self::AnyXml { .. } => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut StructureChildren> {
        match self {
            Self::Root(children) | Self::Container(children) | Self::List { children, .. } => {
                Some(children)
            }
            Self::Leaf { .. }
            | Self::LeafList { .. }
            | Self::AnyData { .. }
            | Self::AnyXml { .. } => None,
        }
    }

    /// Value of a leaf, leaf-list entry, anydata or anyxml.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Leaf { value }
            | Self::LeafList { value }
            | Self::AnyData { value }
            | Self::AnyXml { value } => Some(value),
            Self::Root(_) | Self::Container(_) | Self::List { .. } => None,
        }
    }

    /// Whether instances of this kind go into the structural bucket.
    pub fn is_structural(&self) -> bool {
        self.children().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceNode {
    pub name: String,
    pub namespace: String,
    pub kind: InstanceKind,
    parent: Option<InstanceId>,
    /// `None` for synthesized instances.
    pub dom: Option<DomRef>,
}

impl InstanceNode {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        kind: InstanceKind,
        dom: Option<DomRef>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            parent: None,
            dom,
        }
    }

    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}

impl std::fmt::Display for InstanceNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}):{}", self.namespace, self.name)?;
        match &self.kind {
            InstanceKind::List { key_values, .. } => {
                let keys: Vec<String> =
                    key_values.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", keys.join(", "))
            }
            kind => match kind.value() {
                Some(value) => write!(f, "={value}"),
                None => Ok(()),
            },
        }
    }
}

/// Arena holding every instance node of a session.
///
/// Ids of released nodes are never reused.
#[derive(Debug, Clone, Default)]
pub struct InstanceArena {
    slots: Vec<Option<InstanceNode>>,
}

impl InstanceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty, parentless root.
    pub fn new_root(&mut self) -> InstanceId {
        let root = InstanceNode::new(
            ROOT_NAME,
            ROOT_NAME,
            InstanceKind::Root(StructureChildren::default()),
            None,
        );
        self.insert(root)
    }

    fn insert(&mut self, node: InstanceNode) -> InstanceId {
        let id = InstanceId(self.slots.len());
        self.slots.push(Some(node));
        id
    }

    pub fn get(&self, id: InstanceId) -> Option<&InstanceNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn node(&self, id: InstanceId) -> Result<&InstanceNode> {
        self.get(id).ok_or(DataError::DanglingInstance(id))
    }

    fn node_mut(&mut self, id: InstanceId) -> Result<&mut InstanceNode> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(DataError::DanglingInstance(id))
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn children(&self, id: InstanceId) -> Result<&StructureChildren> {
        self.node(id)?
            .kind
            .children()
            .ok_or(DataError::NotStructural(id))
    }

    fn children_mut(&mut self, id: InstanceId) -> Result<&mut StructureChildren> {
        self.node_mut(id)?
            .kind
            .children_mut()
            .ok_or(DataError::NotStructural(id))
    }

    fn bucket_mut(&mut self, parent: InstanceId, structural: bool) -> Result<&mut Vec<InstanceId>> {
        let children = self.children_mut(parent)?;
        Ok(if structural {
            &mut children.structure
        } else {
            &mut children.content
        })
    }

    /// Adds `node` as the last child of `parent` in the bucket its kind
    /// belongs to.
    pub fn attach(&mut self, parent: InstanceId, mut node: InstanceNode) -> Result<InstanceId> {
        let structural = node.kind.is_structural();
        // Validate the parent before allocating.
        self.children(parent)?;
        node.parent = Some(parent);
        let id = self.insert(node);
        self.bucket_mut(parent, structural)?.push(id);
        Ok(id)
    }

    fn detach(&mut self, id: InstanceId) -> Result<()> {
        let node = self.node(id)?;
        let structural = node.kind.is_structural();
        let Some(parent) = node.parent else {
            return Ok(());
        };
        self.bucket_mut(parent, structural)?.retain(|&child| child != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Moves `id` and its subtree to the end of `new_parent`'s children.
    pub fn reparent(&mut self, id: InstanceId, new_parent: InstanceId) -> Result<()> {
        let structural = self.node(id)?.kind.is_structural();
        self.children(new_parent)?;
        self.detach(id)?;
        self.bucket_mut(new_parent, structural)?.push(id);
        self.node_mut(id)?.parent = Some(new_parent);
        Ok(())
    }

    /// Detaches `id` from its parent and frees it with its whole subtree.
    pub fn release(&mut self, id: InstanceId) -> Result<()> {
        self.detach(id)?;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = self
                .slots
                .get_mut(next.0)
                .and_then(Option::take)
                .ok_or(DataError::DanglingInstance(next))?;
            if let Some(children) = node.kind.children() {
                pending.extend(children.structure.iter().copied());
                pending.extend(children.content.iter().copied());
            }
        }
        Ok(())
    }

    fn find_child(
        &self,
        parent: InstanceId,
        structural: bool,
        predicate: impl Fn(&InstanceNode) -> bool,
    ) -> Option<InstanceId> {
        let children = self.children(parent).ok()?;
        let bucket = if structural {
            &children.structure
        } else {
            &children.content
        };
        bucket
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    pub fn find_container(
        &self,
        parent: InstanceId,
        namespace: &str,
        name: &str,
    ) -> Option<InstanceId> {
        self.find_child(parent, true, |n| {
            n.is(namespace, name) && matches!(n.kind, InstanceKind::Container(_))
        })
    }

    pub fn find_list(
        &self,
        parent: InstanceId,
        namespace: &str,
        name: &str,
        keys: &BTreeMap<String, String>,
    ) -> Option<InstanceId> {
        self.find_child(parent, true, |n| {
            n.is(namespace, name)
                && matches!(&n.kind, InstanceKind::List { key_values, .. } if key_values == keys)
        })
    }

    pub fn find_leaf(&self, parent: InstanceId, namespace: &str, name: &str) -> Option<InstanceId> {
        self.find_child(parent, false, |n| {
            n.is(namespace, name) && matches!(n.kind, InstanceKind::Leaf { .. })
        })
    }

    pub fn find_leaf_list_value(
        &self,
        parent: InstanceId,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Option<InstanceId> {
        self.find_child(parent, false, |n| {
            n.is(namespace, name)
                && matches!(&n.kind, InstanceKind::LeafList { value: v } if v == value)
        })
    }

    pub fn find_anydata(
        &self,
        parent: InstanceId,
        namespace: &str,
        name: &str,
    ) -> Option<InstanceId> {
        self.find_child(parent, false, |n| {
            n.is(namespace, name) && matches!(n.kind, InstanceKind::AnyData { .. })
        })
    }

    pub fn find_anyxml(
        &self,
        parent: InstanceId,
        namespace: &str,
        name: &str,
    ) -> Option<InstanceId> {
        self.find_child(parent, false, |n| {
            n.is(namespace, name) && matches!(n.kind, InstanceKind::AnyXml { .. })
        })
    }

    /// Value of the leaf `name` below `parent`.
    pub fn leaf_value(&self, parent: InstanceId, namespace: &str, name: &str) -> Option<&str> {
        let id = self.find_leaf(parent, namespace, name)?;
        self.get(id)?.kind.value()
    }

    /// Values of the leaf-list `name` below `parent`, in order.
    pub fn leaf_list_values(&self, parent: InstanceId, namespace: &str, name: &str) -> Vec<&str> {
        let Ok(children) = self.children(parent) else {
            return Vec::new();
        };
        children
            .content
            .iter()
            .filter_map(|&id| self.get(id))
            .filter(|n| n.is(namespace, name))
            .filter_map(|n| match &n.kind {
                InstanceKind::LeafList { value } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Entries of the list `name` below `parent`, in order.
    pub fn list_entries(&self, parent: InstanceId, namespace: &str, name: &str) -> Vec<InstanceId> {
        let Ok(children) = self.children(parent) else {
            return Vec::new();
        };
        children
            .structure
            .iter()
            .copied()
            .filter(|&id| {
                self.get(id).is_some_and(|n| {
                    n.is(namespace, name) && matches!(n.kind, InstanceKind::List { .. })
                })
            })
            .collect()
    }

    /// Slash-separated instance names from the root, `/` for a root.
    pub fn path(&self, id: InstanceId) -> String {
        let mut names = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            if matches!(node.kind, InstanceKind::Root(_)) {
                break;
            }
            names.push(node.name.as_str());
            current = node.parent.and_then(|p| self.get(p));
        }
        if names.is_empty() {
            return ROOT_NAME.to_string();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Value-level copy of the subtree below `id`.
    pub fn snapshot(&self, id: InstanceId) -> Result<InstanceSnapshot> {
        let node = self.node(id)?;
        let namespace = node.namespace.clone();
        let name = node.name.clone();
        let snapshot = match &node.kind {
            InstanceKind::Root(children) => InstanceSnapshot::Root {
                children: self.snapshot_children(children)?,
            },
            InstanceKind::Container(children) => InstanceSnapshot::Container {
                namespace,
                name,
                children: self.snapshot_children(children)?,
            },
            InstanceKind::List {
                children,
                key_values,
                ..
            } => InstanceSnapshot::List {
                namespace,
                name,
                keys: key_values.clone(),
                children: self.snapshot_children(children)?,
            },
            InstanceKind::Leaf { value } => InstanceSnapshot::Leaf {
                namespace,
                name,
                value: value.clone(),
            },
            InstanceKind::LeafList { value } => InstanceSnapshot::LeafList {
                namespace,
                name,
                value: value.clone(),
            },
            InstanceKind::AnyData { value } => InstanceSnapshot::AnyData {
                namespace,
                name,
                value: value.clone(),
            },
            InstanceKind::AnyXml { value } => InstanceSnapshot::AnyXml {
                namespace,
                name,
                value: value.clone(),
            },
        };
        Ok(snapshot)
    }

    fn snapshot_children(&self, children: &StructureChildren) -> Result<Vec<InstanceSnapshot>> {
        children
            .content
            .iter()
            .chain(&children.structure)
            .map(|&id| self.snapshot(id))
            .collect()
    }
}

/// An owned, serializable copy of an instance subtree.
///
/// Children list content children first, then structural children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InstanceSnapshot {
    Root {
        children: Vec<InstanceSnapshot>,
    },
    Container {
        namespace: String,
        name: String,
        children: Vec<InstanceSnapshot>,
    },
    List {
        namespace: String,
        name: String,
        keys: BTreeMap<String, String>,
        children: Vec<InstanceSnapshot>,
    },
    Leaf {
        namespace: String,
        name: String,
        value: String,
    },
    LeafList {
        namespace: String,
        name: String,
        value: String,
    },
    #[serde(rename = "anydata")]
    AnyData {
        namespace: String,
        name: String,
        value: String,
    },
    #[serde(rename = "anyxml")]
    AnyXml {
        namespace: String,
        name: String,
        value: String,
    },
}

impl InstanceSnapshot {
    /// Sorts children recursively, for comparisons that ignore sibling order.
    pub fn normalized(mut self) -> Self {
        if let Self::Root { children }
        | Self::Container { children, .. }
        | Self::List { children, .. } = &mut self
        {
            let mut sorted: Vec<_> = std::mem::take(children)
                .into_iter()
                .map(InstanceSnapshot::normalized)
                .collect();
            sorted.sort();
            *children = sorted;
        }
        self
    }
}
