//! Combination of instance trees with netconf "merge" semantics.
//!
//! Merging moves nodes from the source tree into the target tree. Leafs the
//! target already has keep the target's value; a differing source value is
//! reported as a conflict and discarded. Leaf-lists only ever gain entries.
//! Matching containers and list entries are merged recursively, anything
//! else is moved over whole.

use tracing::debug;
use yang_data_core::{Finding, FindingsManager, ParserFindingType};

use super::{InstanceArena, InstanceId, InstanceKind};
use crate::dom::DocumentSet;
use crate::error::Result;

/// Merges the children of `source` into `target`.
///
/// Afterwards `source` has no children left: each was either moved below
/// `target` or released. Content children are handled before structural
/// children, each in source order.
pub fn merge_into(
    arena: &mut InstanceArena,
    target: InstanceId,
    source: InstanceId,
    documents: &DocumentSet,
    findings: &mut FindingsManager,
) -> Result<()> {
    let children = arena.children(source)?;
    let content = children.content.clone();
    let structure = children.structure.clone();

    for child in content {
        merge_content_child(arena, target, child, documents, findings)?;
    }
    for child in structure {
        merge_structure_child(arena, target, child, documents, findings)?;
    }
    Ok(())
}

fn merge_content_child(
    arena: &mut InstanceArena,
    target: InstanceId,
    child: InstanceId,
    documents: &DocumentSet,
    findings: &mut FindingsManager,
) -> Result<()> {
    let node = arena.node(child)?;
    let (namespace, name) = (node.namespace.as_str(), node.name.as_str());

    let existing = match &node.kind {
        InstanceKind::Leaf { value } => {
            let Some(existing) = arena.find_leaf(target, namespace, name) else {
                return arena.reparent(child, target);
            };
            let target_node = arena.node(existing)?;
            let target_value = target_node.kind.value().unwrap_or_default();
            if target_value != value {
                let target_input = target_node
                    .dom
                    .and_then(|dom| documents.get(dom.document))
                    .map(|doc| doc.input_name().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let message = format!(
                    "A different value for leaf '{}' has already been set by input \
                     '{target_input}' ({value} vs. {target_value}).",
                    arena.path(existing)
                );
                let origin = node
                    .dom
                    .and_then(|dom| documents.get(dom.document).map(|doc| (doc, dom.node)));
                let finding_type = ParserFindingType::P073LeafValueAlreadySet;
                let finding = match origin {
                    Some((doc, dom_node)) => doc.finding_on(dom_node, finding_type, message),
                    None => Finding::new(finding_type, message),
                };
                findings.add_finding(finding);
            }
            Some(existing)
        }
        InstanceKind::LeafList { value } => {
            arena.find_leaf_list_value(target, namespace, name, value)
        }
        InstanceKind::AnyData { .. } => arena.find_anydata(target, namespace, name),
        InstanceKind::AnyXml { .. } => arena.find_anyxml(target, namespace, name),
        InstanceKind::Root(_) | InstanceKind::Container(_) | InstanceKind::List { .. } => {
            return merge_structure_child(arena, target, child, documents, findings);
        }
    };

    match existing {
        Some(_) => arena.release(child),
        None => arena.reparent(child, target),
    }
}

fn merge_structure_child(
    arena: &mut InstanceArena,
    target: InstanceId,
    child: InstanceId,
    documents: &DocumentSet,
    findings: &mut FindingsManager,
) -> Result<()> {
    let node = arena.node(child)?;
    let (namespace, name) = (node.namespace.as_str(), node.name.as_str());

    let counterpart = match &node.kind {
        InstanceKind::Container(_) => arena.find_container(target, namespace, name),
        InstanceKind::List { key_values, .. } => {
            arena.find_list(target, namespace, name, key_values)
        }
        InstanceKind::Root(_) => Some(target),
        InstanceKind::Leaf { .. }
        | InstanceKind::LeafList { .. }
        | InstanceKind::AnyData { .. }
        | InstanceKind::AnyXml { .. } => {
            return merge_content_child(arena, target, child, documents, findings);
        }
    };

    match counterpart {
        Some(counterpart) => {
            merge_into(arena, counterpart, child, documents, findings)?;
            arena.release(child)
        }
        None => arena.reparent(child, target),
    }
}

/// Merges the trees below `roots` left to right into a new root, which is
/// returned. On a leaf conflict the earliest tree's value wins.
///
/// The given roots are consumed.
pub fn merge_trees(
    arena: &mut InstanceArena,
    roots: &[InstanceId],
    documents: &DocumentSet,
    findings: &mut FindingsManager,
) -> Result<InstanceId> {
    let combined = arena.new_root();
    for &root in roots {
        merge_into(arena, combined, root, documents, findings)?;
        arena.release(root)?;
    }
    debug!(
        inputs = roots.len(),
        instances = arena.live_count(),
        "Merged instance trees"
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::instance::{InstanceNode, StructureChildren};

    const NS: &str = "urn:a";

    fn leaf(arena: &mut InstanceArena, parent: InstanceId, name: &str, value: &str) -> InstanceId {
        let kind = InstanceKind::Leaf { value: value.into() };
        arena.attach(parent, InstanceNode::new(name, NS, kind, None)).unwrap()
    }

    fn leaf_list(
        arena: &mut InstanceArena,
        parent: InstanceId,
        name: &str,
        value: &str,
    ) -> InstanceId {
        let kind = InstanceKind::LeafList { value: value.into() };
        arena.attach(parent, InstanceNode::new(name, NS, kind, None)).unwrap()
    }

    fn container(arena: &mut InstanceArena, parent: InstanceId, name: &str) -> InstanceId {
        let kind = InstanceKind::Container(StructureChildren::default());
        arena.attach(parent, InstanceNode::new(name, NS, kind, None)).unwrap()
    }

    fn entry(arena: &mut InstanceArena, parent: InstanceId, id: &str) -> InstanceId {
        let kind = InstanceKind::List {
            children: StructureChildren::default(),
            key_names: vec!["id".into()],
            key_values: BTreeMap::from([("id".to_string(), id.to_string())]),
        };
        let entry = arena.attach(parent, InstanceNode::new("item", NS, kind, None)).unwrap();
        leaf(arena, entry, "id", id);
        entry
    }

    #[test]
    fn test_leaf_conflict_keeps_target() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let target = arena.new_root();
        leaf(&mut arena, target, "a", "1");
        let source = arena.new_root();
        leaf(&mut arena, source, "a", "2");

        merge_into(&mut arena, target, source, &DocumentSet::new(), &mut findings).unwrap();

        assert_eq!(arena.leaf_value(target, NS, "a"), Some("1"));
        assert_eq!(findings.len(), 1);
        assert!(findings.has_finding_of_type(ParserFindingType::P073LeafValueAlreadySet));
        assert!(arena.children(source).unwrap().content.is_empty());
    }

    #[test]
    fn test_leaf_added_when_missing() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let target = arena.new_root();
        leaf(&mut arena, target, "a", "1");
        let source = arena.new_root();
        leaf(&mut arena, source, "a", "1");
        let b = leaf(&mut arena, source, "b", "2");

        merge_into(&mut arena, target, source, &DocumentSet::new(), &mut findings).unwrap();

        assert!(findings.is_empty());
        assert_eq!(arena.leaf_value(target, NS, "b"), Some("2"));
        assert_eq!(arena.node(b).unwrap().parent(), Some(target));
        assert_eq!(arena.children(target).unwrap().content.len(), 2);
    }

    #[test]
    fn test_leaf_list_is_additive() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let target = arena.new_root();
        leaf_list(&mut arena, target, "tag", "x");
        let source = arena.new_root();
        leaf_list(&mut arena, source, "tag", "x");
        leaf_list(&mut arena, source, "tag", "y");

        merge_into(&mut arena, target, source, &DocumentSet::new(), &mut findings).unwrap();

        assert!(findings.is_empty());
        assert_eq!(arena.leaf_list_values(target, NS, "tag"), vec!["x", "y"]);
    }

    #[test]
    fn test_containers_merge_recursively() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let target = arena.new_root();
        let t_top = container(&mut arena, target, "top");
        leaf(&mut arena, t_top, "a", "1");
        let source = arena.new_root();
        let s_top = container(&mut arena, source, "top");
        leaf(&mut arena, s_top, "b", "2");
        let s_other = container(&mut arena, source, "other");

        merge_into(&mut arena, target, source, &DocumentSet::new(), &mut findings).unwrap();

        assert_eq!(arena.find_container(target, NS, "top"), Some(t_top));
        assert_eq!(arena.leaf_value(t_top, NS, "b"), Some("2"));
        assert!(arena.get(s_top).is_none(), "emptied source container is released");
        assert_eq!(arena.find_container(target, NS, "other"), Some(s_other));
    }

    #[test]
    fn test_list_entries_merge_by_key() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let target = arena.new_root();
        let t_a = entry(&mut arena, target, "a");
        let source = arena.new_root();
        let s_a = entry(&mut arena, source, "a");
        leaf(&mut arena, s_a, "extra", "e");
        entry(&mut arena, source, "b");

        merge_into(&mut arena, target, source, &DocumentSet::new(), &mut findings).unwrap();

        assert!(findings.is_empty());
        let entries = arena.list_entries(target, NS, "item");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], t_a);
        assert_eq!(arena.leaf_value(t_a, NS, "extra"), Some("e"));
    }

    #[test]
    fn test_merge_trees_left_to_right() {
        let mut arena = InstanceArena::new();
        let mut findings = FindingsManager::new();
        let first = arena.new_root();
        leaf(&mut arena, first, "a", "1");
        let second = arena.new_root();
        leaf(&mut arena, second, "a", "2");
        let third = arena.new_root();
        leaf(&mut arena, third, "a", "3");
        leaf(&mut arena, third, "b", "3");

        let documents = DocumentSet::new();
        let combined =
            merge_trees(&mut arena, &[first, second, third], &documents, &mut findings).unwrap();

        assert_eq!(arena.leaf_value(combined, NS, "a"), Some("1"));
        assert_eq!(arena.leaf_value(combined, NS, "b"), Some("3"));
        assert_eq!(findings.len(), 2);
        assert!(arena.get(first).is_none());
        assert_eq!(arena.live_count(), 3);
    }
}
