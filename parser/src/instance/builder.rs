//! Translation of one DOM document into a schema-validated instance tree.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;
use yang_data_core::{
    DataSchema, DomNodeId, FindingsManager, ParserFindingType, SchemaNode, SchemaNodeKind,
    find_schema_node, find_schema_node_by_name, flatten_candidates,
};

use super::{DomRef, InstanceArena, InstanceId, InstanceKind, InstanceNode, StructureChildren};
use crate::dom::{DomDocument, DomNode, DomValue, SourceDataType};
use crate::error::{DataError, Result};

/// Restricts translation to top-level data nodes in the given namespaces.
///
/// An empty filter admits everything.
#[derive(Debug, Clone, Default)]
pub struct TopLevelFilter {
    namespaces: HashSet<String>,
}

impl TopLevelFilter {
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admits(&self, namespace: Option<&str>) -> bool {
        self.namespaces.is_empty() || namespace.is_some_and(|ns| self.namespaces.contains(ns))
    }
}

/// Translates `document` into a new root in `arena` and returns that root.
///
/// Data that does not fit the schema is dropped with a finding; the returned
/// error only signals a broken arena invariant.
pub fn translate_document<S: DataSchema>(
    schema: &S,
    document: &DomDocument,
    arena: &mut InstanceArena,
    findings: &mut FindingsManager,
    filter: &TopLevelFilter,
) -> Result<InstanceId> {
    let root = arena.new_root();
    let mut translator = Translator {
        document,
        arena,
        findings,
    };

    let candidates = flatten_candidates(schema.top_level_nodes());
    for &top in document.top_level_nodes() {
        let Some(node) = document.node(top) else {
            continue;
        };
        if !filter.admits(node.namespace()) {
            debug!(
                input = %document.input_name(),
                node = %node.name(),
                "Skipping top-level data node outside the namespace filter"
            );
            continue;
        }
        translator.process(top, root, &candidates)?;
    }

    debug!(
        input = %document.input_name(),
        instances = translator.arena.live_count(),
        "Translated instance tree"
    );
    Ok(root)
}

struct Translator<'a> {
    document: &'a DomDocument,
    arena: &'a mut InstanceArena,
    findings: &'a mut FindingsManager,
}

impl Translator<'_> {
    fn report(&mut self, node: DomNodeId, finding_type: ParserFindingType, message: String) {
        let finding = self.document.finding_on(node, finding_type, message);
        self.findings.add_finding(finding);
    }

    fn dom_ref(&self, node: DomNodeId) -> Option<DomRef> {
        Some(DomRef {
            document: self.document.id(),
            node,
        })
    }

    fn process<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        candidates: &[&N],
    ) -> Result<()> {
        let document = self.document;
        let Some(node) = document.node(id) else {
            return Ok(());
        };

        let Some(schema_node) = find_schema_node(candidates, node.namespace(), node.name()) else {
            self.report_missing_schema_node(id, node, candidates);
            return Ok(());
        };

        match schema_node.kind() {
            SchemaNodeKind::Container => self.process_container(id, parent, schema_node),
            SchemaNodeKind::Leaf => self.process_leaf(id, parent, node, schema_node),
            SchemaNodeKind::LeafList => self.process_leaf_list(id, parent, node, schema_node),
            SchemaNodeKind::List => self.process_list(id, parent, schema_node),
            SchemaNodeKind::AnyData | SchemaNodeKind::AnyXml => {
                self.process_any(id, parent, schema_node)
            }
            SchemaNodeKind::Choice | SchemaNodeKind::Case => {
                Err(DataError::UnexpectedSchemaKind(schema_node.name().to_string()))
            }
        }
    }

    fn report_missing_schema_node<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        node: &DomNode,
        candidates: &[&N],
    ) {
        let path = self.document.path(id);
        let namespace = node.namespace().unwrap_or("null");
        let message = match find_schema_node_by_name(candidates, node.name()) {
            Some(same_name) => format!(
                "No corresponding schema node was found in the model for data instance '{path}' in \
                 namespace '{namespace}', but there exists a schema node with the same name in \
                 namespace '{}'. Adjust namespace of the data instance.",
                same_name.effective_namespace()
            ),
            None => format!(
                "No corresponding schema node was found in the model for data instance '{path}' \
                 (ns='{namespace}')."
            ),
        };
        self.report(id, ParserFindingType::P075CorrespondingSchemaNodeNotFound, message);
    }

    fn children_of<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        instance: InstanceId,
        schema_node: &N,
    ) -> Result<()> {
        let document = self.document;
        let candidates = flatten_candidates(schema_node.child_nodes());
        for child in document.children_of(id) {
            self.process(child, instance, &candidates)?;
        }
        Ok(())
    }

    fn process_container<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        schema_node: &N,
    ) -> Result<()> {
        let namespace = schema_node.effective_namespace();
        if self.arena.find_container(parent, namespace, schema_node.name()).is_some() {
            let path = self.document.path(id);
            self.report(
                id,
                ParserFindingType::P076DuplicateInstanceData,
                format!("Container '{path}' already defined in this input."),
            );
            return Ok(());
        }

        let dom = self.dom_ref(id);
        let instance = self.arena.attach(
            parent,
            InstanceNode::new(
                schema_node.name(),
                namespace,
                InstanceKind::Container(StructureChildren::default()),
                dom,
            ),
        )?;
        self.children_of(id, instance, schema_node)
    }

    /// String value of a leaf or leaf-list entry. A JSON `null` stands for
    /// the `empty` type when the schema allows it.
    fn resolve_value<N: SchemaNode>(&self, node: &DomNode, schema_node: &N) -> Option<String> {
        match node.value().as_string() {
            Some(value) => Some(value),
            None if self.document.source() == SourceDataType::Json
                && matches!(node.value(), DomValue::Null | DomValue::Absent)
                && schema_node.accepts_empty() =>
            {
                Some(String::new())
            }
            None => None,
        }
    }

    fn process_leaf<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        node: &DomNode,
        schema_node: &N,
    ) -> Result<()> {
        let path = self.document.path(id);
        let Some(value) = self.resolve_value(node, schema_node) else {
            self.report(
                id,
                ParserFindingType::P080NullValue,
                format!("Leaf '{path}' does not have a value."),
            );
            return Ok(());
        };

        let namespace = schema_node.effective_namespace();
        if self.arena.find_leaf(parent, namespace, schema_node.name()).is_some() {
            self.report(
                id,
                ParserFindingType::P076DuplicateInstanceData,
                format!("Leaf '{path}' already defined in this input."),
            );
            return Ok(());
        }

        let dom = self.dom_ref(id);
        self.arena.attach(
            parent,
            InstanceNode::new(schema_node.name(), namespace, InstanceKind::Leaf { value }, dom),
        )?;
        Ok(())
    }

    fn process_leaf_list<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        node: &DomNode,
        schema_node: &N,
    ) -> Result<()> {
        let path = self.document.path(id);
        let Some(value) = self.resolve_value(node, schema_node) else {
            self.report(
                id,
                ParserFindingType::P080NullValue,
                format!("Leaf-list '{path}' entry does not have a value."),
            );
            return Ok(());
        };

        let namespace = schema_node.effective_namespace();
        if schema_node.is_effective_config()
            && self
                .arena
                .find_leaf_list_value(parent, namespace, schema_node.name(), &value)
                .is_some()
        {
            self.report(
                id,
                ParserFindingType::P076DuplicateInstanceData,
                format!(
                    "'config true' leaf-list '{path}' instance with value '{value}' already \
                     defined in this input."
                ),
            );
            return Ok(());
        }

        let dom = self.dom_ref(id);
        self.arena.attach(
            parent,
            InstanceNode::new(schema_node.name(), namespace, InstanceKind::LeafList { value }, dom),
        )?;
        Ok(())
    }

    fn process_list<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        schema_node: &N,
    ) -> Result<()> {
        let path = self.document.path(id);
        let key_names = schema_node.key_names().to_vec();

        let mut key_values = BTreeMap::new();
        for key in &key_names {
            let value = self
                .document
                .child_named(id, key)
                .and_then(|k| self.document.node(k))
                .and_then(|k| k.value().as_string());
            let Some(value) = value else {
                self.report(
                    id,
                    ParserFindingType::P072MissingKeyValue,
                    format!(
                        "No value, or null, supplied for key leaf '{key}' for list instance \
                         '{path}'."
                    ),
                );
                return Ok(());
            };
            key_values.insert(key.clone(), value);
        }

        let namespace = schema_node.effective_namespace();
        if self
            .arena
            .find_list(parent, namespace, schema_node.name(), &key_values)
            .is_some()
        {
            let keys: Vec<String> = key_names
                .iter()
                .map(|k| format!("{k}={}", key_values[k]))
                .collect();
            self.report(
                id,
                ParserFindingType::P076DuplicateInstanceData,
                format!(
                    "List '{path}' with key '{}' already defined in this input.",
                    keys.join(", ")
                ),
            );
            return Ok(());
        }

        let dom = self.dom_ref(id);
        let instance = self.arena.attach(
            parent,
            InstanceNode::new(
                schema_node.name(),
                namespace,
                InstanceKind::List {
                    children: StructureChildren::default(),
                    key_names,
                    key_values,
                },
                dom,
            ),
        )?;
        self.children_of(id, instance, schema_node)
    }

    fn process_any<N: SchemaNode>(
        &mut self,
        id: DomNodeId,
        parent: InstanceId,
        schema_node: &N,
    ) -> Result<()> {
        let namespace = schema_node.effective_namespace();
        let name = schema_node.name();
        let is_anydata = schema_node.kind() == SchemaNodeKind::AnyData;
        let existing = if is_anydata {
            self.arena.find_anydata(parent, namespace, name)
        } else {
            self.arena.find_anyxml(parent, namespace, name)
        };
        if existing.is_some() {
            let path = self.document.path(id);
            self.report(
                id,
                ParserFindingType::P076DuplicateInstanceData,
                format!("Anydata/Anyxml '{path}' already defined in this input."),
            );
            return Ok(());
        }

        let value = self.document.reassembled_children(id);
        let kind = if is_anydata {
            InstanceKind::AnyData { value }
        } else {
            InstanceKind::AnyXml { value }
        };
        let dom = self.dom_ref(id);
        self.arena
            .attach(parent, InstanceNode::new(name, namespace, kind, dom))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{JsonValue, XmlElement};
    use yang_data_core::{DocumentId, ModuleSchema, SchemaModel, SchemaNodeDef};

    fn schema() -> SchemaModel {
        SchemaModel::new(vec![ModuleSchema::new("acme", "urn:acme").with_node(
            SchemaNodeDef::container("top")
                .with_child(SchemaNodeDef::leaf("name", "string"))
                .with_child(SchemaNodeDef::leaf("flag", "empty"))
                .with_child(SchemaNodeDef::leaf_list("tag", "string"))
                .with_child(
                    SchemaNodeDef::container("state")
                        .config(false)
                        .with_child(SchemaNodeDef::leaf_list("sample", "uint8")),
                )
                .with_child(
                    SchemaNodeDef::list("user", ["name"])
                        .with_child(SchemaNodeDef::leaf("name", "string"))
                        .with_child(SchemaNodeDef::leaf("uid", "uint32")),
                )
                .with_child(
                    SchemaNodeDef::choice("mode").with_child(
                        SchemaNodeDef::case("a").with_child(SchemaNodeDef::leaf("fast", "boolean")),
                    ),
                )
                .with_child(SchemaNodeDef::anydata("blob")),
        )])
        .unwrap()
    }

    fn translate_json(json: &str) -> (InstanceArena, InstanceId, FindingsManager) {
        let schema = schema();
        let mut findings = FindingsManager::new();
        let value = JsonValue::parse(json).unwrap();
        let mut doc = DomDocument::from_json(DocumentId(0), "in.json", &value, &mut findings);
        doc.resolve_module_or_namespace(&schema);
        let mut arena = InstanceArena::new();
        let filter = TopLevelFilter::default();
        let root = translate_document(&schema, &doc, &mut arena, &mut findings, &filter).unwrap();
        (arena, root, findings)
    }

    fn types(findings: &FindingsManager) -> Vec<&str> {
        findings.findings().map(|f| f.finding_type.as_str()).collect()
    }

    fn top(arena: &InstanceArena, root: InstanceId) -> InstanceId {
        arena.find_container(root, "urn:acme", "top").unwrap()
    }

    #[test]
    fn test_translates_leafs_and_choice_members() {
        let (arena, root, findings) =
            translate_json(r#"{"acme:top": {"name": "x", "fast": true}}"#);
        assert!(findings.is_empty(), "{:?}", types(&findings));
        let top = top(&arena, root);
        assert_eq!(arena.leaf_value(top, "urn:acme", "name"), Some("x"));
        assert_eq!(arena.leaf_value(top, "urn:acme", "fast"), Some("true"));
        assert!(arena.node(top).unwrap().dom.is_some());
    }

    #[test]
    fn test_unknown_node_in_other_namespace_is_suggested() {
        let schema = schema();
        let mut findings = FindingsManager::new();
        let xml =
            XmlElement::new("config").child(XmlElement::new("top").attr("xmlns", "urn:wrong"));
        let doc = DomDocument::from_xml(DocumentId(0), "in.xml", &xml, &mut findings);
        let mut arena = InstanceArena::new();
        let filter = TopLevelFilter::default();
        let root = translate_document(&schema, &doc, &mut arena, &mut findings, &filter).unwrap();

        assert!(arena.children(root).unwrap().structure.is_empty());
        let finding = findings.findings().next().unwrap();
        assert!(finding.is(ParserFindingType::P075CorrespondingSchemaNodeNotFound));
        assert!(finding.message.contains("namespace 'urn:acme'"), "{}", finding.message);
    }

    #[test]
    fn test_unknown_node_generic_message() {
        let (_, _, findings) = translate_json(r#"{"acme:top": {"nothing": 1}}"#);
        let finding = findings.findings().next().unwrap();
        assert!(finding.is(ParserFindingType::P075CorrespondingSchemaNodeNotFound));
        assert_eq!(
            finding.message,
            "No corresponding schema node was found in the model for data instance \
             '/top/nothing' (ns='urn:acme')."
        );
    }

    #[test]
    fn test_null_leaf() {
        let (arena, root, findings) =
            translate_json(r#"{"acme:top": {"name": null, "flag": [null]}}"#);
        assert_eq!(types(&findings), vec!["P080_NULL_VALUE"]);
        let top = top(&arena, root);
        assert_eq!(arena.leaf_value(top, "urn:acme", "name"), None);
        assert_eq!(arena.leaf_value(top, "urn:acme", "flag"), Some(""));
    }

    #[test]
    fn test_duplicate_container() {
        let schema = schema();
        let mut findings = FindingsManager::new();
        let xml = XmlElement::new("config")
            .child(XmlElement::new("top").attr("xmlns", "urn:acme"))
            .child(XmlElement::new("top").attr("xmlns", "urn:acme"));
        let doc = DomDocument::from_xml(DocumentId(0), "in.xml", &xml, &mut findings);
        let mut arena = InstanceArena::new();
        let filter = TopLevelFilter::default();
        let root = translate_document(&schema, &doc, &mut arena, &mut findings, &filter).unwrap();

        assert_eq!(arena.children(root).unwrap().structure.len(), 1);
        assert_eq!(types(&findings), vec!["P076_DUPLICATE_INSTANCE_DATA"]);
    }

    #[test]
    fn test_leaf_list_duplicates_only_for_config_true() {
        let (arena, root, findings) = translate_json(
            r#"{"acme:top": {"tag": ["a", "b", "a"], "state": {"sample": [1, 1]}}}"#,
        );
        assert_eq!(types(&findings), vec!["P076_DUPLICATE_INSTANCE_DATA"]);
        let top = top(&arena, root);
        assert_eq!(arena.leaf_list_values(top, "urn:acme", "tag"), vec!["a", "b"]);
        let state = arena.find_container(top, "urn:acme", "state").unwrap();
        assert_eq!(arena.leaf_list_values(state, "urn:acme", "sample"), vec!["1", "1"]);
    }

    #[test]
    fn test_list_key_handling() {
        let (arena, root, findings) = translate_json(
            r#"{"acme:top": {"user": [
                {"name": "a", "uid": 1},
                {"uid": 2},
                {"name": "a", "uid": 3},
                {"name": "b"}
            ]}}"#,
        );
        assert_eq!(
            types(&findings),
            vec!["P072_MISSING_KEY_VALUE", "P076_DUPLICATE_INSTANCE_DATA"]
        );
        let top = top(&arena, root);
        let users = arena.list_entries(top, "urn:acme", "user");
        assert_eq!(users.len(), 2);
        assert_eq!(arena.leaf_value(users[0], "urn:acme", "uid"), Some("1"));
        assert_eq!(arena.leaf_value(users[1], "urn:acme", "name"), Some("b"));
    }

    #[test]
    fn test_anydata_placeholder() {
        let (arena, root, findings) =
            translate_json(r#"{"acme:top": {"blob": {"anything": [1, 2]}}}"#);
        assert!(findings.is_empty(), "{:?}", types(&findings));
        let top = top(&arena, root);
        let blob = arena.find_anydata(top, "urn:acme", "blob").unwrap();
        assert_eq!(arena.node(blob).unwrap().kind.value(), Some(""));
    }

    #[test]
    fn test_top_level_filter() {
        let schema = schema();
        let mut findings = FindingsManager::new();
        let value = JsonValue::parse(r#"{"acme:top": {"name": "x"}}"#).unwrap();
        let mut doc = DomDocument::from_json(DocumentId(0), "in.json", &value, &mut findings);
        doc.resolve_module_or_namespace(&schema);
        let mut arena = InstanceArena::new();

        let filter = TopLevelFilter::new(["urn:other"]);
        let root = translate_document(&schema, &doc, &mut arena, &mut findings, &filter).unwrap();

        assert!(arena.children(root).unwrap().structure.is_empty());
        assert!(findings.is_empty());
        assert!(TopLevelFilter::new(["urn:acme"]).admits(Some("urn:acme")));
        assert!(!TopLevelFilter::new(["urn:acme"]).admits(None));
    }
}
