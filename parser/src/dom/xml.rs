//! DOM construction from XML element trees.

use std::sync::Arc;

use tracing::debug;
use yang_data_core::{DocumentId, DomNodeId, FindingsManager, ParserFindingType};

use super::prefix::{PrefixResolver, XSI_NAMESPACE, namespace_declaration, split_qname};
use super::{AnnotationValue, DomDocument, DomNode, DomValue, SourceDataType};
use crate::input::{XmlContent, XmlElement};

impl DomDocument {
    /// Builds the DOM of an XML document.
    ///
    /// The document element may be one of the `config`, `data`, `rpc-reply`
    /// (with a `data` child) or `instance-data-set` (with a `content-data`
    /// child) wrappers; otherwise it is taken to be data itself.
    pub fn from_xml(
        id: DocumentId,
        input_name: impl Into<String>,
        root: &XmlElement,
        findings: &mut FindingsManager,
    ) -> DomDocument {
        let mut doc = DomDocument::new(id, input_name, SourceDataType::Xml);

        let mut resolver = PrefixResolver::new();
        resolver.declare_from(attribute_pairs(root));

        let data: Vec<&XmlElement> = match root.local_name() {
            "config" | "data" => root.child_elements().collect(),
            "instance-data-set" => wrapped_content(root, "content-data", &mut resolver),
            "rpc-reply" => wrapped_content(root, "data", &mut resolver),
            _ => {
                findings.add_finding(
                    doc.finding_on_document(
                        ParserFindingType::P071IncorrectRootElementOfDataFile,
                        "Expected <instance-data-set> (or <config> or <rpc-reply> or <data>) \
                         as first element in data file. Assume root element represents data. If \
                         this is not the case, this will likely lead to other findings.",
                    )
                    .at(root.line, root.column),
                );
                vec![root]
            }
        };

        if data.is_empty() {
            findings.add_finding(
                doc.finding_on_document(
                    ParserFindingType::P079EmptyDataFile,
                    "The instance data input seems to be empty.",
                )
                .at(root.line, root.column),
            );
        }

        let resolver = Arc::new(resolver);
        for element in data {
            build_element(&mut doc, DomNodeId::ROOT, element, &resolver, findings);
        }

        for &top in doc.top_level_nodes() {
            let missing = doc.node(top).is_some_and(|n| n.namespace().is_none());
            if missing {
                findings.add_finding(doc.finding_on(
                    top,
                    ParserFindingType::P015InvalidSyntaxInDocument,
                    "The top-level data nodes must have a namespace, but none is declared.",
                ));
            }
        }

        debug!(
            input = %doc.input_name(),
            nodes = doc.len(),
            "Built data DOM from XML"
        );
        doc
    }
}

fn attribute_pairs(element: &XmlElement) -> impl Iterator<Item = (&str, &str)> {
    element
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
}

/// Children of the wrapper's `child_name` child. Declarations on that child
/// join the document-level prefix table.
fn wrapped_content<'a>(
    root: &'a XmlElement,
    child_name: &str,
    resolver: &mut PrefixResolver,
) -> Vec<&'a XmlElement> {
    match root.child_elements().find(|e| e.local_name() == child_name) {
        Some(content) => {
            resolver.declare_from(attribute_pairs(content));
            content.child_elements().collect()
        }
        None => Vec::new(),
    }
}

fn build_element(
    doc: &mut DomDocument,
    parent: DomNodeId,
    element: &XmlElement,
    inherited: &Arc<PrefixResolver>,
    findings: &mut FindingsManager,
) {
    let declares = element
        .attributes
        .iter()
        .any(|a| namespace_declaration(&a.name).is_some());
    let resolver = if declares {
        let mut forked = PrefixResolver::clone(inherited);
        forked.declare_from(attribute_pairs(element));
        Arc::new(forked)
    } else {
        Arc::clone(inherited)
    };

    let (prefix, local) = split_qname(&element.name);
    let namespace = resolver.resolve(prefix).map(str::to_string);
    let unresolved_prefix = prefix.filter(|_| namespace.is_none());

    let mut nil = false;
    let mut annotations = Vec::new();
    let mut unresolved_annotations = Vec::new();
    for attribute in &element.attributes {
        if namespace_declaration(&attribute.name).is_some() {
            continue;
        }
        let (attr_prefix, attr_name) = split_qname(&attribute.name);
        let attr_namespace = resolver.resolve(attr_prefix);
        if attr_namespace == Some(XSI_NAMESPACE) && attr_name == "nil" {
            nil = attribute.value.trim().eq_ignore_ascii_case("true");
            continue;
        }
        match attr_namespace {
            Some(ns) => annotations.push(AnnotationValue {
                namespace: Some(ns.to_string()),
                module_name: None,
                name: attr_name.to_string(),
                value: DomValue::String(attribute.value.clone()),
            }),
            None => unresolved_annotations.push(attribute.name.clone()),
        }
    }

    let node = DomNode::new(local, element.line, element.column)
        .with_namespace(namespace)
        .with_value(element_value(element, nil))
        .with_annotations(annotations)
        .with_prefixes(Arc::clone(&resolver));
    let id = doc.push_child(parent, node);

    if let Some(prefix) = unresolved_prefix {
        findings.add_finding(doc.finding_on(
            id,
            ParserFindingType::P077UnresolvablePrefix,
            format!(
                "Prefix '{prefix}' of element '{}' cannot be resolved to a namespace.",
                element.name
            ),
        ));
    }
    for attribute in unresolved_annotations {
        findings.add_finding(doc.finding_on(
            id,
            ParserFindingType::P077UnresolvablePrefix,
            format!("Prefix of attribute '{attribute}' cannot be resolved to a namespace."),
        ));
    }

    for child in element.child_elements() {
        build_element(doc, id, child, &resolver, findings);
    }
}

fn element_value(element: &XmlElement, nil: bool) -> DomValue {
    if nil {
        return DomValue::Null;
    }
    let mut value = String::new();
    for content in &element.children {
        match content {
            XmlContent::Element(_) => return DomValue::Absent,
            XmlContent::Text(text) => value.push_str(&clean_xml_text(text)),
            XmlContent::CData(text) => value.push_str(text),
        }
    }
    DomValue::String(value)
}

/// Strips control characters from element text and folds line breaks.
///
/// Whitespace-only text yields nothing. Single-line text is trimmed;
/// multi-line text becomes its trimmed, non-empty lines joined by one space.
fn clean_xml_text(text: &str) -> String {
    let text: String = text
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect();

    if text.chars().all(|c| c == ' ' || c == '\t' || c == '\n') {
        return String::new();
    }
    if !text.contains('\n') {
        return text.trim().to_string();
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
