//! DOM construction from JSON value trees (RFC 7951 encoding).

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::debug;
use yang_data_core::{DocumentId, DomNodeId, FindingsManager, ParserFindingType};

use super::prefix::split_qname;
use super::{AnnotationValue, DomDocument, DomNode, DomValue, SourceDataType};
use crate::input::{JsonKind, JsonMember, JsonPrimitive, JsonValue};

/// `[null]` is the encoding of the `empty` type; it reads as a plain `null`.
fn normalize_empty(value: &JsonValue) -> Cow<'_, JsonValue> {
    if value.is_empty_marker() {
        Cow::Owned(JsonValue::null().at(value.line, value.column))
    } else {
        Cow::Borrowed(value)
    }
}

fn primitive_value(primitive: &JsonPrimitive) -> DomValue {
    match primitive {
        JsonPrimitive::Null => DomValue::Null,
        JsonPrimitive::Bool(b) => DomValue::Boolean(*b),
        JsonPrimitive::Number(n) => DomValue::Number(n.clone()),
        JsonPrimitive::String(s) => DomValue::String(s.clone()),
    }
}

fn position(value: &JsonValue, member: &JsonMember) -> (usize, usize) {
    if value.line > 0 {
        (value.line, value.column)
    } else {
        (member.line, member.column)
    }
}

impl DomDocument {
    /// Builds the DOM of a JSON document. The root must be an object whose
    /// members are module-prefixed top-level data nodes.
    pub fn from_json(
        id: DocumentId,
        input_name: impl Into<String>,
        root: &JsonValue,
        findings: &mut FindingsManager,
    ) -> DomDocument {
        let mut doc = DomDocument::new(id, input_name, SourceDataType::Json);

        let Some(members) = root.as_object() else {
            findings.add_finding(
                doc.finding_on_document(
                    ParserFindingType::P070WrongJsonValueType,
                    "Expected a JSON object as root of the data file.",
                )
                .at(root.line, root.column),
            );
            return doc;
        };

        if members.is_empty() {
            findings.add_finding(
                doc.finding_on_document(
                    ParserFindingType::P079EmptyDataFile,
                    "The instance data input seems to be empty.",
                )
                .at(root.line, root.column),
            );
        }

        process_members(&mut doc, DomNodeId::ROOT, None, members, findings);

        for &top in doc.top_level_nodes() {
            let missing = doc.node(top).is_some_and(|n| n.module_name().is_none());
            if missing {
                findings.add_finding(doc.finding_on(
                    top,
                    ParserFindingType::P015InvalidSyntaxInDocument,
                    "The name of all top-level data nodes must be prefixed with the name of the \
                     module that owns the data node.",
                ));
            }
        }

        debug!(
            input = %doc.input_name(),
            nodes = doc.len(),
            "Built data DOM from JSON"
        );
        doc
    }
}

fn process_members(
    doc: &mut DomDocument,
    parent: DomNodeId,
    parent_module: Option<&str>,
    members: &[JsonMember],
    findings: &mut FindingsManager,
) {
    if let Some(own) = members.iter().find(|m| m.name == "@") {
        let own_value = normalize_empty(&own.value);
        match own_value.as_object() {
            Some(object) => {
                let annotations = annotations_from(doc, parent, object, findings);
                doc.node_mut(parent).annotations.extend(annotations);
            }
            None => {
                findings.add_finding(
                    doc.finding_on(
                        parent,
                        ParserFindingType::P070WrongJsonValueType,
                        "Expected a JSON object to hold the annotations.",
                    )
                    .at(own.line, own.column),
                );
            }
        }
    }

    let mut leaf_names: HashSet<&str> = HashSet::new();

    for member in members.iter().filter(|m| !m.name.starts_with('@')) {
        let (prefix, local) = split_qname(&member.name);
        let module = prefix.or(parent_module);
        let value = normalize_empty(&member.value);

        match &value.kind {
            JsonKind::Primitive(primitive) => {
                leaf_names.insert(member.name.as_str());
                let (line, column) = position(&value, member);
                let id = doc.push_child(
                    parent,
                    DomNode::new(local, line, column)
                        .with_module(module.map(str::to_string))
                        .with_value(primitive_value(primitive)),
                );
                if let Some(holder) = annotation_holder(members, &member.name) {
                    let holder_value = normalize_empty(&holder.value);
                    match holder_value.as_object() {
                        Some(object) => {
                            let annotations = annotations_from(doc, id, object, findings);
                            doc.node_mut(id).annotations = annotations;
                        }
                        None => {
                            findings.add_finding(
                                doc.finding_on(
                                    id,
                                    ParserFindingType::P070WrongJsonValueType,
                                    "Expected a JSON object to hold the annotations.",
                                )
                                .at(holder.line, holder.column),
                            );
                        }
                    }
                }
            }
            JsonKind::Object(children) => {
                let (line, column) = position(&value, member);
                let id = doc.push_child(
                    parent,
                    DomNode::new(local, line, column).with_module(module.map(str::to_string)),
                );
                process_members(doc, id, module, children, findings);
            }
            JsonKind::Array(elements) if elements.is_empty() => {}
            JsonKind::Array(elements) => {
                let elements: Vec<Cow<'_, JsonValue>> =
                    elements.iter().map(normalize_empty).collect();
                let all_primitive = elements.iter().all(|e| e.as_primitive().is_some());
                let all_objects = elements.iter().all(|e| e.as_object().is_some());

                if all_primitive {
                    leaf_names.insert(member.name.as_str());
                    let holder = annotation_holder(members, &member.name);
                    process_leaf_list(
                        doc, parent, module, local, member, &elements, holder, findings,
                    );
                } else if all_objects {
                    for element in &elements {
                        let (line, column) = position(element, member);
                        let node = DomNode::new(local, line, column)
                            .with_module(module.map(str::to_string));
                        let id = doc.push_child(parent, node);
                        if let Some(children) = element.as_object() {
                            process_members(doc, id, module, children, findings);
                        }
                    }
                } else {
                    findings.add_finding(
                        doc.finding_on(
                            parent,
                            ParserFindingType::P070WrongJsonValueType,
                            format!(
                                "The elements of JSON array '{}' must all either be objects or \
                                 be primitives.",
                                member.name
                            ),
                        )
                        .at(member.line, member.column),
                    );
                }
            }
        }
    }

    for holder in members.iter().filter(|m| m.name.len() > 1 && m.name.starts_with('@')) {
        let target = &holder.name[1..];
        if !leaf_names.contains(target) {
            findings.add_finding(
                doc.finding_on(
                    parent,
                    ParserFindingType::P069UnexpectedJsonValue,
                    format!(
                        "Annotation '{}' cannot be matched up against a leaf or leaf-list \
                         with name '{target}'.",
                        holder.name
                    ),
                )
                .at(holder.line, holder.column),
            );
        }
    }
}

/// The `@name` sibling holding the annotations of member `name`.
fn annotation_holder<'a>(members: &'a [JsonMember], name: &str) -> Option<&'a JsonMember> {
    members
        .iter()
        .find(|m| m.name.strip_prefix('@') == Some(name))
}

#[allow(clippy::too_many_arguments)]
fn process_leaf_list(
    doc: &mut DomDocument,
    parent: DomNodeId,
    module: Option<&str>,
    local: &str,
    member: &JsonMember,
    elements: &[Cow<'_, JsonValue>],
    holder: Option<&JsonMember>,
    findings: &mut FindingsManager,
) {
    let ids: Vec<DomNodeId> = elements
        .iter()
        .map(|element| {
            let (line, column) = position(element, member);
            let value = element
                .as_primitive()
                .map(primitive_value)
                .unwrap_or(DomValue::Null);
            doc.push_child(
                parent,
                DomNode::new(local, line, column)
                    .with_module(module.map(str::to_string))
                    .with_value(value),
            )
        })
        .collect();

    let Some(holder) = holder else {
        return;
    };
    let Some(entries) = holder.value.as_array() else {
        findings.add_finding(
            doc.finding_on(
                parent,
                ParserFindingType::P070WrongJsonValueType,
                "Expected a JSON array to hold the annotations.",
            )
            .at(holder.line, holder.column),
        );
        return;
    };

    let entries: Vec<Cow<'_, JsonValue>> = entries.iter().map(normalize_empty).collect();
    if entries.iter().any(|e| !e.is_null() && e.as_object().is_none()) {
        findings.add_finding(
            doc.finding_on(
                parent,
                ParserFindingType::P070WrongJsonValueType,
                "Expected a JSON object as array element to hold the annotations.",
            )
            .at(holder.line, holder.column),
        );
        return;
    }

    if entries.len() > ids.len() {
        findings.add_finding(
            doc.finding_on(
                parent,
                ParserFindingType::P069UnexpectedJsonValue,
                format!(
                    "Annotation array '{}' has more elements than the leaf-list it annotates.",
                    holder.name
                ),
            )
            .at(holder.line, holder.column),
        );
    }

    for (id, entry) in ids.iter().zip(&entries) {
        if let Some(object) = entry.as_object() {
            let annotations = annotations_from(doc, *id, object, findings);
            doc.node_mut(*id).annotations = annotations;
        }
    }
}

/// Reads the members of an annotation object. Every member name must carry
/// a module prefix and every value must be a primitive.
fn annotations_from(
    doc: &DomDocument,
    owner: DomNodeId,
    members: &[JsonMember],
    findings: &mut FindingsManager,
) -> Vec<AnnotationValue> {
    let mut annotations = Vec::with_capacity(members.len());
    for member in members {
        let (prefix, name) = split_qname(&member.name);
        let Some(module) = prefix else {
            findings.add_finding(
                doc.finding_on(
                    owner,
                    ParserFindingType::P015InvalidSyntaxInDocument,
                    "All members of the JSON object used for annotation values must be prefixed \
                     with the module name.",
                )
                .at(member.line, member.column),
            );
            continue;
        };

        let value = normalize_empty(&member.value);
        let Some(primitive) = value.as_primitive() else {
            findings.add_finding(
                doc.finding_on(
                    owner,
                    ParserFindingType::P070WrongJsonValueType,
                    format!("Value of annotation '{}' must be a JSON primitive.", member.name),
                )
                .at(member.line, member.column),
            );
            continue;
        };

        annotations.push(AnnotationValue {
            namespace: None,
            module_name: Some(module.to_string()),
            name: name.to_string(),
            value: primitive_value(primitive),
        });
    }
    annotations
}
