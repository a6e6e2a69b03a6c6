//! Tokenized XML element trees.
//!
//! Names are kept qualified (`prefix:local`) and namespace declarations are
//! kept as `xmlns`/`xmlns:prefix` attributes, so prefix resolution and its
//! findings happen while building the DOM.

use roxmltree::{Document, Node};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified attribute name.
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlElement),
    Text(String),
    CData(String),
}

/// An element with its attributes, content and start position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified element name.
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlContent>,
    pub line: usize,
    pub column: usize,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            line: 0,
            column: 0,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlContent::Element(element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlContent::Text(text.into()));
        self
    }

    pub fn cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlContent::CData(text.into()));
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() => local,
            _ => &self.name,
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Parses XML text and returns the document element.
    ///
    /// CDATA sections are reported as text by the tokenizer.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        Ok(convert(&doc, doc.root_element()))
    }
}

fn qualified_name(
    node: Node<'_, '_>,
    namespace: Option<&str>,
    local: &str,
    is_element: bool,
) -> String {
    let Some(uri) = namespace.filter(|uri| !uri.is_empty()) else {
        return local.to_string();
    };
    if is_element && node.lookup_namespace_uri(None) == Some(uri) {
        return local.to_string();
    }
    match node.lookup_prefix(uri) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn declared_namespaces(node: Node<'_, '_>) -> Vec<XmlAttribute> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    let mut declared: Vec<XmlAttribute> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml") && !ns.uri().is_empty())
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| XmlAttribute {
            name: match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            },
            value: ns.uri().to_string(),
        })
        .collect();

    // xmlns="" drops the default namespace from scope
    let has_default = |namespaces: &[(Option<&str>, &str)]| {
        namespaces.iter().any(|(name, uri)| name.is_none() && !uri.is_empty())
    };
    let own: Vec<(Option<&str>, &str)> =
        node.namespaces().map(|ns| (ns.name(), ns.uri())).collect();
    if has_default(inherited.as_slice()) && !has_default(own.as_slice()) {
        declared.push(XmlAttribute {
            name: "xmlns".to_string(),
            value: String::new(),
        });
    }
    declared
}

fn convert(doc: &Document<'_>, node: Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let pos = doc.text_pos_at(node.range().start);

    let mut attributes = declared_namespaces(node);
    attributes.extend(node.attributes().map(|a| XmlAttribute {
        name: qualified_name(node, a.namespace(), a.name(), false),
        value: a.value().to_string(),
    }));

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(XmlContent::Element(convert(doc, child)))
            } else if child.is_text() {
                child.text().map(|t| XmlContent::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect();

    XmlElement {
        name: qualified_name(node, tag.namespace(), tag.name(), true),
        attributes,
        children,
        line: pos.row as usize,
        column: pos.col as usize,
    }
}
