//! XML prefix-to-namespace resolution.

use std::collections::HashMap;

/// Namespace of the `xsi` attributes.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// In-scope namespace declarations of an XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixResolver {
    default_namespace: Option<String>,
    mappings: HashMap<String, String>,
}

impl PrefixResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declaration; `None` declares the default namespace.
    ///
    /// An empty namespace undeclares: `xmlns=""` leaves unprefixed names
    /// without a namespace.
    pub fn declare(&mut self, prefix: Option<&str>, namespace: impl Into<String>) {
        let namespace: String = namespace.into();
        let namespace = Some(namespace).filter(|ns| !ns.is_empty());
        match (prefix, namespace) {
            (None, namespace) => self.default_namespace = namespace,
            (Some(prefix), Some(namespace)) => {
                self.mappings.insert(prefix.to_string(), namespace);
            }
            (Some(prefix), None) => {
                self.mappings.remove(prefix);
            }
        }
    }

    /// Resolves a prefix; `None` asks for the default namespace.
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            None => self.default_namespace.as_deref(),
            Some(prefix) => self.mappings.get(prefix).map(String::as_str),
        }
    }

    /// Records every `xmlns`/`xmlns:p` declaration among `attributes`.
    /// Returns whether anything was declared.
    pub fn declare_from<'a>(
        &mut self,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> bool {
        let mut declared = false;
        for (name, value) in attributes {
            if let Some(prefix) = namespace_declaration(name) {
                self.declare(prefix, value);
                declared = true;
            }
        }
        declared
    }
}

/// Returns `Some(None)` for `xmlns`, `Some(Some(p))` for `xmlns:p` and `None`
/// for any other attribute name.
pub fn namespace_declaration(attribute: &str) -> Option<Option<&str>> {
    if attribute == "xmlns" {
        return Some(None);
    }
    attribute.strip_prefix("xmlns:").map(Some)
}

/// Splits `prefix:name`. A leading colon is not a prefix separator.
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.find(':') {
        Some(idx) if idx > 0 => (Some(&qname[..idx]), &qname[idx + 1..]),
        _ => (None, qname),
    }
}
