//! An in-memory schema model that can be declared in code, YAML or JSON.
//!
//! ```yaml
//! modules:
//!   - name: acme-system
//!     namespace: "urn:acme:system"
//!     nodes:
//!       - name: system
//!         kind: container
//!         children:
//!           - { name: hostname, kind: leaf, types: [string] }
//!           - { name: user, kind: list, keys: [name], children: [{ name: name, kind: leaf }] }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::schema::{DataSchema, SchemaNode, SchemaNodeKind};

/// A schema data node definition.
///
/// `config` left unset inherits the parent's effective value; top-level nodes
/// default to `config true`. `module` is only needed for nodes that another
/// module augments into this tree.
///
/// # Examples
///
/// ```
/// use yang_data_core::{SchemaNode, SchemaNodeDef, SchemaNodeKind};
///
/// let users = SchemaNodeDef::list("user", ["name"])
///     .with_child(SchemaNodeDef::leaf("name", "string"))
///     .with_child(SchemaNodeDef::leaf_list("group", "string"));
///
/// assert_eq!(users.kind(), SchemaNodeKind::List);
/// assert_eq!(users.key_names(), ["name".to_string()]);
/// assert_eq!(users.child_nodes().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNodeDef {
    pub name: String,
    pub kind: SchemaNodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    /// Type names; more than one entry models a union.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SchemaNodeDef>,

    #[serde(skip)]
    effective_module: String,
    #[serde(skip)]
    effective_namespace: String,
    #[serde(skip)]
    effective_config: bool,
}

impl SchemaNodeDef {
    pub fn new(name: impl Into<String>, kind: SchemaNodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            keys: Vec::new(),
            config: None,
            types: Vec::new(),
            module: None,
            children: Vec::new(),
            effective_module: String::new(),
            effective_namespace: String::new(),
            effective_config: true,
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, SchemaNodeKind::Container)
    }

    pub fn list<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::new(name, SchemaNodeKind::List)
        }
    }

    pub fn leaf(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            types: vec![type_name.into()],
            ..Self::new(name, SchemaNodeKind::Leaf)
        }
    }

    pub fn leaf_list(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            types: vec![type_name.into()],
            ..Self::new(name, SchemaNodeKind::LeafList)
        }
    }

    pub fn anydata(name: impl Into<String>) -> Self {
        Self::new(name, SchemaNodeKind::AnyData)
    }

    pub fn anyxml(name: impl Into<String>) -> Self {
        Self::new(name, SchemaNodeKind::AnyXml)
    }

    pub fn choice(name: impl Into<String>) -> Self {
        Self::new(name, SchemaNodeKind::Choice)
    }

    pub fn case(name: impl Into<String>) -> Self {
        Self::new(name, SchemaNodeKind::Case)
    }

    pub fn with_child(mut self, child: SchemaNodeDef) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a member type, turning the type into a union.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn config(mut self, config: bool) -> Self {
        self.config = Some(config);
        self
    }

    /// Marks the node as owned by another module, as for augmented nodes.
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    fn resolve(
        &mut self,
        modules: &[(String, String)],
        module: &str,
        parent_config: bool,
    ) -> Result<()> {
        let module = self.module.as_deref().unwrap_or(module).to_string();
        let namespace = modules
            .iter()
            .find(|(name, _)| *name == module)
            .map(|(_, ns)| ns.clone())
            .ok_or_else(|| CoreError::UnknownModule(module.clone()))?;

        self.effective_config = self.config.unwrap_or(parent_config);
        for child in &mut self.children {
            child.resolve(modules, &module, self.effective_config)?;
        }
        self.effective_module = module;
        self.effective_namespace = namespace;
        Ok(())
    }
}

impl SchemaNode for SchemaNodeDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SchemaNodeKind {
        self.kind
    }

    fn effective_namespace(&self) -> &str {
        &self.effective_namespace
    }

    fn module_name(&self) -> &str {
        &self.effective_module
    }

    fn key_names(&self) -> &[String] {
        &self.keys
    }

    fn is_effective_config(&self) -> bool {
        self.effective_config
    }

    fn accepts_empty(&self) -> bool {
        self.types.iter().any(|t| t == "empty")
    }

    fn child_nodes(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

/// One schema module and its top-level data nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSchema {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub nodes: Vec<SchemaNodeDef>,
}

impl ModuleSchema {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, node: SchemaNodeDef) -> Self {
        self.nodes.push(node);
        self
    }
}

/// A resolved set of modules implementing [`DataSchema`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    modules: Vec<ModuleSchema>,
}

impl SchemaModel {
    /// Builds a model and resolves every node's effective module, namespace
    /// and config flag.
    pub fn new(modules: Vec<ModuleSchema>) -> Result<Self> {
        Self { modules }.resolved()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let model: SchemaModel = serde_yaml::from_str(yaml)?;
        model.resolved()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: SchemaModel = serde_json::from_str(json)?;
        model.resolved()
    }

    /// Loads a model from a `.json` file, or from YAML for any other extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let model: SchemaModel = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        model.resolved()
    }

    pub fn modules(&self) -> &[ModuleSchema] {
        &self.modules
    }

    fn resolved(mut self) -> Result<Self> {
        let names: Vec<(String, String)> = self
            .modules
            .iter()
            .map(|m| (m.name.clone(), m.namespace.clone()))
            .collect();
        for module in &mut self.modules {
            for node in &mut module.nodes {
                node.resolve(&names, &module.name, true)?;
            }
        }
        Ok(self)
    }
}

impl DataSchema for SchemaModel {
    type Node = SchemaNodeDef;

    fn top_level_nodes(&self) -> Vec<&SchemaNodeDef> {
        self.modules.iter().flat_map(|m| m.nodes.iter()).collect()
    }

    fn namespace_for_module(&self, module: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|m| m.name == module)
            .map(|m| m.namespace.as_str())
    }

    fn module_for_namespace(&self, namespace: &str) -> Option<&str> {
        self.modules
            .iter()
            .find(|m| m.namespace == namespace)
            .map(|m| m.name.as_str())
    }
}
