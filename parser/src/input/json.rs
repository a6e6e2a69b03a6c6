//! Parsed JSON value trees with member positions.

use serde_json::{Number, Value};

use crate::error::Result;

/// A JSON scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPrimitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonKind {
    /// Members in document order.
    Object(Vec<JsonMember>),
    Array(Vec<JsonValue>),
    Primitive(JsonPrimitive),
}

/// A JSON value and the position it starts at (0 when unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue {
    pub kind: JsonKind,
    pub line: usize,
    pub column: usize,
}

/// A named member of a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMember {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub value: JsonValue,
}

impl JsonValue {
    pub fn new(kind: JsonKind) -> Self {
        Self {
            kind,
            line: 0,
            column: 0,
        }
    }

    pub fn object(members: Vec<JsonMember>) -> Self {
        Self::new(JsonKind::Object(members))
    }

    pub fn array(elements: Vec<JsonValue>) -> Self {
        Self::new(JsonKind::Array(elements))
    }

    pub fn null() -> Self {
        Self::new(JsonKind::Primitive(JsonPrimitive::Null))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(JsonKind::Primitive(JsonPrimitive::String(value.into())))
    }

    pub fn bool(value: bool) -> Self {
        Self::new(JsonKind::Primitive(JsonPrimitive::Bool(value)))
    }

    pub fn number(value: impl Into<Number>) -> Self {
        Self::new(JsonKind::Primitive(JsonPrimitive::Number(value.into())))
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Parses JSON text. Positions are not tracked and stay 0.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from(&value))
    }

    pub fn as_object(&self) -> Option<&[JsonMember]> {
        match &self.kind {
            JsonKind::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match &self.kind {
            JsonKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&JsonPrimitive> {
        match &self.kind {
            JsonKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, JsonKind::Primitive(JsonPrimitive::Null))
    }

    /// The `[null]` encoding of the `empty` type.
    pub fn is_empty_marker(&self) -> bool {
        matches!(
            &self.kind,
            JsonKind::Array(elements) if elements.len() == 1 && elements[0].is_null()
        )
    }
}

impl JsonMember {
    pub fn new(name: impl Into<String>, value: JsonValue) -> Self {
        Self {
            name: name.into(),
            line: value.line,
            column: value.column,
            value,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsonValue::null(),
            Value::Bool(b) => JsonValue::bool(*b),
            Value::Number(n) => JsonValue::number(n.clone()),
            Value::String(s) => JsonValue::string(s.clone()),
            Value::Array(elements) => {
                JsonValue::array(elements.iter().map(JsonValue::from).collect())
            }
            Value::Object(map) => JsonValue::object(
                map.iter()
                    .map(|(name, v)| JsonMember::new(name.clone(), JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}
