//! Declarative attribute schemas and the validation run against
//! configuration before any lifecycle call.

use crate::provider::diagnostics::Diagnostics;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "element", rename_all = "lowercase")]
pub enum AttributeType {
    Int64,
    List(Box<AttributeType>),
}

impl AttributeType {
    pub fn list_of(element: AttributeType) -> Self {
        AttributeType::List(Box::new(element))
    }

    /// Check `value` against this type, returning a description of the first mismatch
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (AttributeType::Int64, Value::Number(n)) if n.is_i64() => Ok(()),
            (AttributeType::List(element), Value::Array(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    element
                        .check(item)
                        .map_err(|e| format!("element {}: {}", idx, e))?;
                }
                Ok(())
            }
            (expected, got) => Err(format!("expected {}, got {}", expected, json_kind(got))),
        }
    }
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Int64 => write!(f, "int64"),
            AttributeType::List(element) => write!(f, "list({})", element),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "int64",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub description: String,
    pub required: bool,
}

impl Attribute {
    pub fn required(ty: AttributeType) -> Self {
        Self {
            ty,
            description: String::new(),
            required: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn v0() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Validate a configuration object. Every problem becomes a
    /// "Config Error" diagnostic.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let Some(object) = config.as_object() else {
            diags.add_error(
                "Config Error",
                format!("configuration must be an object, got {}", json_kind(config)),
            );
            return diags;
        };

        for (name, attribute) in &self.attributes {
            match object.get(name) {
                None | Some(Value::Null) => {
                    if attribute.required {
                        diags.add_error(
                            "Config Error",
                            format!("missing required attribute \"{}\"", name),
                        );
                    }
                }
                Some(value) => {
                    if let Err(e) = attribute.ty.check(value) {
                        diags.add_error(
                            "Config Error",
                            format!("attribute \"{}\": {}", name, e),
                        );
                    }
                }
            }
        }

        for name in object.keys() {
            if !self.attributes.contains_key(name) {
                diags.add_error(
                    "Config Error",
                    format!("unsupported attribute \"{}\"", name),
                );
            }
        }

        diags
    }
}
