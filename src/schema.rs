//! Response shape checks against a static JSON Schema document.
//!
//! Only the keywords the player schema uses are understood: `type` (a name or
//! a list of names), `required`, `properties` and `items`. Other keywords are
//! accepted and ignored, and undeclared properties are always allowed.

use std::{collections::BTreeMap, fmt};

use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::Value;

use crate::util::json_type_name;

pub const PLAYER_RESPONSE_SCHEMA: &str = include_str!("../resources/player-response-schema.json");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TypeSet {
    One(String),
    Any(Vec<String>),
}

impl TypeSet {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeSet::One(name) => type_matches(name, value),
            TypeSet::Any(names) => names.iter().any(|name| type_matches(name, value)),
        }
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSet::One(name) => f.write_str(name),
            TypeSet::Any(names) => f.write_str(&names.join(" | ")),
        }
    }
}

fn type_matches(name: &str, value: &Value) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        // Draft-07: a number with a zero fractional part is an integer.
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        "number" => value.is_number(),
        "string" => value.is_string(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct JsonSchema {
    #[serde(rename = "type", default)]
    kind: Option<TypeSet>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, JsonSchema>,
    #[serde(default)]
    items: Option<Box<JsonSchema>>,
}

/// A single mismatch, located by a JSON-pointer-like path (`$` is the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub violations: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

impl JsonSchema {
    pub fn parse(document: &str) -> serde_json::Result<Self> {
        serde_json::from_str(document)
    }

    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        let mut violations = Vec::new();
        self.check(value, "$", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { violations })
        }
    }

    /// Parses `body` as JSON first; a non-JSON body is a single violation.
    pub fn validate_str(&self, body: &str) -> Result<(), SchemaError> {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => self.validate(&value),
            Err(err) => Err(SchemaError {
                violations: vec![SchemaViolation {
                    path: "$".to_string(),
                    message: format!("body is not valid JSON: {err}"),
                }],
            }),
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
        if let Some(kind) = &self.kind {
            if !kind.accepts(value) {
                out.push(SchemaViolation {
                    path: path.to_string(),
                    message: format!("expected {kind}, found {}", json_type_name(value)),
                });
                return;
            }
        }

        if let Value::Object(map) = value {
            for key in &self.required {
                if !map.contains_key(key) {
                    out.push(SchemaViolation {
                        path: path.to_string(),
                        message: format!("missing required property `{key}`"),
                    });
                }
            }
            for (key, schema) in &self.properties {
                if let Some(child) = map.get(key) {
                    schema.check(child, &format!("{path}.{key}"), out);
                }
            }
        }

        if let (Value::Array(elements), Some(items)) = (value, &self.items) {
            for (i, element) in elements.iter().enumerate() {
                items.check(element, &format!("{path}[{i}]"), out);
            }
        }
    }
}

static PLAYER_SCHEMA: OnceCell<JsonSchema> = OnceCell::new();

/// The bundled player-response schema, parsed on first use.
pub fn player_response_schema() -> serde_json::Result<&'static JsonSchema> {
    PLAYER_SCHEMA.get_or_try_init(|| JsonSchema::parse(PLAYER_RESPONSE_SCHEMA))
}
