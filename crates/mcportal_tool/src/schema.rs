//! Parameter schemas.
//!
//! Schemas are declarative. They document what a tool reads from its
//! parameters; dispatch never rejects a request because of them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// JSON type hint for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string
    String,
    /// JSON number
    Number,
    /// Integral JSON number
    Integer,
    /// JSON boolean
    Boolean,
    /// JSON object
    Object,
    /// JSON array
    Array,
}

impl ParamType {
    /// Name used in JSON Schema
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Whether `value` has this type
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

/// Descriptor for one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Type hint
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Human-readable description
    pub description: String,
    /// Allowed values, if the parameter is an enumeration
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParameterSpec {
    /// Create a new parameter descriptor
    #[must_use]
    pub fn new(param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            allowed: None,
        }
    }

    /// Shorthand for a string parameter
    #[must_use]
    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParamType::String, description)
    }

    /// Restrict to an enumeration of values
    #[must_use]
    pub fn with_allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Whether `value` fits the type hint and enumeration
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        if !self.param_type.matches(value) {
            return false;
        }
        match (&self.allowed, value.as_str()) {
            (Some(allowed), Some(s)) => allowed.iter().any(|a| a == s),
            _ => true,
        }
    }
}

/// Parameter name to descriptor, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    params: IndexMap<String, ParameterSpec>,
}

impl ParameterSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    /// Look up a parameter descriptor
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.get(name)
    }

    /// Iterate over parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterSpec)> {
        self.params.iter()
    }

    /// Number of declared parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Names of supplied parameters that do not fit their descriptor.
    /// Undeclared and absent parameters are not reported.
    #[must_use]
    pub fn mismatches(&self, supplied: &Map<String, Value>) -> Vec<String> {
        self.params
            .iter()
            .filter(|(name, spec)| {
                supplied
                    .get(name.as_str())
                    .is_some_and(|value| !value.is_null() && !spec.accepts(value))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Render as a JSON Schema object
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, spec)| {
                let mut prop = json!({
                    "type": spec.param_type.as_str(),
                    "description": spec.description,
                });
                if let Some(allowed) = &spec.allowed {
                    prop["enum"] = json!(allowed);
                }
                (name.clone(), prop)
            })
            .collect();
        json!({
            "type": "object",
            "properties": properties,
        })
    }
}
