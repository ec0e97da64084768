//! Setter definition types as stored in OpenAPI schema documents.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::error::{Result, SchemaError};

/// Prefix of every setter key under `openAPI.definitions`.
pub const SETTER_DEFINITION_PREFIX: &str = "io.k8s.cli.setters.";

/// Extension key holding the setter body inside a definition.
pub const EXTENSION_KEY: &str = "x-k8s-cli";

/// The value carried by a setter: a single scalar or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetterValue {
    Scalar(String),
    List(Vec<String>),
}

impl SetterValue {
    /// Creates a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        SetterValue::Scalar(value.into())
    }

    /// Creates a list value.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SetterValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, SetterValue::List(_))
    }

    /// Returns a short name for the value form, used in error messages.
    pub fn form(&self) -> &'static str {
        match self {
            SetterValue::Scalar(_) => "scalar",
            SetterValue::List(_) => "list",
        }
    }
}

impl std::fmt::Display for SetterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetterValue::Scalar(value) => write!(f, "{}", value),
            SetterValue::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// OpenAPI type declared on a setter definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
}

/// A named setter definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SetterDefinition {
    /// The unique name of the setter.
    pub name: String,
    /// The current value.
    pub value: SetterValue,
    /// Human-readable description.
    pub description: String,
    /// Who last set the value.
    pub set_by: String,
    /// Whether the value was explicitly set.
    pub is_set: bool,
    /// Declared OpenAPI type, if any.
    pub schema_type: Option<SchemaType>,
    /// Allowed values, if restricted.
    pub enum_values: Vec<String>,
}

impl SetterDefinition {
    /// Creates an unset definition with the given value and no constraints.
    pub fn new(name: impl Into<String>, value: SetterValue) -> Self {
        Self {
            name: name.into(),
            value,
            description: String::new(),
            set_by: String::new(),
            is_set: false,
            schema_type: None,
            enum_values: Vec::new(),
        }
    }

    /// Returns the `openAPI.definitions` key for a setter name.
    pub fn definition_key(name: &str) -> String {
        format!("{}{}", SETTER_DEFINITION_PREFIX, name)
    }

    /// Whether this setter holds a list, by declared type or by its current value.
    pub fn expects_list(&self) -> bool {
        match self.schema_type {
            Some(t) => t == SchemaType::Array,
            None => self.value.is_list(),
        }
    }

    /// Checks a candidate value against the declared type and enum.
    pub fn validate_value(&self, value: &SetterValue) -> Result<()> {
        let expected = if self.expects_list() { "list" } else { "scalar" };
        if expected != value.form() {
            return Err(SchemaError::TypeMismatch {
                name: self.name.clone(),
                expected,
                actual: value.form(),
            });
        }

        match value {
            SetterValue::Scalar(v) => self.validate_scalar(v),
            SetterValue::List(items) => items.iter().try_for_each(|v| self.validate_enum(v)),
        }
    }

    fn validate_scalar(&self, value: &str) -> Result<()> {
        let reason = match self.schema_type {
            Some(SchemaType::Integer) if value.parse::<i64>().is_err() => {
                Some("expected an integer")
            }
            Some(SchemaType::Number) if value.parse::<f64>().is_err() => Some("expected a number"),
            Some(SchemaType::Boolean)
                if !value.eq_ignore_ascii_case("true") && !value.eq_ignore_ascii_case("false") =>
            {
                Some("expected a boolean")
            }
            _ => None,
        };

        if let Some(reason) = reason {
            return Err(SchemaError::InvalidValue {
                name: self.name.clone(),
                value: value.to_string(),
                reason: reason.to_string(),
            });
        }

        self.validate_enum(value)
    }

    fn validate_enum(&self, value: &str) -> Result<()> {
        if self.enum_values.is_empty() || self.enum_values.iter().any(|e| e == value) {
            return Ok(());
        }
        Err(SchemaError::InvalidValue {
            name: self.name.clone(),
            value: value.to_string(),
            reason: format!("must be one of [{}]", self.enum_values.join(", ")),
        })
    }

    /// Builds a definition from the YAML node stored under `key_name`.
    pub(crate) fn from_definition(key_name: &str, node: &Value) -> Result<Self> {
        let raw: RawDefinition =
            serde_yaml::from_value(node.clone()).map_err(|e| SchemaError::InvalidDefinition {
                name: key_name.to_string(),
                message: e.to_string(),
            })?;

        let setter = raw
            .extension
            .and_then(|ext| ext.setter)
            .ok_or_else(|| SchemaError::InvalidDefinition {
                name: key_name.to_string(),
                message: format!("missing {}.setter", EXTENSION_KEY),
            })?;

        if !setter.name.is_empty() && setter.name != key_name {
            return Err(SchemaError::InvalidDefinition {
                name: key_name.to_string(),
                message: format!("setter name '{}' does not match its key", setter.name),
            });
        }

        let value = match (setter.value, setter.list_values) {
            (Some(_), Some(_)) => {
                return Err(SchemaError::InvalidDefinition {
                    name: key_name.to_string(),
                    message: "value and listValues are mutually exclusive".to_string(),
                })
            }
            (_, Some(items)) => SetterValue::List(items.iter().map(scalar_to_string).collect()),
            (Some(v), None) => SetterValue::Scalar(scalar_to_string(&v)),
            (None, None) => SetterValue::Scalar(String::new()),
        };

        Ok(Self {
            name: key_name.to_string(),
            value,
            description: raw.description,
            set_by: setter.set_by,
            is_set: setter.is_set,
            schema_type: raw.schema_type,
            enum_values: raw.enum_values.iter().map(scalar_to_string).collect(),
        })
    }
}

/// Renders a YAML scalar as the string a setter carries.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    #[serde(default)]
    description: String,
    #[serde(default, rename = "type")]
    schema_type: Option<SchemaType>,
    #[serde(default, rename = "enum")]
    enum_values: Vec<Value>,
    #[serde(default, rename = "x-k8s-cli")]
    extension: Option<RawExtension>,
}

#[derive(Debug, Deserialize)]
struct RawExtension {
    #[serde(default)]
    setter: Option<RawSetter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSetter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    list_values: Option<Vec<Value>>,
    #[serde(default)]
    set_by: String,
    #[serde(default)]
    is_set: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(key: &str, yaml: &str) -> Result<SetterDefinition> {
        let node: Value = serde_yaml::from_str(yaml).unwrap();
        SetterDefinition::from_definition(key, &node)
    }

    #[test]
    fn test_parse_scalar_definition() {
        let def = parse(
            "image-tag",
            r#"
description: image tag
x-k8s-cli:
  setter:
    name: image-tag
    value: v1
    setBy: alice
"#,
        )
        .unwrap();

        assert_eq!(def.name, "image-tag");
        assert_eq!(def.value, SetterValue::scalar("v1"));
        assert_eq!(def.description, "image tag");
        assert_eq!(def.set_by, "alice");
        assert!(!def.is_set);
        assert!(def.schema_type.is_none());
    }

    #[test]
    fn test_parse_list_definition() {
        let def = parse(
            "args",
            r#"
type: array
x-k8s-cli:
  setter:
    name: args
    listValues: [a, "b", 3]
"#,
        )
        .unwrap();

        assert_eq!(def.value, SetterValue::list(["a", "b", "3"]));
        assert_eq!(def.schema_type, Some(SchemaType::Array));
        assert!(def.expects_list());
    }

    #[test]
    fn test_parse_numeric_value_as_string() {
        let def = parse(
            "replicas",
            r#"
type: integer
x-k8s-cli:
  setter:
    name: replicas
    value: 3
"#,
        )
        .unwrap();
        assert_eq!(def.value, SetterValue::scalar("3"));
    }

    #[test]
    fn test_parse_rejects_both_value_forms() {
        let result = parse(
            "bad",
            r#"
x-k8s-cli:
  setter:
    name: bad
    value: x
    listValues: [y]
"#,
        );
        assert!(matches!(result, Err(SchemaError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_extension() {
        let result = parse("bad", "description: nothing here\n");
        assert!(matches!(result, Err(SchemaError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_parse_rejects_name_mismatch() {
        let result = parse(
            "image-tag",
            r#"
x-k8s-cli:
  setter:
    name: other
    value: v1
"#,
        );
        assert!(matches!(result, Err(SchemaError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_validate_value_form() {
        let scalar = SetterDefinition::new("tag", SetterValue::scalar("v1"));
        assert!(scalar.validate_value(&SetterValue::scalar("v2")).is_ok());
        assert!(matches!(
            scalar.validate_value(&SetterValue::list(["v2"])),
            Err(SchemaError::TypeMismatch {
                expected: "scalar",
                actual: "list",
                ..
            })
        ));

        let mut declared = SetterDefinition::new("args", SetterValue::scalar(""));
        declared.schema_type = Some(SchemaType::Array);
        assert!(declared.validate_value(&SetterValue::list(["a"])).is_ok());
        assert!(declared.validate_value(&SetterValue::scalar("a")).is_err());
    }

    #[test]
    fn test_validate_typed_scalars() {
        let mut def = SetterDefinition::new("replicas", SetterValue::scalar("1"));
        def.schema_type = Some(SchemaType::Integer);
        assert!(def.validate_value(&SetterValue::scalar("5")).is_ok());
        assert!(matches!(
            def.validate_value(&SetterValue::scalar("five")),
            Err(SchemaError::InvalidValue { .. })
        ));

        def.schema_type = Some(SchemaType::Boolean);
        assert!(def.validate_value(&SetterValue::scalar("True")).is_ok());
        assert!(def.validate_value(&SetterValue::scalar("yes")).is_err());

        def.schema_type = Some(SchemaType::Number);
        assert!(def.validate_value(&SetterValue::scalar("0.5")).is_ok());
    }

    #[test]
    fn test_validate_enum() {
        let mut def = SetterDefinition::new("env", SetterValue::scalar("dev"));
        def.enum_values = vec!["dev".to_string(), "prod".to_string()];
        assert!(def.validate_value(&SetterValue::scalar("prod")).is_ok());
        assert!(def.validate_value(&SetterValue::scalar("staging")).is_err());
    }

    #[test]
    fn test_setter_value_display() {
        assert_eq!(SetterValue::scalar("v1").to_string(), "v1");
        assert_eq!(SetterValue::list(["a", "b"]).to_string(), "[a, b]");
    }
}
