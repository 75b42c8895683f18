//! Generator input and derived properties.
//!
//! A [`Properties`] value is a string-keyed, ordered map whose values are
//! scalars, nested maps, or ordered sequences of maps. It deserializes from
//! any self-describing format (JSON, TOML) without a schema; typed access
//! goes through the `require_*` / `optional_*` accessors, which never coerce.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Properties>),
    Map(Properties),
}

impl PropertyValue {
    /// Human-readable shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_))
    }

    /// String form of a non-null scalar.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Properties> for PropertyValue {
    fn from(value: Properties) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<Properties>> for PropertyValue {
    fn from(value: Vec<Properties>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered property map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// `true` when `key` is present with a non-null value.
    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn require_str(&self, key: &str) -> Result<&str, DomainError> {
        self.optional_str(key)?
            .ok_or_else(|| DomainError::MissingProperty { key: key.into() })
    }

    /// `Ok(None)` when absent or null; a non-string value is an error.
    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, DomainError> {
        match self.0.get(key) {
            None | Some(PropertyValue::Null) => Ok(None),
            Some(PropertyValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(shape_error(key, "a string", other)),
        }
    }

    pub fn require_map(&self, key: &str) -> Result<&Properties, DomainError> {
        self.optional_map(key)?
            .ok_or_else(|| DomainError::MissingProperty { key: key.into() })
    }

    pub fn optional_map(&self, key: &str) -> Result<Option<&Properties>, DomainError> {
        match self.0.get(key) {
            None | Some(PropertyValue::Null) => Ok(None),
            Some(PropertyValue::Map(m)) => Ok(Some(m)),
            Some(other) => Err(shape_error(key, "a map", other)),
        }
    }

    pub fn require_list(&self, key: &str) -> Result<&[Properties], DomainError> {
        match self.0.get(key) {
            None | Some(PropertyValue::Null) => Err(DomainError::MissingProperty { key: key.into() }),
            Some(PropertyValue::List(items)) => Ok(items),
            Some(other) => Err(shape_error(key, "a list", other)),
        }
    }

    /// Copy `keys` from `source` when they are set there; absent keys stay absent.
    pub fn forward_from(&mut self, source: &Properties, keys: &[&str]) {
        for key in keys {
            if let Some(value) = source.get(key).filter(|v| !v.is_null()) {
                self.0.insert((*key).to_string(), value.clone());
            }
        }
    }
}

impl FromIterator<(String, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.keys().collect();
        write!(f, "{{{}}}", keys.join(", "))
    }
}

fn shape_error(key: &str, expected: &str, found: &PropertyValue) -> DomainError {
    DomainError::InvalidPropertyShape {
        key: key.into(),
        expected: expected.into(),
        found: found.shape().into(),
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Expected shape of a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
    String,
    Scalar,
    Map,
    List,
    Any,
}

impl PropertyShape {
    fn accepts(self, value: &PropertyValue) -> bool {
        match self {
            Self::String => matches!(value, PropertyValue::String(_)),
            Self::Scalar => value.is_scalar(),
            Self::Map => matches!(value, PropertyValue::Map(_)),
            Self::List => matches!(value, PropertyValue::List(_)),
            Self::Any => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Scalar => "a scalar",
            Self::Map => "a map",
            Self::List => "a list",
            Self::Any => "any value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub key: String,
    pub shape: PropertyShape,
    pub required: bool,
}

/// Accepted properties of one generator, checked at the invocation boundary.
///
/// Keys are validated in declaration order, so the first missing required
/// key is the one reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySchema {
    specs: Vec<PropertySpec>,
    allow_unknown: bool,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: impl Into<String>, shape: PropertyShape) -> Self {
        self.specs.push(PropertySpec {
            key: key.into(),
            shape,
            required: true,
        });
        self
    }

    pub fn optional(mut self, key: impl Into<String>, shape: PropertyShape) -> Self {
        self.specs.push(PropertySpec {
            key: key.into(),
            shape,
            required: false,
        });
        self
    }

    /// Accept keys that are not declared.
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn specs(&self) -> &[PropertySpec] {
        &self.specs
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(|s| s.required)
            .map(|s| s.key.as_str())
    }

    pub fn validate(&self, props: &Properties) -> Result<(), DomainError> {
        for spec in &self.specs {
            match props.get(&spec.key) {
                None | Some(PropertyValue::Null) if spec.required => {
                    return Err(DomainError::MissingProperty {
                        key: spec.key.clone(),
                    });
                }
                None | Some(PropertyValue::Null) => {}
                Some(value) if !spec.shape.accepts(value) => {
                    return Err(shape_error(&spec.key, spec.shape.describe(), value));
                }
                Some(_) => {}
            }
        }

        if !self.allow_unknown {
            if let Some(unknown) = props
                .keys()
                .find(|key| !self.specs.iter().any(|s| s.key == *key))
            {
                return Err(DomainError::UnknownProperty {
                    key: unknown.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nested_json() {
        let props: Properties = serde_json::from_str(
            r#"{
                "application": "shop",
                "subFolderName": null,
                "replicas": 2,
                "maven": { "groupId": "io.shop", "version": "1.0" },
                "env": [ { "name": "PORT", "value": "8080" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(props.require_str("application").unwrap(), "shop");
        assert_eq!(props.optional_str("subFolderName").unwrap(), None);
        assert_eq!(props.get("replicas"), Some(&PropertyValue::Integer(2)));
        assert_eq!(
            props.require_map("maven").unwrap().require_str("groupId").unwrap(),
            "io.shop"
        );
        assert_eq!(props.require_list("env").unwrap().len(), 1);
    }

    #[test]
    fn deserializes_toml_tables() {
        let props: Properties = toml::from_str(
            r#"
application = "shop"
[maven]
groupId = "io.shop"
"#,
        )
        .unwrap();

        assert!(props.is_set("application"));
        assert!(props.optional_map("maven").unwrap().is_some());
    }

    #[test]
    fn accessors_do_not_coerce() {
        let props = Properties::new().with("port", 8080i64);

        assert_eq!(
            props.require_str("port"),
            Err(DomainError::InvalidPropertyShape {
                key: "port".into(),
                expected: "a string".into(),
                found: "an integer".into(),
            })
        );
        assert_eq!(
            props.require_str("missing"),
            Err(DomainError::MissingProperty {
                key: "missing".into()
            })
        );
    }

    #[test]
    fn forward_copies_only_present_keys() {
        let source = Properties::new()
            .with("maven", Properties::new().with("groupId", "g"))
            .with("env", PropertyValue::Null);
        let mut derived = Properties::new().with("serviceName", "shop");

        derived.forward_from(&source, &["maven", "env", "nodejs"]);

        assert!(derived.is_set("maven"));
        assert!(derived.get("env").is_none());
        assert!(derived.get("nodejs").is_none());
        assert_eq!(derived.len(), 2);
    }

    #[test]
    fn schema_reports_first_missing_key_in_order() {
        let schema = PropertySchema::new()
            .required("application", PropertyShape::String)
            .required("runtime", PropertyShape::String);

        let err = schema.validate(&Properties::new()).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingProperty {
                key: "application".into()
            }
        );
    }

    #[test]
    fn schema_treats_null_required_as_missing() {
        let schema = PropertySchema::new().required("application", PropertyShape::String);
        let props = Properties::new().with("application", PropertyValue::Null);

        assert!(matches!(
            schema.validate(&props),
            Err(DomainError::MissingProperty { .. })
        ));
    }

    #[test]
    fn schema_rejects_wrong_shape_and_unknown_keys() {
        let schema = PropertySchema::new()
            .required("application", PropertyShape::String)
            .optional("maven", PropertyShape::Map);

        let wrong = Properties::new()
            .with("application", "shop")
            .with("maven", "not-a-map");
        assert!(matches!(
            schema.validate(&wrong),
            Err(DomainError::InvalidPropertyShape { .. })
        ));

        let unknown = Properties::new()
            .with("application", "shop")
            .with("typo", "x");
        assert_eq!(
            schema.validate(&unknown),
            Err(DomainError::UnknownProperty { key: "typo".into() })
        );

        assert!(schema.clone().allow_unknown(true).validate(&unknown).is_ok());
    }
}
