//! Kit schema loading (schema/kit.schema.json)
//!
//! The schema is loaded exactly once per run and drives the generic half of
//! validation: which top-level properties exist, which are required, and the
//! per-property constraints (type, enum, format, maxLength, minItems). A
//! missing or corrupt schema is a configuration error, never retried.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::RegistryError;

/// Property types a kit schema may declare for a top-level field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Array,
    Object,
}

impl PropertyType {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
        }
    }
}

/// Declared constraints for a single top-level property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRule {
    /// Expected JSON type
    #[serde(rename = "type")]
    pub kind: PropertyType,

    /// Allowed values for enum-constrained strings
    #[serde(default, rename = "enum")]
    pub allowed_values: Option<Vec<String>>,

    /// String format hint ("date" or "uri")
    #[serde(default)]
    pub format: Option<String>,

    /// Maximum string length in characters
    #[serde(default)]
    pub max_length: Option<usize>,

    /// Minimum number of array items
    #[serde(default)]
    pub min_items: Option<usize>,
}

/// The kit metadata schema (kit.schema.json).
///
/// Unknown schema keywords ($schema, title, additionalProperties, pattern)
/// are ignored on load; the validator enforces the closed-world property set
/// itself and the slug pattern is a registry rule.
#[derive(Debug, Clone, Deserialize)]
pub struct KitSchema {
    /// Globally required top-level fields
    #[serde(default)]
    pub required: Vec<String>,

    /// Declared top-level properties, keyed by field name
    pub properties: BTreeMap<String, PropertyRule>,
}

impl KitSchema {
    /// Load the schema from a file path.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;

        let schema = Self::from_json(&content).map_err(|source| RegistryError::SchemaParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "Loaded kit schema from {:?}: {} properties, {} required",
            path,
            schema.properties.len(),
            schema.required.len()
        );

        Ok(schema)
    }

    /// Parse the schema from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Whether a top-level property is declared by the schema.
    pub fn is_known_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Look up the declared rule for a property.
    pub fn rule(&self, name: &str) -> Option<&PropertyRule> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod schema_tests {
    use super::*;

    fn sample_schema_json() -> &'static str {
        r#"
{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Starter Kit Metadata",
  "type": "object",
  "additionalProperties": false,
  "required": ["name", "slug", "repo"],
  "properties": {
    "name": { "type": "string", "maxLength": 100 },
    "slug": { "type": "string", "pattern": "^[a-z0-9]+(-[a-z0-9]+)*$" },
    "repo": { "type": "string", "format": "uri" },
    "difficulty": { "type": "string", "enum": ["beginner", "intermediate", "advanced"] },
    "features": { "type": "array", "minItems": 1 },
    "stack": { "type": "object" }
  }
}
"#
    }

    #[test]
    fn test_parse_schema() {
        let schema = KitSchema::from_json(sample_schema_json()).unwrap();
        assert_eq!(schema.required, vec!["name", "slug", "repo"]);
        assert_eq!(schema.properties.len(), 6);
        assert!(schema.is_known_property("difficulty"));
        assert!(!schema.is_known_property("sponsor"));
    }

    #[test]
    fn test_property_constraints() {
        let schema = KitSchema::from_json(sample_schema_json()).unwrap();

        let name = schema.rule("name").unwrap();
        assert_eq!(name.kind, PropertyType::String);
        assert_eq!(name.max_length, Some(100));

        let difficulty = schema.rule("difficulty").unwrap();
        let allowed = difficulty.allowed_values.as_ref().unwrap();
        assert_eq!(allowed.len(), 3);
        assert!(allowed.contains(&"beginner".to_string()));

        let features = schema.rule("features").unwrap();
        assert_eq!(features.kind, PropertyType::Array);
        assert_eq!(features.min_items, Some(1));

        let repo = schema.rule("repo").unwrap();
        assert_eq!(repo.format.as_deref(), Some("uri"));
    }

    #[test]
    fn test_load_missing_schema() {
        let err = KitSchema::load(Path::new("/nonexistent/kit.schema.json")).unwrap_err();
        assert!(matches!(err, RegistryError::SchemaRead { .. }));
    }

    #[test]
    fn test_load_corrupt_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.schema.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = KitSchema::load(&path).unwrap_err();
        assert!(matches!(err, RegistryError::SchemaParse { .. }));
    }
}
