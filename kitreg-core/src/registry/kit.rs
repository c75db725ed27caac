//! Kit metadata model
//!
//! `KitMetadata` is the full typed model of one kit document, used by the
//! index generator. `KitSummary` is the reduced projection published in the
//! registry index; stack detail is intentionally excluded from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Technology stack for a kit.
///
/// `language` is the only dimension the schema requires; the rest default to
/// empty lists when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default)]
    pub language: Vec<String>,

    #[serde(default)]
    pub frontend: Vec<String>,

    #[serde(default)]
    pub backend: Vec<String>,

    #[serde(default)]
    pub database: Vec<String>,

    #[serde(default)]
    pub infrastructure: Vec<String>,
}

/// Full metadata for one starter kit (one JSON document).
///
/// Fields the index does not strictly need carry defaults so a document that
/// passes the index's required-field check still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitMetadata {
    /// Display name
    pub name: String,

    /// Unique kebab-case identifier
    pub slug: String,

    /// Source repository URL
    pub repo: String,

    /// Kit category, mirrored by the containing directory name
    #[serde(rename = "type")]
    pub kind: String,

    /// Technology stack
    #[serde(default)]
    pub stack: Stack,

    /// Feature list
    #[serde(default)]
    pub features: Vec<String>,

    /// Difficulty level (beginner | intermediate | advanced)
    pub difficulty: String,

    /// Maintenance status (experimental | active | deprecated | unmaintained)
    pub status: String,

    /// SPDX license identifier
    #[serde(default)]
    pub license: String,

    /// Maintainer handles
    pub maintainers: Vec<String>,

    /// Creation date (YYYY-MM-DD)
    #[serde(default)]
    pub created_at: String,

    /// Last update date (YYYY-MM-DD)
    pub last_updated: String,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Searchable tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Runtime requirements, keyed by a fixed allow-list
    #[serde(default)]
    pub requirements: Option<BTreeMap<String, serde_json::Value>>,
}

/// The reduced kit record published in the registry index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitSummary {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: String,
    pub description: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub status: String,
    pub maintainers: Vec<String>,
    pub last_updated: String,
}

impl KitMetadata {
    /// Project this kit to its index record.
    pub fn summary(&self) -> KitSummary {
        KitSummary {
            name: self.name.clone(),
            slug: self.slug.clone(),
            kind: self.kind.clone(),
            repo: self.repo.clone(),
            description: self.description.clone().unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            difficulty: self.difficulty.clone(),
            status: self.status.clone(),
            maintainers: self.maintainers.clone(),
            last_updated: self.last_updated.clone(),
        }
    }
}

#[cfg(test)]
mod kit_tests {
    use super::*;

    fn sample_kit_json() -> &'static str {
        r#"
{
  "name": "Acme SaaS",
  "slug": "acme-saas",
  "repo": "https://github.com/acme/acme-saas",
  "type": "saas",
  "stack": {
    "language": ["typescript"],
    "frontend": ["react"],
    "backend": ["node"],
    "database": ["postgres"]
  },
  "features": ["auth", "billing"],
  "difficulty": "intermediate",
  "status": "active",
  "license": "MIT",
  "maintainers": ["@acme"],
  "created_at": "2024-01-15",
  "last_updated": "2024-06-01",
  "tags": ["SaaS", "auth"]
}
"#
    }

    #[test]
    fn test_parse_kit() {
        let kit: KitMetadata = serde_json::from_str(sample_kit_json()).unwrap();
        assert_eq!(kit.slug, "acme-saas");
        assert_eq!(kit.kind, "saas");
        assert_eq!(kit.stack.language, vec!["typescript"]);
        assert!(kit.stack.infrastructure.is_empty());
        assert!(kit.description.is_none());
    }

    #[test]
    fn test_summary_projection() {
        let kit: KitMetadata = serde_json::from_str(sample_kit_json()).unwrap();
        let summary = kit.summary();

        assert_eq!(summary.name, "Acme SaaS");
        assert_eq!(summary.kind, "saas");
        // Absent description projects to empty string, absent tags to empty list
        assert_eq!(summary.description, "");
        assert_eq!(summary.tags, vec!["SaaS", "auth"]);

        // Stack detail is not part of the projection
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("stack").is_none());
    }
}
