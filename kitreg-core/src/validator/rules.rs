//! Registry-specific validation rules
//!
//! These refinements go beyond what the schema declares: the repo URL must
//! point at the accepted hosting domain, the slug must be kebab-case, the
//! stack must name at least one language, requirements keys come from a fixed
//! allow-list, and the type must mirror the containing directory.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{KitDocument, KitRule, Severity, ValidationIssue};
use crate::registry;

/// Hosting domain accepted for kit repositories
pub const ACCEPTED_REPO_HOST: &str = "github.com";

/// Keys permitted in the optional `requirements` object
pub const ALLOWED_REQUIREMENT_KEYS: &[&str] = &[
    "node", "python", "rust", "go", "java", "dotnet", "ruby", "php", "docker", "memory", "disk",
    "os",
];

/// Kebab-case slug pattern
pub static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// YYYY-MM-DD date pattern (calendar validity is checked separately)
pub static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

fn error(doc: &KitDocument, rule_id: &'static str, message: String) -> ValidationIssue {
    ValidationIssue {
        severity: Severity::Error,
        rule_id,
        path: doc.path.clone(),
        message,
    }
}

fn warning(doc: &KitDocument, rule_id: &'static str, message: String) -> ValidationIssue {
    ValidationIssue {
        severity: Severity::Warning,
        rule_id,
        path: doc.path.clone(),
        message,
    }
}

/// Rule: repo must be an https URL on the accepted hosting domain
pub struct RepoUrlRule;

impl KitRule for RepoUrlRule {
    fn rule_id(&self) -> &'static str {
        "repo-url"
    }

    fn description(&self) -> &'static str {
        "Repository URL must be an https GitHub URL"
    }

    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue> {
        // Presence and type are the schema's concern
        let Some(repo) = doc.str_field("repo") else {
            return Vec::new();
        };

        let accepted = url::Url::parse(repo)
            .map(|u| {
                u.scheme() == "https"
                    && u.host_str().is_some_and(|h| h.contains(ACCEPTED_REPO_HOST))
            })
            .unwrap_or(false);

        if accepted {
            Vec::new()
        } else {
            vec![error(
                doc,
                self.rule_id(),
                format!("repo '{repo}' must be a valid GitHub URL (https://{ACCEPTED_REPO_HOST}/...)"),
            )]
        }
    }
}

/// Rule: slug must be kebab-case
pub struct SlugFormatRule;

impl KitRule for SlugFormatRule {
    fn rule_id(&self) -> &'static str {
        "slug-format"
    }

    fn description(&self) -> &'static str {
        "Slug must be kebab-case (lowercase alphanumeric with hyphens)"
    }

    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue> {
        let Some(slug) = doc.str_field("slug") else {
            return Vec::new();
        };

        if SLUG_PATTERN.is_match(slug) {
            Vec::new()
        } else {
            vec![error(
                doc,
                self.rule_id(),
                format!("slug '{slug}' must be kebab-case (e.g., 'my-starter-kit')"),
            )]
        }
    }
}

/// Rule: stack.language must be a non-empty array
pub struct StackLanguageRule;

impl KitRule for StackLanguageRule {
    fn rule_id(&self) -> &'static str {
        "stack-language"
    }

    fn description(&self) -> &'static str {
        "Stack must declare at least one language"
    }

    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue> {
        let Some(stack) = doc.value.get("stack").and_then(Value::as_object) else {
            return Vec::new();
        };

        let ok = stack
            .get("language")
            .and_then(Value::as_array)
            .is_some_and(|langs| !langs.is_empty());

        if ok {
            Vec::new()
        } else {
            vec![error(
                doc,
                self.rule_id(),
                "stack.language must be a non-empty array".to_string(),
            )]
        }
    }
}

/// Rule: requirements keys must come from the allow-list (warning only)
pub struct RequirementsKeysRule;

impl KitRule for RequirementsKeysRule {
    fn rule_id(&self) -> &'static str {
        "requirements-keys"
    }

    fn description(&self) -> &'static str {
        "Requirements keys should come from the allowed set"
    }

    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue> {
        let Some(requirements) = doc.value.get("requirements").and_then(Value::as_object) else {
            return Vec::new();
        };

        requirements
            .keys()
            .filter(|key| !ALLOWED_REQUIREMENT_KEYS.contains(&key.as_str()))
            .map(|key| {
                warning(
                    doc,
                    self.rule_id(),
                    format!(
                        "unknown requirements key '{key}' (allowed: {})",
                        ALLOWED_REQUIREMENT_KEYS.join(", ")
                    ),
                )
            })
            .collect()
    }
}

/// Rule: type must equal the name of the containing directory
pub struct TypeDirectoryRule;

impl KitRule for TypeDirectoryRule {
    fn rule_id(&self) -> &'static str {
        "type-directory"
    }

    fn description(&self) -> &'static str {
        "Kit type must match the containing directory name"
    }

    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue> {
        let Some(kind) = doc.str_field("type") else {
            return Vec::new();
        };

        let Some(dir) = registry::parent_dir_name(&doc.path) else {
            return Vec::new();
        };

        if kind == dir {
            Vec::new()
        } else {
            vec![error(
                doc,
                self.rule_id(),
                format!("type '{kind}' does not match containing directory '{dir}'"),
            )]
        }
    }
}
