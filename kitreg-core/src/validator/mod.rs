//! Kit Validator - schema-driven validation of kit metadata documents
//!
//! Every check runs for every document (no short-circuit) so contributors see
//! the full error list in one pass. The only exception is a document that
//! fails to parse: it records exactly one error and is excluded from the
//! structural checks, since there is nothing to type-check.
//!
//! Two layers of checks:
//! - a generic pass driven entirely by the loaded schema (unknown properties,
//!   required fields, types, enums, lengths, formats, item counts), and
//! - registry-specific rules (repo URL shape, slug format, stack.language,
//!   requirements allow-list, type/directory consistency) plus the stateful
//!   slug-uniqueness check owned by the driver.

use serde::Serialize;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod rules;


use crate::error::RegistryError;
use crate::registry;
use crate::schema::{KitSchema, PropertyRule, PropertyType};
use rules::*;

/// Severity levels for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the run: the document violates the registry contract
    Error,
    /// Informational: logged, never blocks
    Warning,
}

/// A validation issue found in a kit document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Severity of the issue
    pub severity: Severity,
    /// Identifier of the rule that produced it
    pub rule_id: &'static str,
    /// Document the issue belongs to
    pub path: PathBuf,
    /// Human-readable description
    pub message: String,
}

/// A parsed kit document under validation
#[derive(Debug, Clone)]
pub struct KitDocument {
    /// Original file path
    pub path: PathBuf,
    /// Parsed JSON value
    pub value: Value,
}

impl KitDocument {
    /// Fetch a top-level string field, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.value.get(name).and_then(Value::as_str)
    }
}

/// Trait for registry-specific validation rules
pub trait KitRule {
    /// Check one document for issues
    fn check(&self, doc: &KitDocument) -> Vec<ValidationIssue>;

    /// Rule identifier
    fn rule_id(&self) -> &'static str;

    /// Rule description
    fn description(&self) -> &'static str;
}

/// Aggregate result of one validation run
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub documents_checked: usize,
    pub unique_slugs: usize,
}

impl ValidationReport {
    /// A run succeeds iff it produced no errors. Warnings never block.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    fn error(&mut self, rule_id: &'static str, path: &Path, message: String) {
        self.push(ValidationIssue {
            severity: Severity::Error,
            rule_id,
            path: path.to_path_buf(),
            message,
        });
    }
}

/// Main kit validator
///
/// Holds the loaded schema, the registry rule set, and the slug map that
/// spans all documents validated in one run (slug -> first-seen path).
pub struct Validator {
    schema: KitSchema,
    rules: Vec<Box<dyn KitRule>>,
    seen_slugs: HashMap<String, PathBuf>,
}

impl Validator {
    /// Create a validator with the default registry rules.
    pub fn new(schema: KitSchema) -> Self {
        let rules: Vec<Box<dyn KitRule>> = vec![
            Box::new(RepoUrlRule),
            Box::new(SlugFormatRule),
            Box::new(StackLanguageRule),
            Box::new(RequirementsKeysRule),
            Box::new(TypeDirectoryRule),
        ];

        Self {
            schema,
            rules,
            seen_slugs: HashMap::new(),
        }
    }

    /// Validate a single document or a directory tree.
    ///
    /// A missing target or an empty directory is fatal; per-document issues
    /// never interrupt the scan of remaining documents.
    pub fn validate_path(&mut self, target: &Path) -> Result<ValidationReport, RegistryError> {
        let documents = registry::find_kit_documents(target)?;
        info!("Validating {} kit documents", documents.len());

        let mut report = ValidationReport::default();
        for path in &documents {
            self.validate_document(path, &mut report);
        }

        report.unique_slugs = self.seen_slugs.len();
        Ok(report)
    }

    fn validate_document(&mut self, path: &Path, report: &mut ValidationReport) {
        debug!("Validating kit document: {:?}", path);
        report.documents_checked += 1;

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                report.error("parse", path, format!("failed to read document: {e}"));
                return;
            }
        };

        // A parse failure is exactly one error; the document cannot be
        // structurally checked beyond it.
        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                report.error("parse", path, format!("invalid JSON: {e}"));
                return;
            }
        };

        let doc = KitDocument {
            path: path.to_path_buf(),
            value,
        };

        let Some(object) = doc.value.as_object() else {
            report.error("parse", path, "document must be a JSON object".to_string());
            return;
        };

        // Generic schema-driven pass
        for key in object.keys() {
            if !self.schema.is_known_property(key) {
                report.error("unknown-property", path, format!("unknown property '{key}'"));
            }
        }

        for field in &self.schema.required {
            if !object.contains_key(field) {
                report.error(
                    "required-field",
                    path,
                    format!("missing required field '{field}'"),
                );
            }
        }

        for (name, value) in object {
            if let Some(rule) = self.schema.rule(name) {
                check_property(name, value, rule, path, report);
            }
        }

        // Registry-specific rules
        for rule in &self.rules {
            for issue in rule.check(&doc) {
                report.push(issue);
            }
        }

        self.check_slug_unique(&doc, report);
    }

    /// Slug uniqueness spans the whole run. The duplicate is attributed to
    /// the document where the repeat occurred; the first occurrence is kept.
    fn check_slug_unique(&mut self, doc: &KitDocument, report: &mut ValidationReport) {
        let Some(slug) = doc.str_field("slug") else {
            return;
        };

        match self.seen_slugs.entry(slug.to_string()) {
            Entry::Occupied(first) => report.error(
                "slug-unique",
                &doc.path,
                format!(
                    "duplicate slug '{slug}' (first used by {})",
                    first.get().display()
                ),
            ),
            Entry::Vacant(vacant) => {
                vacant.insert(doc.path.clone());
            }
        }
    }
}

/// Evaluate one property's declared constraints against its actual value.
///
/// Refinements only run when the declared type matches: a mis-typed field
/// gets exactly one type error rather than a cascade.
fn check_property(
    name: &str,
    value: &Value,
    rule: &PropertyRule,
    path: &Path,
    report: &mut ValidationReport,
) {
    let type_matches = match rule.kind {
        PropertyType::String => value.is_string(),
        PropertyType::Array => value.is_array(),
        PropertyType::Object => value.is_object(),
    };

    if !type_matches {
        report.error(
            "type",
            path,
            format!("field '{name}' must be of type {}", rule.kind.name()),
        );
        return;
    }

    match rule.kind {
        PropertyType::String => {
            let s = value.as_str().unwrap_or_default();

            if let Some(allowed) = &rule.allowed_values {
                if !allowed.iter().any(|a| a == s) {
                    report.error(
                        "enum",
                        path,
                        format!("field '{name}' has value '{s}', expected one of {allowed:?}"),
                    );
                }
            }

            if let Some(max) = rule.max_length {
                let len = s.chars().count();
                if len > max {
                    report.error(
                        "max-length",
                        path,
                        format!("field '{name}' is {len} characters long (maximum {max})"),
                    );
                }
            }

            match rule.format.as_deref() {
                Some("date") => check_date(name, s, path, report),
                Some("uri") => check_uri(name, s, path, report),
                _ => {}
            }
        }
        PropertyType::Array => {
            let items = value.as_array().map(Vec::len).unwrap_or_default();

            // Every present array must be non-empty, even where the schema
            // declares no minItems. Registry invariant, stricter than the
            // schema itself.
            if items == 0 {
                report.error("empty-array", path, format!("field '{name}' must not be empty"));
            } else if let Some(min) = rule.min_items {
                if items < min {
                    report.error(
                        "min-items",
                        path,
                        format!("field '{name}' has {items} items (minimum {min})"),
                    );
                }
            }
        }
        PropertyType::Object => {}
    }
}

fn check_date(name: &str, s: &str, path: &Path, report: &mut ValidationReport) {
    if !DATE_PATTERN.is_match(s) {
        report.error(
            "date-format",
            path,
            format!("field '{name}' has value '{s}', expected a YYYY-MM-DD date"),
        );
        return;
    }

    // Pattern alone accepts impossible dates like 2024-13-40
    if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
        report.error(
            "date-format",
            path,
            format!("field '{name}' has value '{s}', which is not a valid calendar date"),
        );
    }
}

fn check_uri(name: &str, s: &str, path: &Path, report: &mut ValidationReport) {
    let valid = url::Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);

    if !valid {
        report.error(
            "uri-format",
            path,
            format!("field '{name}' has value '{s}', expected a valid http(s) URL"),
        );
    }
}
