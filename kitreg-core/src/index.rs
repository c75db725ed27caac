//! Index Generator - derives the aggregate registry index (index.json)
//!
//! Indexing is best-effort, in contrast with the validator's fail-on-any-error
//! posture: a parseable document missing required index fields is skipped with
//! a warning, and a duplicate slug skips the later document (first-seen wins).
//! Only an empty result or a failed write is fatal. The artifact is built
//! fully in memory and written in one shot, so a failed run never leaves a
//! partial file behind.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RegistryError;
use crate::registry::{self, KitMetadata, KitSummary};

/// Fields a document must carry to be indexed. Anything less and the
/// projection cannot be built, so the document is skipped.
pub const REQUIRED_INDEX_FIELDS: &[&str] = &[
    "name",
    "slug",
    "type",
    "repo",
    "difficulty",
    "status",
    "maintainers",
    "last_updated",
];

/// Occurrence counts per stack dimension across the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackHistogram {
    pub language: BTreeMap<String, usize>,
    pub frontend: BTreeMap<String, usize>,
    pub backend: BTreeMap<String, usize>,
    pub database: BTreeMap<String, usize>,
    pub infrastructure: BTreeMap<String, usize>,
}

/// The generated registry index (index.json).
///
/// Count maps are BTreeMaps and the tag list is sorted so repeated runs over
/// an unchanged corpus produce byte-identical output apart from `generated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryIndex {
    /// Generation date (YYYY-MM-DD)
    pub generated: String,

    /// Number of kits retained in the index
    pub total: usize,

    /// Kit counts per type
    pub categories: BTreeMap<String, usize>,

    /// Kit counts per difficulty level
    pub difficulty: BTreeMap<String, usize>,

    /// Kit counts per maintenance status
    pub status: BTreeMap<String, usize>,

    /// Tag vocabulary: case-folded, deduplicated, sorted
    pub tags: Vec<String>,

    /// Stack usage histograms
    pub stacks: StackHistogram,

    /// Reduced kit records, sorted by (type, name)
    pub kits: Vec<KitSummary>,
}

/// Scan the registry's kits tree and build the index in memory.
///
/// Fatal only when the tree is missing/empty or zero documents survive
/// filtering; all per-document problems are logged and skipped.
pub fn generate(registry_dir: &Path) -> Result<RegistryIndex, RegistryError> {
    let kits_root = registry_dir.join(registry::KITS_DIR);
    let documents = registry::find_kit_documents(&kits_root)?;

    let mut seen_slugs: HashMap<String, PathBuf> = HashMap::new();
    let mut retained: Vec<KitMetadata> = Vec::new();

    for path in &documents {
        match load_indexable(path, &mut seen_slugs) {
            Some(kit) => retained.push(kit),
            None => continue,
        }
    }

    if retained.is_empty() {
        return Err(RegistryError::NoValidDocuments(kits_root));
    }

    info!(
        "Indexing {} kits ({} documents scanned)",
        retained.len(),
        documents.len()
    );

    Ok(build_index(retained))
}

/// Load one document if it qualifies for indexing; log and skip otherwise.
fn load_indexable(path: &Path, seen_slugs: &mut HashMap<String, PathBuf>) -> Option<KitMetadata> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping {:?}: failed to read: {e}", path);
            return None;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Skipping {:?}: invalid JSON: {e}", path);
            return None;
        }
    };

    let missing: Vec<&str> = REQUIRED_INDEX_FIELDS
        .iter()
        .filter(|field| value.get(**field).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        warn!("Skipping {:?}: missing required fields: {}", path, missing.join(", "));
        return None;
    }

    let kit: KitMetadata = match serde_json::from_value(value) {
        Ok(kit) => kit,
        Err(e) => {
            warn!("Skipping {:?}: malformed metadata: {e}", path);
            return None;
        }
    };

    // First-seen wins on slug collisions
    if let Some(first) = seen_slugs.get(&kit.slug) {
        warn!(
            "Skipping {:?}: duplicate slug '{}' already indexed from {:?}",
            path, kit.slug, first
        );
        return None;
    }
    seen_slugs.insert(kit.slug.clone(), path.to_path_buf());

    Some(kit)
}

/// Aggregate the retained kits into the final index document.
fn build_index(mut kits: Vec<KitMetadata>) -> RegistryIndex {
    kits.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

    let mut categories = BTreeMap::new();
    let mut difficulty = BTreeMap::new();
    let mut status = BTreeMap::new();
    let mut tags = BTreeSet::new();
    let mut stacks = StackHistogram::default();

    for kit in &kits {
        *categories.entry(kit.kind.clone()).or_insert(0) += 1;
        *difficulty.entry(kit.difficulty.clone()).or_insert(0) += 1;
        *status.entry(kit.status.clone()).or_insert(0) += 1;

        for tag in kit.tags.iter().flatten() {
            tags.insert(tag.to_lowercase());
        }

        count_values(&mut stacks.language, &kit.stack.language);
        count_values(&mut stacks.frontend, &kit.stack.frontend);
        count_values(&mut stacks.backend, &kit.stack.backend);
        count_values(&mut stacks.database, &kit.stack.database);
        count_values(&mut stacks.infrastructure, &kit.stack.infrastructure);
    }

    RegistryIndex {
        generated: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        total: kits.len(),
        categories,
        difficulty,
        status,
        tags: tags.into_iter().collect(),
        stacks,
        kits: kits.iter().map(KitMetadata::summary).collect(),
    }
}

fn count_values(histogram: &mut BTreeMap<String, usize>, values: &[String]) {
    for value in values {
        *histogram.entry(value.clone()).or_insert(0) += 1;
    }
}

/// Write the index artifact. The document is already fully built, so a write
/// failure leaves any previous artifact untouched.
pub fn write(index: &RegistryIndex, path: &Path) -> Result<(), RegistryError> {
    let mut out = serde_json::to_string_pretty(index).map_err(RegistryError::IndexEncode)?;
    out.push('\n');

    std::fs::write(path, out).map_err(|source| RegistryError::IndexWrite {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote registry index to {:?} ({} kits)", path, index.total);
    Ok(())
}
