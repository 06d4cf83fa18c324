//! # Version Detection and Migration
//!
//! Documents written by older builds carry older schema versions. This
//! module detects a raw document's version, holds a registry of single-step
//! migrations, and composes the unique upgrade path to a target version.
//!
//! ## Version history
//!
//! | Version | Introduced |
//! |---------|------------|
//! | `0.0.1` | Original format: `frames` key, no document identity |
//! | `0.0.2` | Document `id`/`name`, `artboards` key |
//! | `0.1.0` | Current: normalized node defaults |
//!
//! Migrations are pure functions over raw JSON values: the input is never
//! mutated, each step produces a new value, and structural sanity is checked
//! after every step. A migration may allocate identifiers when it introduces
//! a newly required entity (the `0.0.2` document id), but it never rewrites
//! the identifier of anything that already exists.

use crate::error::SchemaError;
use crate::ident::NodeId;
use crate::model::{Document, CURRENT_SCHEMA_VERSION};
use serde_json::{json, Value};

/// Versions this build can read, oldest first.
pub const SUPPORTED_VERSIONS: &[&str] = &["0.0.1", "0.0.2", "0.1.0"];

/// One single-step migration in the registry.
struct Migration {
    from: &'static str,
    to: &'static str,
    apply: fn(&Value) -> Result<Value, SchemaError>,
}

/// The ordered migration chain. Each entry's `to` is the next entry's `from`.
const REGISTRY: &[Migration] = &[
    Migration {
        from: "0.0.1",
        to: "0.0.2",
        apply: migrate_001_to_002,
    },
    Migration {
        from: "0.0.2",
        to: "0.1.0",
        apply: migrate_002_to_010,
    },
];

/// Compatibility report for a raw document, produced without mutating it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatReport {
    /// Detected version, if any.
    pub version: Option<String>,
    /// Whether the detected version is one this build knows.
    pub is_supported: bool,
    /// Whether the document is already at the current version.
    pub is_current: bool,
    /// Whether a migration is required to load the document.
    pub needs_migration: bool,
    /// Whether a migration path to the current version exists.
    pub can_migrate: bool,
    /// The version chain a migration would walk, including both endpoints.
    pub path: Vec<String>,
    /// Non-fatal observations (inferred version, legacy keys).
    pub warnings: Vec<String>,
}

/// Detect a raw document's version.
///
/// Checks, in order: an explicit `version` field, the legacy
/// `schemaVersion` field, then structural inference (a `frames` or
/// `artboards` array marks the earliest supported format).
#[must_use]
pub fn detect_version(value: &Value) -> Option<String> {
    if let Some(version) = value.get("version").and_then(Value::as_str) {
        return Some(version.to_string());
    }
    if let Some(version) = value.get("schemaVersion").and_then(Value::as_str) {
        return Some(version.to_string());
    }
    if value.get("frames").map_or(false, Value::is_array)
        || value.get("artboards").map_or(false, Value::is_array)
    {
        return Some("0.0.1".to_string());
    }
    None
}

/// Report whether and how a raw document can be brought to the current
/// version. Never mutates the input.
#[must_use]
pub fn check_compatibility(value: &Value) -> CompatReport {
    let version = detect_version(value);
    let mut warnings = Vec::new();

    if version.is_some()
        && value.get("version").is_none()
        && value.get("schemaVersion").is_none()
    {
        warnings.push("version inferred from document structure".to_string());
    }
    if value.get("frames").map_or(false, Value::is_array) {
        warnings.push("legacy \"frames\" key will be renamed to \"artboards\"".to_string());
    }

    let Some(version) = version else {
        return CompatReport {
            version: None,
            is_supported: false,
            is_current: false,
            needs_migration: false,
            can_migrate: false,
            path: Vec::new(),
            warnings,
        };
    };

    let is_supported = SUPPORTED_VERSIONS.contains(&version.as_str());
    let is_current = version == CURRENT_SCHEMA_VERSION;
    let path = migration_path(&version, CURRENT_SCHEMA_VERSION);

    CompatReport {
        is_supported,
        is_current,
        needs_migration: !is_current,
        can_migrate: is_current || path.is_some(),
        path: path
            .map(|steps| {
                let mut chain = vec![version.clone()];
                chain.extend(steps.iter().map(|m| m.to.to_string()));
                chain
            })
            .unwrap_or_default(),
        version: Some(version),
        warnings,
    }
}

/// Migrate a raw document to `target`, validating at each step.
///
/// The input is unmodified; the migrated value is returned. When `target`
/// is the current version the result also passes full validation.
///
/// # Errors
///
/// [`SchemaError::UnknownVersion`] when no version can be detected,
/// [`SchemaError::NoMigrationPath`] when the registry has no chain, and
/// [`SchemaError::Invalid`] when a step produces a structurally broken
/// document.
pub fn migrate(value: &Value, target: &str) -> Result<Value, SchemaError> {
    let version = detect_version(value).ok_or(SchemaError::UnknownVersion { version: None })?;

    if version == target {
        return Ok(value.clone());
    }

    let steps = migration_path(&version, target).ok_or_else(|| SchemaError::NoMigrationPath {
        from: version.clone(),
        to: target.to_string(),
    })?;

    let mut current = value.clone();
    for step in steps {
        current = (step.apply)(&current)?;
        check_step_shape(&current, step.to)?;
    }

    if target == CURRENT_SCHEMA_VERSION {
        // The final form must satisfy the full validator, not just shape checks.
        let doc: Document = serde_json::from_value(current.clone())?;
        crate::validate::validate(&doc)?;
    }
    Ok(current)
}

/// Migrate a raw document to the current version and parse it.
///
/// # Errors
///
/// As [`migrate`].
pub fn migrate_to_current(value: &Value) -> Result<Document, SchemaError> {
    let migrated = migrate(value, CURRENT_SCHEMA_VERSION)?;
    Ok(serde_json::from_value(migrated)?)
}

/// Walk the registry chain from `from` to `to`. The chain is linear, so the
/// path, when it exists, is unique.
fn migration_path(from: &str, to: &str) -> Option<Vec<&'static Migration>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut path = Vec::new();
    let mut cursor = from;
    while cursor != to {
        let step = REGISTRY.iter().find(|m| m.from == cursor)?;
        path.push(step);
        cursor = step.to;
    }
    Some(path)
}

/// Cheap structural sanity check between steps: the value must still be an
/// object with an artboard (or legacy frame) array.
fn check_step_shape(value: &Value, version: &str) -> Result<(), SchemaError> {
    let ok = value.is_object()
        && (value.get("artboards").map_or(false, Value::is_array)
            || value.get("frames").map_or(false, Value::is_array));
    if ok {
        Ok(())
    } else {
        Err(SchemaError::Invalid {
            violations: vec![crate::error::Violation {
                pointer: String::new(),
                message: format!("migration to {version} produced a document with no artboards"),
            }],
        })
    }
}

/// `0.0.1 → 0.0.2`: lift the legacy `frames` key to `artboards` and give
/// the document an identity. The allocated id is the one place migration is
/// allowed to mint an identifier: the document entity is newly required.
fn migrate_001_to_002(value: &Value) -> Result<Value, SchemaError> {
    let mut next = value.clone();
    let Some(doc) = next.as_object_mut() else {
        return Err(SchemaError::UnknownVersion { version: None });
    };

    if let Some(frames) = doc.remove("frames") {
        doc.entry("artboards").or_insert(frames);
    }
    if !doc.contains_key("id") {
        doc.insert("id".to_string(), json!(NodeId::generate().to_string()));
    }
    if !doc.contains_key("name") {
        doc.insert("name".to_string(), json!("Untitled"));
    }
    doc.insert("schemaVersion".to_string(), json!("0.0.2"));
    doc.remove("version");
    Ok(next)
}

/// `0.0.2 → 0.1.0`: normalize node defaults (container children, component
/// props, text content) so the strict current-version parser accepts the
/// document, then stamp the current version.
fn migrate_002_to_010(value: &Value) -> Result<Value, SchemaError> {
    let mut next = value.clone();
    let Some(doc) = next.as_object_mut() else {
        return Err(SchemaError::UnknownVersion { version: None });
    };

    if let Some(artboards) = doc.get_mut("artboards").and_then(Value::as_array_mut) {
        for artboard in artboards {
            if let Some(ab) = artboard.as_object_mut() {
                ab.entry("children").or_insert_with(|| json!([]));
                if let Some(children) = ab.get_mut("children") {
                    normalize_nodes(children, 0);
                }
            }
        }
    }
    doc.insert("schemaVersion".to_string(), json!(CURRENT_SCHEMA_VERSION));
    Ok(next)
}

fn normalize_nodes(children: &mut Value, depth: usize) {
    // Matches the repair bound; deeper trees fail validation anyway.
    if depth > 64 {
        return;
    }
    let Some(items) = children.as_array_mut() else {
        return;
    };
    for item in items {
        let Some(node) = item.as_object_mut() else {
            continue;
        };
        match node.get("type").and_then(Value::as_str) {
            Some("frame") => {
                node.entry("children").or_insert_with(|| json!([]));
                if let Some(grandchildren) = node.get_mut("children") {
                    normalize_nodes(grandchildren, depth + 1);
                }
            }
            Some("text") => {
                node.entry("text").or_insert_with(|| json!(""));
            }
            Some("component") => {
                node.entry("props").or_insert_with(|| json!({}));
            }
            _ => {}
        }
    }
}
