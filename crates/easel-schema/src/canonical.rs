//! # Canonical Serialization
//!
//! Deterministic JSON encoding for documents. Canonical form guarantees that
//! two structurally equal documents produce byte-identical output, which is
//! what makes content hashing, change detection, and merge determinism
//! testable at the byte level.
//!
//! ## Canonical form
//!
//! 1. **Object keys** are emitted in lexicographic (code-point) order at
//!    every nesting level.
//! 2. **Indentation** is two spaces, one key/value per line; empty objects
//!    and arrays render inline as `{}` / `[]`.
//! 3. A single **trailing newline** terminates the output.
//! 4. **Numbers** are written in their shortest round-trip form; floats with
//!    no fractional part collapse to integers.
//! 5. **Arrays** preserve input order; sequence order is significant
//!    throughout the document model.
//! 6. **Strings** use minimal escaping: only `"`, `\`, and control
//!    characters are escaped.
//!
//! This is the sole sanctioned output path for persistence and hashing. The
//! human-friendly indentation is deliberate: document files live in version
//! control, and reviewable diffs matter as much as stable hashes.
//!
//! ## Example
//!
//! ```rust
//! use easel_schema::canonical::to_canonical_json;
//! use serde_json::json;
//!
//! let a = json!({"b": 1, "a": 2});
//! let b = json!({"a": 2, "b": 1});
//! assert_eq!(to_canonical_json(&a), to_canonical_json(&b));
//! assert_eq!(to_canonical_json(&a), "{\n  \"a\": 2,\n  \"b\": 1\n}\n");
//! ```

use crate::error::SchemaError;
use crate::model::Document;
use crate::validate;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

/// Render any JSON value in canonical form.
///
/// The output ends with exactly one newline. Semantically identical inputs
/// always produce bytewise identical output.
#[must_use]
pub fn to_canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.push('\n');
    out
}

/// Serialize a document to canonical UTF-8 bytes.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] if the document cannot be represented as a
/// JSON value (practically unreachable for the derived model).
pub fn serialize_document(doc: &Document) -> Result<Vec<u8>, SchemaError> {
    let value = serde_json::to_value(doc)?;
    Ok(to_canonical_json(&value).into_bytes())
}

/// Parse and validate a document from UTF-8 JSON bytes.
///
/// # Errors
///
/// Returns [`SchemaError::Json`] for malformed input and
/// [`SchemaError::Invalid`] when the parsed document fails validation.
pub fn parse_document(bytes: &[u8]) -> Result<Document, SchemaError> {
    let doc: Document = serde_json::from_slice(bytes)?;
    validate::validate(&doc)?;
    Ok(doc)
}

/// SHA-256 digest over the canonical bytes of a document.
///
/// # Errors
///
/// Propagates [`SchemaError::Json`] from serialization.
pub fn hash_document(doc: &Document) -> Result<[u8; 32], SchemaError> {
    let bytes = serialize_document(doc)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hasher.finalize().into())
}

/// Hex rendering of [`hash_document`], for logs and CLI output.
pub fn hash_hex(doc: &Document) -> Result<String, SchemaError> {
    let digest = hash_document(doc)?;
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => write_array(out, items, indent),
        Value::Object(map) => write_object(out, map, indent),
    }
}

/// Shortest round-trip number rendering.
///
/// Integers print directly. Floats with no fractional part that fit in an
/// `i64` collapse to the integer form so `1.0` and `1` hash identically;
/// everything else relies on the shortest-representation float formatter.
fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
            out.push_str(&(f as i64).to_string());
        } else {
            out.push_str(&f.to_string());
        }
    } else {
        out.push_str(&n.to_string());
    }
}

/// Minimal escaping: `"`, `\`, the short control escapes, and `\u00XX` for
/// the remaining control characters. Everything else passes through.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_array(out: &mut String, items: &[Value], indent: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        push_indent(out, indent + 1);
        write_value(out, item, indent + 1);
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, indent);
    out.push(']');
}

fn write_object(out: &mut String, map: &Map<String, Value>, indent: usize) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    // Code-point order; for UTF-8 that is plain byte order.
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable();

    out.push_str("{\n");
    for (i, key) in keys.iter().enumerate() {
        push_indent(out, indent + 1);
        write_string(out, key);
        out.push_str(": ");
        write_value(out, &map[key.as_str()], indent + 1);
        if i + 1 < keys.len() {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, indent);
    out.push('}');
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
