//! # JSON-Patch Model
//!
//! The six RFC 6902 operations, serialized exactly as on the wire:
//! `{ "op": "...", "path": "...", "value"?, "from"? }`. Paths are RFC 6901
//! JSON Pointers with `~0`/`~1` escaping; the token `-` appends to an
//! array. Engine operations both produce and consume this format, and any
//! conforming external library can apply engine-produced patches.

use crate::error::PatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One RFC 6902 patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert a value at `path` (array insert or object key set).
    Add { path: String, value: Value },

    /// Remove the value at `path`.
    Remove { path: String },

    /// Replace the existing value at `path`.
    Replace { path: String, value: Value },

    /// Remove the value at `from` and insert it at `path`.
    Move { from: String, path: String },

    /// Copy the value at `from` to `path`.
    Copy { from: String, path: String },

    /// Assert that the value at `path` equals `value`.
    Test { path: String, value: Value },
}

impl PatchOp {
    /// The operation's target pointer.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. }
            | Self::Test { path, .. } => path,
        }
    }
}

/// Split an RFC 6901 pointer into unescaped reference tokens.
///
/// The empty pointer addresses the whole document and yields no tokens.
///
/// # Errors
///
/// [`PatchError::InvalidPointer`] when the pointer is non-empty but does
/// not start with `/`, or contains a stray `~`.
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer {
            pointer: pointer.to_string(),
        });
    };
    rest.split('/')
        .map(|token| unescape_token(token, pointer))
        .collect()
}

/// Escape one reference token for embedding in a pointer.
#[must_use]
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str, pointer: &str) -> Result<String, PatchError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PatchError::InvalidPointer {
                    pointer: pointer.to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let op = PatchOp::Add {
            path: "/artboards/0/children/1".to_string(),
            value: json!({ "name": "N" }),
        };
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(
            wire,
            json!({ "op": "add", "path": "/artboards/0/children/1", "value": { "name": "N" } })
        );
    }

    #[test]
    fn test_move_wire_format() {
        let op = PatchOp::Move {
            from: "/a/0".to_string(),
            path: "/b/1".to_string(),
        };
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(wire, json!({ "op": "move", "from": "/a/0", "path": "/b/1" }));

        let back: PatchOp = serde_json::from_value(wire).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_parse_pointer_tokens() {
        assert_eq!(parse_pointer("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_pointer("/a/b/0").unwrap(), ["a", "b", "0"]);
        // Empty tokens are legal per RFC 6901.
        assert_eq!(parse_pointer("/").unwrap(), [""]);
    }

    #[test]
    fn test_pointer_escaping_roundtrip() {
        assert_eq!(escape_token("a/b~c"), "a~1b~0c");
        assert_eq!(parse_pointer("/a~1b/x~0y").unwrap(), ["a/b", "x~y"]);
    }

    #[test]
    fn test_invalid_pointers_rejected() {
        assert!(parse_pointer("no-slash").is_err());
        assert!(parse_pointer("/bad~2escape").is_err());
        assert!(parse_pointer("/trailing~").is_err());
    }
}
