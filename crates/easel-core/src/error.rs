//! # Unified Error Type and Wire Format
//!
//! Component errors pass through unchanged; the facade adds the stable
//! code mapping hosting tools key their UI messages off, and the
//! `{ code, message, path?, details? }` wire rendering.
//!
//! The code set is closed. Codes never change meaning; new failure modes
//! get new codes.

use easel_merge::MergeError;
use easel_ops::{OpError, PatchError};
use easel_schema::SchemaError;
use easel_tree::TreeError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Unified engine error: a passthrough over the component taxonomies.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Schema, validation, or migration failure.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Path resolution or lookup failure.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Node operation failure.
    #[error(transparent)]
    Op(#[from] OpError),

    /// Merge failure.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// The serialized error shape external tools consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireError {
    /// Stable machine-checkable code.
    pub code: &'static str,

    /// Human-readable message.
    pub message: String,

    /// JSON Pointer to the implicated location, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Structured details (validation violations, budget figures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl EngineError {
    /// The stable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema(err) => match err {
                SchemaError::Invalid { .. } | SchemaError::Json(_) | SchemaError::InvalidId(_) => {
                    "InvalidSchema"
                }
                SchemaError::UnknownVersion { .. } => "UnknownVersion",
                SchemaError::NoMigrationPath { .. } => "NoMigrationPath",
            },
            Self::Tree(err) => match err {
                TreeError::PathNotFound { .. } => "PathNotFound",
                TreeError::NodeNotFound { .. } => "NodeNotFound",
            },
            Self::Op(err) => match err {
                OpError::ParentNotFound { .. } => "PathNotFound",
                OpError::ParentNotContainer { .. } => "ParentNotContainer",
                OpError::TargetNotContainer { .. } => "TargetNotContainer",
                OpError::NodeNotFound { .. } => "NodeNotFound",
                OpError::RootDeletionDisallowed { .. } => "RootDeletionDisallowed",
                OpError::TypeChangeDisallowed { .. } => "TypeChangeDisallowed",
                OpError::WouldCreateCycle { .. } => "WouldCreateCycle",
                OpError::InvalidNode { .. } | OpError::InvalidValue { .. } | OpError::Json(_) => {
                    "InvalidValue"
                }
                OpError::BudgetExceeded { .. } => "BudgetExceeded",
                OpError::Patch(patch) => match patch {
                    PatchError::PreconditionFailed { .. } => "PatchPreconditionFailed",
                    PatchError::InvalidPointer { .. } | PatchError::TargetNotFound { .. } => {
                        "PathNotFound"
                    }
                },
            },
            Self::Merge(err) => match err {
                MergeError::InvalidSchema { .. } => "InvalidSchema",
                MergeError::BudgetExceeded { .. } => "BudgetExceeded",
                MergeError::Aborted { .. } => "MergeAborted",
                MergeError::Cancelled => "Cancelled",
            },
        }
    }

    /// The implicated JSON Pointer, when the error carries one.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        match self {
            Self::Tree(TreeError::PathNotFound { pointer })
            | Self::Op(OpError::ParentNotFound { pointer })
            | Self::Op(OpError::ParentNotContainer { pointer })
            | Self::Op(OpError::TargetNotContainer { pointer })
            | Self::Op(OpError::InvalidValue { pointer, .. })
            | Self::Op(OpError::Patch(PatchError::InvalidPointer { pointer }))
            | Self::Op(OpError::Patch(PatchError::TargetNotFound { pointer }))
            | Self::Op(OpError::Patch(PatchError::PreconditionFailed { pointer })) => {
                Some(pointer.clone())
            }
            _ => None,
        }
    }

    /// Render the wire shape.
    #[must_use]
    pub fn to_wire(&self) -> WireError {
        let details = match self {
            Self::Schema(SchemaError::Invalid { violations }) => {
                serde_json::to_value(violations).ok()
            }
            Self::Merge(MergeError::InvalidSchema {
                source: SchemaError::Invalid { violations },
                ..
            }) => serde_json::to_value(violations).ok(),
            _ => None,
        };
        WireError {
            code: self.code(),
            message: self.to_string(),
            path: self.path(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping_is_stable() {
        let err: EngineError = TreeError::NodeNotFound {
            id: "X".to_string(),
        }
        .into();
        assert_eq!(err.code(), "NodeNotFound");

        let err: EngineError = OpError::BudgetExceeded {
            message: "too big".to_string(),
        }
        .into();
        assert_eq!(err.code(), "BudgetExceeded");

        let err: EngineError = MergeError::Cancelled.into();
        assert_eq!(err.code(), "Cancelled");
    }

    #[test]
    fn test_wire_shape() {
        let err: EngineError = OpError::ParentNotContainer {
            pointer: "/artboards/0/children/1".to_string(),
        }
        .into();
        let wire = err.to_wire();
        assert_eq!(wire.code, "ParentNotContainer");
        assert_eq!(wire.path.as_deref(), Some("/artboards/0/children/1"));

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["code"], "ParentNotContainer");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_validation_details_carried() {
        let err: EngineError = SchemaError::Invalid {
            violations: vec![easel_schema::Violation {
                pointer: "/artboards".to_string(),
                message: "document must contain at least one artboard".to_string(),
            }],
        }
        .into();
        let wire = err.to_wire();
        assert_eq!(wire.code, "InvalidSchema");
        assert!(wire.details.is_some());
    }
}
