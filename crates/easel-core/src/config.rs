//! Configuration types for the engine facade.

use easel_merge::MergeOptions;
use easel_ops::BudgetConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the [`Engine`](crate::Engine) facade.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Document growth thresholds, enforced before growing writes.
    pub budget: BudgetConfig,

    /// Default merge options, used when the caller passes none.
    pub merge: MergeOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.budget.max_nodes, 10_000);
        assert_eq!(config.budget.max_depth, 50);
        assert_eq!(config.merge.deadline_ms, None);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
