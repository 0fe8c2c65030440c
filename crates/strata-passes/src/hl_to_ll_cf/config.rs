//! Configuration for the control-flow lowering.

use serde::Deserialize;

/// What to do with `ll.scope_ret` / `ll.scope_recurse` left after lowering.
///
/// Both are scope-relative exits whose concrete target is the block after,
/// or the entry of, the innermost enclosing `core.scope`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeExitPolicy {
    /// Keep them as legal terminators for a later stage to resolve.
    #[default]
    Keep,
    /// Fail the pass if any remain.
    Reject,
}

/// Configuration for [`lower_hl_to_ll_cf`](super::lower_hl_to_ll_cf).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LowerCfConfig {
    /// Maximum fixpoint iterations of the pattern applicator. Default: 16.
    pub max_iterations: usize,
    /// Handling of scope-relative exits. Default: keep.
    pub scope_exits: ScopeExitPolicy,
    /// Sweep unreachable blocks from every scope and function body after
    /// lowering. Default: true.
    pub cleanup: bool,
}

impl Default for LowerCfConfig {
    fn default() -> Self {
        Self {
            max_iterations: 16,
            scope_exits: ScopeExitPolicy::Keep,
            cleanup: true,
        }
    }
}

impl LowerCfConfig {
    pub(crate) fn effective_max_iterations(&self) -> usize {
        if self.max_iterations == 0 {
            16
        } else {
            self.max_iterations
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LowerCfConfig::default();
        assert_eq!(config.max_iterations, 16);
        assert_eq!(config.scope_exits, ScopeExitPolicy::Keep);
        assert!(config.cleanup);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LowerCfConfig = serde_json::from_str(r#"{ "scope_exits": "reject" }"#).unwrap();
        assert_eq!(config.scope_exits, ScopeExitPolicy::Reject);
        assert_eq!(config.max_iterations, 16);
        assert!(config.cleanup);
    }

    #[test]
    fn zero_iterations_falls_back_to_default() {
        let config = LowerCfConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_max_iterations(), 16);
    }
}
