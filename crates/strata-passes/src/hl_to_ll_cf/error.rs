//! Error type of the control-flow lowering.

use derive_more::{Display, From};
use strata_ir::arena::OpRef;
use strata_ir::arena::rewrite::RewriteError;

#[derive(Clone, Display, Debug, From, PartialEq)]
pub enum LowerCfError {
    #[display("{_0}")]
    #[from]
    Rewrite(RewriteError),

    /// Scope exits remain and the configuration rejects them.
    #[display("{} scope exit(s) left unresolved: {}", _0.len(), format_ops(_0))]
    UnresolvedScopeExit(Vec<OpRef>),
}

impl std::error::Error for LowerCfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LowerCfError::Rewrite(err) => Some(err),
            LowerCfError::UnresolvedScopeExit(_) => None,
        }
    }
}

fn format_ops(ops: &[OpRef]) -> String {
    ops.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_ir::arena::RegionRef;

    #[test]
    fn unresolved_exits_are_listed() {
        let err = LowerCfError::UnresolvedScopeExit(vec![OpRef::from_u32(4), OpRef::from_u32(9)]);
        assert_eq!(
            err.to_string(),
            "2 scope exit(s) left unresolved: op4, op9"
        );
    }

    #[test]
    fn rewrite_errors_convert() {
        let err: LowerCfError = RewriteError::empty_region(RegionRef::from_u32(1)).into();
        assert_eq!(err.to_string(), "region1 holds no blocks");
        assert!(std::error::Error::source(&err).is_some());
    }
}
