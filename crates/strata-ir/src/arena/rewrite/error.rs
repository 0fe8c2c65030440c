//! Error types for rewrites and graph edits.

use derive_more::{Display, From};

use super::conversion_target::IllegalOp;
use crate::arena::refs::{BlockRef, OpRef, RegionRef, ValueRef};
use crate::ops::ConversionError;

pub type RewriteResult<T> = Result<T, RewriteError>;

/// A fatal rewrite failure. Edits made before the failure are not rolled back.
#[derive(Clone, Display, Debug, From, PartialEq)]
#[display("{kind}")]
pub struct RewriteError {
    #[from]
    kind: Box<RewriteErrorKind>,
}

impl<E> From<E> for RewriteError
where
    RewriteErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        RewriteError {
            kind: Box::new(RewriteErrorKind::from(error)),
        }
    }
}

impl RewriteError {
    pub fn kind(&self) -> &RewriteErrorKind {
        &self.kind
    }

    pub fn malformed_region(region: RegionRef, blocks: usize) -> Self {
        RewriteErrorKind::MalformedRegion { region, blocks }.into()
    }

    pub fn empty_region(region: RegionRef) -> Self {
        RewriteErrorKind::EmptyRegion(region).into()
    }

    pub fn missing_cond_yield(block: BlockRef) -> Self {
        RewriteErrorKind::MissingCondYield(block).into()
    }

    pub fn coercion_failure(value: ValueRef, ty: impl std::fmt::Display) -> Self {
        RewriteErrorKind::CoercionFailure {
            value,
            ty: ty.to_string(),
        }
        .into()
    }

    pub fn self_loop(block: BlockRef) -> Self {
        RewriteErrorKind::SelfLoop(block).into()
    }

    pub fn dangling_erase(op: OpRef, uses: usize) -> Self {
        RewriteErrorKind::DanglingErase { op, uses }.into()
    }

    pub fn detached_op(op: OpRef) -> Self {
        RewriteErrorKind::DetachedOp(op).into()
    }

    pub fn orphan_block(block: BlockRef) -> Self {
        RewriteErrorKind::OrphanBlock(block).into()
    }

    pub fn illegal_ops(ops: Vec<IllegalOp>) -> Self {
        RewriteErrorKind::IllegalOps(ops).into()
    }
}

impl std::error::Error for RewriteError {}

#[derive(Clone, Display, Debug, PartialEq)]
pub enum RewriteErrorKind {
    #[display("{region} must hold exactly one block, found {blocks}")]
    MalformedRegion { region: RegionRef, blocks: usize },

    #[display("{_0} holds no blocks")]
    EmptyRegion(RegionRef),

    #[display("{_0} does not end in hl.cond_yield")]
    MissingCondYield(BlockRef),

    #[display("cannot coerce {value} of non-integer type {ty} to a boolean")]
    CoercionFailure { value: ValueRef, ty: String },

    #[display("refusing to tie {_0} to itself")]
    SelfLoop(BlockRef),

    #[display("cannot erase {op}: its results still have {uses} use(s)")]
    DanglingErase { op: OpRef, uses: usize },

    #[display("{_0} is not attached to a block")]
    DetachedOp(OpRef),

    #[display("{_0} does not belong to a region")]
    OrphanBlock(BlockRef),

    #[display("{_0}")]
    Conversion(ConversionError),

    #[display("illegal operations remain: {}", format_illegal(_0))]
    IllegalOps(Vec<IllegalOp>),
}

impl From<ConversionError> for RewriteErrorKind {
    fn from(error: ConversionError) -> Self {
        RewriteErrorKind::Conversion(error)
    }
}

fn format_illegal(ops: &[IllegalOp]) -> String {
    ops.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use cranelift_entity::EntityRef;

    #[test]
    fn conversion_error_converts_through_kind() {
        let err: RewriteError = ConversionError::MissingRegion("hl.if").into();
        assert!(matches!(err.kind(), RewriteErrorKind::Conversion(_)));
        assert_eq!(err.to_string(), "hl.if: missing region");
    }

    #[test]
    fn illegal_ops_lists_every_op() {
        let err = RewriteError::illegal_ops(vec![
            IllegalOp {
                op: OpRef::new(3),
                dialect: Symbol::new("hl"),
                name: Symbol::new("break"),
            },
            IllegalOp {
                op: OpRef::new(7),
                dialect: Symbol::new("hl"),
                name: Symbol::new("continue"),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "illegal operations remain: hl.break (op3), hl.continue (op7)"
        );
    }

    #[test]
    fn self_loop_message() {
        let err = RewriteError::self_loop(BlockRef::new(2));
        assert_eq!(err.to_string(), "refusing to tie block2 to itself");
    }
}
