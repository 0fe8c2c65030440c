//! In-place rewriting of arena IR.
//!
//! Patterns edit the arena in place. Graph surgery goes through the free
//! functions in [`helpers`]; the fate of the matched op itself is recorded on
//! the [`PatternRewriter`] and applied by the [`PatternApplicator`].

pub mod applicator;
pub mod conversion_target;
pub mod error;
pub mod helpers;
pub mod pattern;
pub mod rewriter;

pub use applicator::{ApplyResult, PatternApplicator};
pub use conversion_target::{ArenaConversionTarget, IllegalOp, LegalityCheck};
pub use error::{RewriteError, RewriteErrorKind, RewriteResult};
pub use pattern::ArenaRewritePattern;
pub use rewriter::{InsertionPoint, PatternRewriter};

use super::context::IrContext;
use super::dialect::core;
use super::ops::ArenaDialectOp;
use super::refs::{OpRef, RegionRef};
use crate::symbol::Symbol;

/// A `core.module` op, the unit the applicator and the passes work on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaModule(pub OpRef);

impl ArenaModule {
    /// `None` unless `op` is a `core.module`.
    pub fn new(ctx: &IrContext, op: OpRef) -> Option<Self> {
        core::Module::matches(ctx, op).then_some(ArenaModule(op))
    }

    pub fn body(self, ctx: &IrContext) -> Option<RegionRef> {
        ctx.op(self.0).regions.first().copied()
    }

    /// Ops of the first body block, i.e. the module's top-level ops.
    pub fn ops(self, ctx: &IrContext) -> Vec<OpRef> {
        self.body(ctx)
            .and_then(|body| ctx.region(body).blocks.first().copied())
            .map(|block| ctx.block(block).ops.to_vec())
            .unwrap_or_default()
    }

    pub fn name(self, ctx: &IrContext) -> Option<Symbol> {
        core::Module::from_op(ctx, self.0).ok()?.sym_name(ctx)
    }
}
