//! Scope-relative resolution of `break`, `continue` and `return`.
//!
//! A loop resolves the jumps of its own body before the body is inlined into
//! the new `core.scope`. The walk descends into nested ops, `hl.if` included,
//! but stops at a nested loop: that loop owns its jumps and resolves them
//! when it is lowered.

use std::collections::VecDeque;

use strata_ir::arena::dialect::{hl, ll};
use strata_ir::arena::ops::ArenaDialectOp;
use strata_ir::arena::rewrite::{PatternRewriter, RewriteResult, helpers};
use strata_ir::arena::{BlockRef, IrContext, OpRef, RegionRef};
use tracing::trace;

/// The structured jumps the resolver rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Break,
    Continue,
    Return,
}

impl JumpKind {
    pub fn of(ctx: &IrContext, op: OpRef) -> Option<JumpKind> {
        if hl::Break::matches(ctx, op) {
            Some(JumpKind::Break)
        } else if hl::Continue::matches(ctx, op) {
            Some(JumpKind::Continue)
        } else if hl::Return::matches(ctx, op) {
            Some(JumpKind::Return)
        } else {
            None
        }
    }
}

/// Where resolved jumps go.
///
/// `None` means "relative to the enclosing scope": `continue` becomes
/// `ll.scope_recurse` and `break` becomes `ll.scope_ret`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JumpTargets {
    /// Target of `continue`.
    pub entry: Option<BlockRef>,
    /// Target of `break`.
    pub exit: Option<BlockRef>,
}

/// How many jumps of each kind were rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolvedJumps {
    pub breaks: usize,
    pub continues: usize,
    pub returns: usize,
}

impl ResolvedJumps {
    pub fn total(&self) -> usize {
        self.breaks + self.continues + self.returns
    }

    fn record(&mut self, kind: JumpKind) {
        match kind {
            JumpKind::Break => self.breaks += 1,
            JumpKind::Continue => self.continues += 1,
            JumpKind::Return => self.returns += 1,
        }
    }
}

/// Rewrite every jump under `region` that belongs to the loop owning it.
pub fn resolve_jumps(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    region: RegionRef,
    targets: JumpTargets,
) -> RewriteResult<ResolvedJumps> {
    let mut resolved = ResolvedJumps::default();
    let mut worklist: VecDeque<RegionRef> = VecDeque::from([region]);

    while let Some(region) = worklist.pop_front() {
        let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
        for block in blocks {
            let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
            for op in ops {
                if let Some(kind) = JumpKind::of(ctx, op) {
                    rewrite_jump(ctx, rewriter, op, kind, targets)?;
                    resolved.record(kind);
                    continue;
                }
                if hl::LoopKind::of(ctx, op).is_some() {
                    continue;
                }
                worklist.extend(ctx.op(op).regions.iter().copied());
            }
        }
    }

    trace!(
        breaks = resolved.breaks,
        continues = resolved.continues,
        returns = resolved.returns,
        "resolved jumps"
    );
    Ok(resolved)
}

fn rewrite_jump(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    op: OpRef,
    kind: JumpKind,
    targets: JumpTargets,
) -> RewriteResult<()> {
    let location = ctx.op(op).location;
    let replacement = match kind {
        JumpKind::Continue => match targets.entry {
            Some(entry) => ll::br(ctx, location, entry).op_ref(),
            None => ll::scope_recurse(ctx, location).op_ref(),
        },
        JumpKind::Break => match targets.exit {
            Some(exit) => ll::br(ctx, location, exit).op_ref(),
            None => ll::scope_ret(ctx, location, []).op_ref(),
        },
        JumpKind::Return => {
            let values = hl::Return::from_op(ctx, op)?.values(ctx).to_vec();
            ll::r#return(ctx, location, values).op_ref()
        }
    };

    rewriter.guarded(|rw| {
        rw.set_insertion_point_before(op);
        rw.insert(ctx, replacement)
    })?;
    helpers::erase_op(ctx, op)?;

    trace!(?kind, %op, replacement = %ctx.op_full_name(replacement), "jump");
    Ok(())
}
