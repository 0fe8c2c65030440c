//! Rewrite patterns for structured control flow.
//!
//! Every pattern flattens one construct into blocks of the region that holds
//! it, or of a fresh `core.scope` for loops. The applicator offers ops in
//! pre-order, so by the time a construct is lowered its condition, increment
//! and body regions are still single-block.

use strata_ir::arena::dialect::{core, hl, ll};
use strata_ir::arena::ops::ArenaDialectOp;
use strata_ir::arena::rewrite::{
    ArenaRewritePattern, PatternRewriter, RewriteError, RewriteResult, helpers,
};
use strata_ir::arena::{BlockRef, IrContext, Location, OpRef, RegionRef, ValueRef};
use strata_ir::op_interface::Terminators;
use tracing::debug;

use super::coerce::coerce_condition;
use super::resolver::{JumpTargets, resolve_jumps};

/// The `hl.cond_yield` that must end a condition block.
fn cond_yield_of(ctx: &IrContext, block: BlockRef) -> RewriteResult<hl::CondYield> {
    ctx.last_op(block)
        .and_then(|op| hl::CondYield::from_op(ctx, op).ok())
        .ok_or_else(|| RewriteError::missing_cond_yield(block))
}

/// Coerce the yielded value of `cond_block` to `i1` and drop the yield.
///
/// Returns the coerced value; the caller appends the branch that uses it.
fn take_condition(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    cond_block: BlockRef,
) -> RewriteResult<ValueRef> {
    let yield_op = cond_yield_of(ctx, cond_block)?;
    let value = yield_op.value(ctx);
    let cond = coerce_condition(ctx, rewriter, value)?;
    helpers::erase_op(ctx, yield_op.op_ref())?;
    Ok(cond)
}

/// Append `op` at the end of `block` without disturbing the caller's cursor.
fn append(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    block: BlockRef,
    op: OpRef,
) -> RewriteResult<()> {
    rewriter.guarded(|rw| {
        rw.set_insertion_point_to_end(block);
        rw.insert(ctx, op)
    })
}

// ============================================================================
// if
// ============================================================================

/// `hl.if` → `ll.cond_br` between inlined branch blocks.
///
/// ```text
/// original:  ..before  ; cond ops ; ll.cond_br %c, then, else|tail
/// then..:    ...       ; ll.br tail
/// else..:    ...       ; ll.br tail
/// tail:      ..after
/// ```
pub struct IfLowering;

impl ArenaRewritePattern for IfLowering {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> RewriteResult<bool> {
        let Ok(if_op) = hl::If::from_op(ctx, op) else {
            return Ok(false);
        };
        let location = ctx.op(op).location;
        let cond_region = if_op.cond_region(ctx);
        let then_region = if_op.then_region(ctx);
        let else_region = if_op.else_region(ctx);
        helpers::single_block(ctx, cond_region)?;

        let (original, tail) = helpers::split_at_op(ctx, op)?;
        let (cond_block, _) = helpers::inline_region_before(ctx, cond_region, tail)?;
        let cond = take_condition(ctx, rewriter, cond_block)?;

        let false_branch = match else_region {
            Some(region) => Some(helpers::inline_region_before(ctx, region, tail)?),
            None => None,
        };
        let (true_first, true_last) = helpers::inline_region_before(ctx, then_region, tail)?;
        let false_first = false_branch.map_or(tail, |(first, _)| first);

        let cond_br = ll::cond_br(ctx, location, cond, true_first, false_first);
        append(ctx, rewriter, cond_block, cond_br.op_ref())?;

        helpers::tie(ctx, true_last, tail, location)?;
        if let Some((_, false_last)) = false_branch {
            helpers::tie(ctx, false_last, tail, location)?;
        }

        helpers::merge_blocks(ctx, cond_block, original)?;

        if !Terminators::is_terminated(ctx, tail) {
            let exit = ll::scope_ret(ctx, location, []);
            append(ctx, rewriter, tail, exit.op_ref())?;
        }

        debug!(%op, %original, %tail, has_else = false_branch.is_some(), "lowered hl.if");
        rewriter.erase_op(vec![]);
        Ok(true)
    }
}

// ============================================================================
// Loops
// ============================================================================

/// The blocks of a loop once its regions live in the new scope.
struct LoopBlocks {
    cond: BlockRef,
    body_first: BlockRef,
    body_last: BlockRef,
}

/// Inline `cond` then `body` into `scope_body` and close the condition with
/// `ll.cond_scope_ret`. Jumps in `body` are resolved against `targets` first.
fn build_loop(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    location: Location,
    scope_body: RegionRef,
    cond: RegionRef,
    body: RegionRef,
    targets: JumpTargets,
) -> RewriteResult<LoopBlocks> {
    helpers::single_block(ctx, cond)?;
    let (cond_block, _) = helpers::inline_region(ctx, cond, scope_body)?;

    let targets = JumpTargets {
        entry: targets.entry.or(Some(cond_block)),
        ..targets
    };
    resolve_jumps(ctx, rewriter, body, targets)?;
    let (body_first, body_last) = helpers::inline_region(ctx, body, scope_body)?;

    let value = take_condition(ctx, rewriter, cond_block)?;
    let exit = ll::cond_scope_ret(ctx, location, value, body_first);
    append(ctx, rewriter, cond_block, exit.op_ref())?;

    Ok(LoopBlocks {
        cond: cond_block,
        body_first,
        body_last,
    })
}

/// `hl.while` / `hl.do` → `core.scope`.
///
/// ```text
/// core.scope {
///   entry: ll.br cond          (do: ll.br body)
///   cond:  ...; ll.cond_scope_ret %c, body
///   body:  ...; ll.br cond
/// }
/// ```
///
/// `continue` in the body branches to `cond`; `break` becomes
/// `ll.scope_ret`.
pub struct LoopLowering;

impl ArenaRewritePattern for LoopLowering {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> RewriteResult<bool> {
        let (kind, cond, body) = match hl::LoopKind::of(ctx, op) {
            Some(hl::LoopKind::While) => {
                let w = hl::While::from_op(ctx, op)?;
                (hl::LoopKind::While, w.cond_region(ctx), w.body(ctx))
            }
            Some(hl::LoopKind::Do) => {
                let d = hl::Do::from_op(ctx, op)?;
                (hl::LoopKind::Do, d.cond_region(ctx), d.body(ctx))
            }
            Some(hl::LoopKind::For) | None => return Ok(false),
        };
        let location = ctx.op(op).location;
        let (scope, entry) = core::scope_with_entry(ctx, location);
        let scope_body = scope.body(ctx);

        let blocks = build_loop(
            ctx,
            rewriter,
            location,
            scope_body,
            cond,
            body,
            JumpTargets::default(),
        )?;

        helpers::tie(ctx, blocks.body_last, blocks.cond, location)?;
        let first = match kind {
            hl::LoopKind::Do => blocks.body_first,
            _ => blocks.cond,
        };
        helpers::tie(ctx, entry, first, location)?;

        debug!(%op, ?kind, scope = %scope.op_ref(), "lowered loop");
        rewriter.replace_op(scope.op_ref());
        Ok(true)
    }
}

/// `hl.for` → `core.scope`.
///
/// ```text
/// core.scope {
///   entry: ll.br cond
///   incr:  ...; ll.br cond
///   cond:  ...; ll.cond_scope_ret %c, body
///   body:  ...; ll.br incr
/// }
/// ```
///
/// `continue` in the body branches to `incr`.
pub struct ForLowering;

impl ArenaRewritePattern for ForLowering {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> RewriteResult<bool> {
        let Ok(for_op) = hl::For::from_op(ctx, op) else {
            return Ok(false);
        };
        let location = ctx.op(op).location;
        let cond = for_op.cond_region(ctx);
        let incr = for_op.incr_region(ctx);
        let body = for_op.body(ctx);

        let (scope, entry) = core::scope_with_entry(ctx, location);
        let scope_body = scope.body(ctx);

        helpers::single_block(ctx, incr)?;
        let (inc_block, _) = helpers::inline_region(ctx, incr, scope_body)?;

        let targets = JumpTargets {
            entry: Some(inc_block),
            exit: None,
        };
        let blocks = build_loop(ctx, rewriter, location, scope_body, cond, body, targets)?;

        helpers::tie(ctx, entry, blocks.cond, location)?;
        helpers::tie(ctx, blocks.body_last, inc_block, location)?;
        helpers::tie(ctx, inc_block, blocks.cond, location)?;

        debug!(%op, scope = %scope.op_ref(), "lowered hl.for");
        rewriter.replace_op(scope.op_ref());
        Ok(true)
    }
}

// ============================================================================
// Returns
// ============================================================================

/// `hl.return` and `core.implicit_return` → `ll.return`.
pub struct ReturnLowering;

impl ArenaRewritePattern for ReturnLowering {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> RewriteResult<bool> {
        let values = if let Ok(ret) = hl::Return::from_op(ctx, op) {
            ret.values(ctx).to_vec()
        } else if let Ok(ret) = core::ImplicitReturn::from_op(ctx, op) {
            ret.values(ctx).to_vec()
        } else {
            return Ok(false);
        };
        let location = ctx.op(op).location;
        let ret = ll::r#return(ctx, location, values);
        rewriter.replace_op(ret.op_ref());
        Ok(true)
    }
}
