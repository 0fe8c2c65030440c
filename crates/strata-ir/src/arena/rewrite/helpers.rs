//! Block surgery used by control-flow lowering.
//!
//! Everything here edits the arena directly instead of going through a
//! [`PatternRewriter`](super::PatternRewriter): splitting a block around an
//! op, splicing a region's blocks into another region, merging a block into
//! its predecessor and adding fallthrough branches.

use tracing::trace;

use super::error::{RewriteError, RewriteResult};
use crate::arena::context::IrContext;
use crate::arena::dialect::ll;
use crate::arena::refs::{BlockRef, OpRef, RegionRef};
use crate::arena::types::Location;
use crate::op_interface::Terminators;

/// Cut the block holding `op` in two around it.
///
/// Ops before `op` stay where they are. Ops after it move, in order, to a new
/// block placed right after the original one in the same region. `op` itself
/// is detached. Returns `(original, tail)`.
pub fn split_at_op(ctx: &mut IrContext, op: OpRef) -> RewriteResult<(BlockRef, BlockRef)> {
    let block = ctx
        .op(op)
        .parent_block
        .ok_or_else(|| RewriteError::detached_op(op))?;
    let region = ctx
        .block(block)
        .parent_region
        .ok_or_else(|| RewriteError::orphan_block(block))?;

    let ops = &ctx.block(block).ops;
    let Some(at) = ops.iter().position(|&o| o == op) else {
        return Err(RewriteError::detached_op(op));
    };
    let moved: Vec<OpRef> = ops[at + 1..].to_vec();

    ctx.detach_op(op);
    for &o in &moved {
        ctx.detach_op(o);
    }
    let location = ctx.block(block).location;
    let tail = ctx.create_empty_block(location);
    for o in moved {
        ctx.push_op(tail, o);
    }

    let index = block_index(ctx, region, block)?;
    ctx.region_mut(region).blocks.insert(index + 1, tail);
    ctx.block_mut(tail).parent_region = Some(region);

    trace!(%block, %tail, at = %op, "split");
    Ok((block, tail))
}

fn block_index(ctx: &IrContext, region: RegionRef, block: BlockRef) -> RewriteResult<usize> {
    ctx.region(region)
        .blocks
        .iter()
        .position(|&b| b == block)
        .ok_or_else(|| RewriteError::orphan_block(block))
}

/// Move every block of `src` into `dest` at `index`, keeping their order.
///
/// Returns the first and last moved block.
fn splice_blocks(
    ctx: &mut IrContext,
    src: RegionRef,
    dest: RegionRef,
    index: usize,
) -> RewriteResult<(BlockRef, BlockRef)> {
    let moved = std::mem::take(&mut ctx.region_mut(src).blocks);
    let (Some(&first), Some(&last)) = (moved.first(), moved.last()) else {
        return Err(RewriteError::empty_region(src));
    };
    for &block in &moved {
        ctx.block_mut(block).parent_region = Some(dest);
    }
    ctx.region_mut(dest).blocks.insert_many(index, moved);
    Ok((first, last))
}

/// Move the blocks of `region` in front of `before`, inside the region that
/// holds `before`. `region` is left empty.
///
/// Returns the first and last moved block.
pub fn inline_region_before(
    ctx: &mut IrContext,
    region: RegionRef,
    before: BlockRef,
) -> RewriteResult<(BlockRef, BlockRef)> {
    let dest = ctx
        .block(before)
        .parent_region
        .ok_or_else(|| RewriteError::orphan_block(before))?;
    let index = block_index(ctx, dest, before)?;
    splice_blocks(ctx, region, dest, index)
}

/// Move the blocks of `src` to the end of `dest`. `src` is left empty.
///
/// Returns the first and last moved block.
pub fn inline_region(
    ctx: &mut IrContext,
    src: RegionRef,
    dest: RegionRef,
) -> RewriteResult<(BlockRef, BlockRef)> {
    let index = ctx.region(dest).blocks.len();
    splice_blocks(ctx, src, dest, index)
}

/// The block of a region that must consist of exactly one.
pub fn single_block(ctx: &IrContext, region: RegionRef) -> RewriteResult<BlockRef> {
    match ctx.region(region).blocks.as_slice() {
        [block] => Ok(*block),
        [] => Err(RewriteError::empty_region(region)),
        blocks => Err(RewriteError::malformed_region(region, blocks.len())),
    }
}

/// Move the ops of `src` to the end of `dest` and drop `src` from its region.
///
/// `src` must only be entered by falling out of `dest`.
pub fn merge_blocks(ctx: &mut IrContext, src: BlockRef, dest: BlockRef) -> RewriteResult<()> {
    if src == dest {
        return Err(RewriteError::self_loop(src));
    }
    debug_assert!(ctx.block_args(src).is_empty(), "{src} has arguments");

    for op in ctx.block(src).ops.to_vec() {
        ctx.detach_op(op);
        ctx.push_op(dest, op);
    }
    ctx.detach_block(src);

    trace!(%src, %dest, "merge");
    Ok(())
}

/// Detach `op` and release its operands.
///
/// Fails with [`DanglingErase`](super::RewriteErrorKind::DanglingErase) while
/// any of its results is still used.
pub fn erase_op(ctx: &mut IrContext, op: OpRef) -> RewriteResult<()> {
    let uses: usize = ctx.op_results(op).iter().map(|&v| ctx.uses(v).len()).sum();
    if uses > 0 {
        return Err(RewriteError::dangling_erase(op, uses));
    }
    ctx.detach_op(op);
    ctx.remove_op(op);
    Ok(())
}

/// Make `from` fall through to `to` with an `ll.br`.
///
/// A block that already ends in a terminator, hard or soft, is left as is.
/// Tying an open block to itself is an error. Returns whether a branch was
/// added.
pub fn tie(
    ctx: &mut IrContext,
    from: BlockRef,
    to: BlockRef,
    location: Location,
) -> RewriteResult<bool> {
    if Terminators::is_terminated(ctx, from) {
        return Ok(false);
    }
    if from == to {
        return Err(RewriteError::self_loop(from));
    }
    let br = ll::br(ctx, location, to);
    ctx.push_op(from, br.op_ref());
    trace!(%from, %to, "tie");
    Ok(true)
}
