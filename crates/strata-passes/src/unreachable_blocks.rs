//! Unreachable block elimination.
//!
//! Lowering leaves blocks no branch ever targets, for example the join block
//! of an `if` whose branches both return. A block is live when it is the
//! entry block of its region or is reachable from it along successor edges.
//! Everything else is detached together with the ops it holds.

use std::collections::{HashSet, VecDeque};

use strata_ir::arena::dialect::{core, hl};
use strata_ir::arena::ops::ArenaDialectOp;
use strata_ir::arena::{ArenaModule, BlockRef, IrContext, OpRef, RegionRef, walk};
use tracing::{debug, trace};

/// Result of sweeping a module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnreachableBlocksResult {
    /// Total number of blocks removed.
    pub removed_blocks: usize,
    /// Number of scope and function bodies visited.
    pub regions_swept: usize,
}

/// Sweep every `core.scope` body and `hl.func` body in the module.
pub fn sweep_module(ctx: &mut IrContext, module: ArenaModule) -> UnreachableBlocksResult {
    let Some(body) = module.body(ctx) else {
        return UnreachableBlocksResult::default();
    };

    let regions: Vec<RegionRef> = walk::collect_preorder(ctx, body)
        .into_iter()
        .filter_map(|op| {
            if let Ok(scope) = core::Scope::from_op(ctx, op) {
                Some(scope.body(ctx))
            } else if let Ok(func) = hl::Func::from_op(ctx, op) {
                Some(func.body(ctx))
            } else {
                None
            }
        })
        .collect();

    let mut result = UnreachableBlocksResult::default();
    for region in regions {
        result.removed_blocks += eliminate_unreachable_blocks(ctx, region);
        result.regions_swept += 1;
    }

    debug!(
        removed = result.removed_blocks,
        regions = result.regions_swept,
        "unreachable block sweep"
    );
    result
}

/// Remove every block of `region` that its entry block cannot reach.
///
/// Returns the number of blocks removed.
pub fn eliminate_unreachable_blocks(ctx: &mut IrContext, region: RegionRef) -> usize {
    let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
    let Some(&entry) = blocks.first() else {
        return 0;
    };

    let mut reachable: HashSet<BlockRef> = HashSet::from([entry]);
    let mut worklist: VecDeque<BlockRef> = VecDeque::from([entry]);
    while let Some(block) = worklist.pop_front() {
        for &op in &ctx.block(block).ops {
            for &succ in &ctx.op(op).successors {
                if reachable.insert(succ) {
                    worklist.push_back(succ);
                }
            }
        }
    }

    let mut removed = 0;
    for block in blocks {
        if reachable.contains(&block) {
            continue;
        }
        drop_block_uses(ctx, block);
        ctx.detach_block(block);
        trace!(%block, %region, "removed unreachable block");
        removed += 1;
    }
    removed
}

/// Unregister the operand uses of every op in `block`, nested ones included.
fn drop_block_uses(ctx: &mut IrContext, block: BlockRef) {
    let mut ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
    while let Some(op) = ops.pop() {
        ctx.drop_operand_uses(op);
        for &region in &ctx.op(op).regions {
            for &nested in &ctx.region(region).blocks {
                ops.extend(ctx.block(nested).ops.iter().copied());
            }
        }
    }
}
