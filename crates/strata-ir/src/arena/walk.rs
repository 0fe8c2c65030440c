//! Pre-order traversal of nested regions.

use std::ops::ControlFlow;

use super::context::IrContext;
use super::refs::{OpRef, RegionRef};

/// Returned by a visitor to say whether the walk enters the op's regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    Advance,
    Skip,
}

/// Visit every op under `region`, each op before the ops nested inside it.
///
/// Blocks are visited in region order and ops in block order. The walk uses
/// an explicit stack, so deep nesting does not grow the call stack.
pub fn walk_region<B>(
    ctx: &IrContext,
    region: RegionRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    let mut pending: Vec<OpRef> = Vec::new();
    push_region(ctx, region, &mut pending);
    while let Some(op) = pending.pop() {
        if f(op)? == WalkAction::Skip {
            continue;
        }
        for &nested in ctx.op(op).regions.iter().rev() {
            push_region(ctx, nested, &mut pending);
        }
    }
    ControlFlow::Continue(())
}

// Pushed in reverse so that popping yields program order.
fn push_region(ctx: &IrContext, region: RegionRef, pending: &mut Vec<OpRef>) {
    for &block in ctx.region(region).blocks.iter().rev() {
        pending.extend(ctx.block(block).ops.iter().rev());
    }
}

/// Snapshot every op under `region` in pre-order.
pub fn collect_preorder(ctx: &IrContext, region: RegionRef) -> Vec<OpRef> {
    let mut ops = Vec::new();
    let _ = walk_region::<()>(ctx, region, &mut |op| {
        ops.push(op);
        ControlFlow::Continue(WalkAction::Advance)
    });
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::dialect::hl;
    use crate::arena::ops::ArenaDialectOp;
    use crate::arena::*;
    use crate::location::Span;
    use smallvec::smallvec;

    fn test_ctx() -> (IrContext, Location) {
        let mut ctx = IrContext::new();
        let path = ctx.paths.intern("test.c");
        (ctx, Location::new(path, Span::new(0, 0)))
    }

    fn region_of(ctx: &mut IrContext, loc: Location, ops: &[OpRef]) -> RegionRef {
        let block = ctx.create_empty_block(loc);
        for &op in ops {
            ctx.push_op(block, op);
        }
        ctx.create_region(RegionData {
            location: loc,
            blocks: smallvec![block],
            parent_op: None,
        })
    }

    struct Nest {
        outer: RegionRef,
        while_op: OpRef,
        yield_op: OpRef,
        brk: OpRef,
        after: OpRef,
    }

    /// `while (c) { break; } continue;`
    fn nest(ctx: &mut IrContext, loc: Location) -> Nest {
        let i1 = ctx.types.bool();
        let c = hl::r#const(ctx, loc, i1, Attribute::Bool(true));
        let v = c.result(ctx);
        let y = hl::cond_yield(ctx, loc, v).op_ref();
        let cond = region_of(ctx, loc, &[c.op_ref(), y]);
        let brk = hl::r#break(ctx, loc).op_ref();
        let body = region_of(ctx, loc, &[brk]);
        let while_op = hl::r#while(ctx, loc, cond, body).op_ref();
        let after = hl::r#continue(ctx, loc).op_ref();
        let outer = region_of(ctx, loc, &[while_op, after]);
        Nest {
            outer,
            while_op,
            yield_op: y,
            brk,
            after,
        }
    }

    #[test]
    fn parents_come_before_children() {
        let (mut ctx, loc) = test_ctx();
        let n = nest(&mut ctx, loc);
        let ops = collect_preorder(&ctx, n.outer);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], n.while_op);
        assert_eq!(&ops[2..], &[n.yield_op, n.brk, n.after]);
    }

    #[test]
    fn break_stops_the_walk() {
        let (mut ctx, loc) = test_ctx();
        let n = nest(&mut ctx, loc);

        let mut visited = 0;
        let result = walk_region(&ctx, n.outer, &mut |_| {
            visited += 1;
            ControlFlow::Break("stop")
        });
        assert_eq!(result, ControlFlow::Break("stop"));
        assert_eq!(visited, 1);
    }

    #[test]
    fn skip_leaves_nested_regions_out() {
        let (mut ctx, loc) = test_ctx();
        let n = nest(&mut ctx, loc);

        let mut seen = Vec::new();
        let _ = walk_region::<()>(&ctx, n.outer, &mut |op| {
            seen.push(op);
            if hl::While::matches(&ctx, op) {
                ControlFlow::Continue(WalkAction::Skip)
            } else {
                ControlFlow::Continue(WalkAction::Advance)
            }
        });
        assert_eq!(seen, vec![n.while_op, n.after]);
    }
}
