//! The handle a pattern uses to edit the IR.
//!
//! New ops go in at a movable cursor. The matched op itself is not touched
//! while the pattern runs; the pattern only records its fate, and the
//! applicator commits it afterwards.

use tracing::trace;

use super::error::{RewriteError, RewriteResult};
use super::helpers;
pub use crate::arena::context::InsertionPoint;
use crate::arena::context::IrContext;
use crate::arena::refs::{BlockRef, OpRef, ValueRef};

/// What happens to the matched op once its pattern returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Fate {
    #[default]
    Keep,
    /// Take the op's place; results are remapped by index.
    ReplaceWith(OpRef),
    /// Drop the op; its results are remapped to these values.
    Erase(Vec<ValueRef>),
}

#[derive(Default)]
pub struct PatternRewriter {
    cursor: Option<InsertionPoint>,
    fate: Fate,
}

impl PatternRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insertion_point(&self) -> Option<InsertionPoint> {
        self.cursor
    }

    pub fn set_insertion_point_to_start(&mut self, block: BlockRef) {
        self.cursor = Some(InsertionPoint::Start(block));
    }

    pub fn set_insertion_point_to_end(&mut self, block: BlockRef) {
        self.cursor = Some(InsertionPoint::End(block));
    }

    pub fn set_insertion_point_before(&mut self, op: OpRef) {
        self.cursor = Some(InsertionPoint::Before(op));
    }

    pub fn set_insertion_point_after(&mut self, op: OpRef) {
        self.cursor = Some(InsertionPoint::After(op));
    }

    /// Run `f`, then put the cursor back where it was.
    pub fn guarded<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.cursor;
        let result = f(self);
        self.cursor = saved;
        result
    }

    /// Attach a detached op at the cursor.
    ///
    /// A cursor at the start of a block or after an op advances past the new
    /// op, so a run of inserts comes out in program order.
    pub fn insert(&mut self, ctx: &mut IrContext, op: OpRef) -> RewriteResult<()> {
        let point = self.cursor.ok_or_else(|| RewriteError::detached_op(op))?;
        if ctx.place_op(op, point).is_none() {
            let anchor = match point {
                InsertionPoint::Before(anchor) | InsertionPoint::After(anchor) => anchor,
                InsertionPoint::Start(_) | InsertionPoint::End(_) => op,
            };
            return Err(RewriteError::detached_op(anchor));
        }
        if let InsertionPoint::Start(_) | InsertionPoint::After(_) = point {
            self.cursor = Some(InsertionPoint::After(op));
        }
        trace!(op = %ctx.op_full_name(op), ?point, "insert");
        Ok(())
    }

    /// Put `new_op` where the matched op is and retire the matched op.
    pub fn replace_op(&mut self, new_op: OpRef) {
        debug_assert_eq!(self.fate, Fate::Keep, "matched op already has a fate");
        self.fate = Fate::ReplaceWith(new_op);
    }

    /// Retire the matched op, handing its uses to `values`.
    pub fn erase_op(&mut self, values: Vec<ValueRef>) {
        debug_assert_eq!(self.fate, Fate::Keep, "matched op already has a fate");
        self.fate = Fate::Erase(values);
    }

    pub(crate) fn into_fate(self) -> Fate {
        self.fate
    }
}

/// Carry out the recorded fate of `op`.
pub(crate) fn commit(ctx: &mut IrContext, op: OpRef, fate: Fate) -> RewriteResult<()> {
    let values = match fate {
        Fate::Keep => return Ok(()),
        Fate::ReplaceWith(new_op) => {
            ctx.place_op(new_op, InsertionPoint::After(op))
                .ok_or_else(|| RewriteError::detached_op(op))?;
            ctx.op_results(new_op).to_vec()
        }
        Fate::Erase(values) => values,
    };

    let old: Vec<ValueRef> = ctx.op_results(op).to_vec();
    debug_assert_eq!(old.len(), values.len(), "result count mismatch for {op}");
    for (old, new) in old.into_iter().zip(values) {
        ctx.replace_all_uses(old, new);
    }
    helpers::erase_op(ctx, op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::dialect::{hl, ll};
    use crate::arena::rewrite::RewriteErrorKind;
    use crate::arena::*;
    use crate::location::Span;

    fn test_ctx() -> (IrContext, Location) {
        let mut ctx = IrContext::new();
        let path = ctx.paths.intern("test.c");
        (ctx, Location::new(path, Span::new(0, 0)))
    }

    fn consts(ctx: &mut IrContext, loc: Location, n: u64) -> Vec<OpRef> {
        let ty = ctx.types.int(32);
        (0..n)
            .map(|i| hl::r#const(ctx, loc, ty, Attribute::IntBits(i)).op_ref())
            .collect()
    }

    #[test]
    fn inserts_after_an_op_stay_in_order() {
        let (mut ctx, loc) = test_ctx();
        let block = ctx.create_empty_block(loc);
        let ops = consts(&mut ctx, loc, 3);
        ctx.push_op(block, ops[0]);

        let mut rw = PatternRewriter::new();
        rw.set_insertion_point_after(ops[0]);
        rw.insert(&mut ctx, ops[1]).unwrap();
        rw.insert(&mut ctx, ops[2]).unwrap();

        assert_eq!(ctx.block(block).ops.as_slice(), ops.as_slice());
    }

    #[test]
    fn inserts_at_block_start_stay_in_order() {
        let (mut ctx, loc) = test_ctx();
        let block = ctx.create_empty_block(loc);
        let brk = hl::r#break(&mut ctx, loc).op_ref();
        ctx.push_op(block, brk);
        let ops = consts(&mut ctx, loc, 2);

        let mut rw = PatternRewriter::new();
        rw.set_insertion_point_to_start(block);
        for &op in &ops {
            rw.insert(&mut ctx, op).unwrap();
        }

        assert_eq!(ctx.block(block).ops.as_slice(), &[ops[0], ops[1], brk]);
    }

    #[test]
    fn guarded_puts_the_cursor_back() {
        let (mut ctx, loc) = test_ctx();
        let outer = ctx.create_empty_block(loc);
        let inner = ctx.create_empty_block(loc);

        let mut rw = PatternRewriter::new();
        rw.set_insertion_point_to_end(outer);
        rw.guarded(|rw| {
            rw.set_insertion_point_to_end(inner);
            let brk = hl::r#break(&mut ctx, loc);
            rw.insert(&mut ctx, brk.op_ref())
        })
        .unwrap();

        assert_eq!(rw.insertion_point(), Some(InsertionPoint::End(outer)));
        assert_eq!(ctx.block(inner).ops.len(), 1);
        assert!(ctx.block(outer).ops.is_empty());
    }

    #[test]
    fn inserting_without_a_cursor_fails() {
        let (mut ctx, loc) = test_ctx();
        let brk = hl::r#break(&mut ctx, loc).op_ref();
        let err = PatternRewriter::new().insert(&mut ctx, brk).unwrap_err();
        assert_eq!(err.kind(), &RewriteErrorKind::DetachedOp(brk));
    }

    #[test]
    fn inserting_next_to_a_detached_op_names_the_anchor() {
        let (mut ctx, loc) = test_ctx();
        let ops = consts(&mut ctx, loc, 2);
        let mut rw = PatternRewriter::new();
        rw.set_insertion_point_before(ops[0]);
        let err = rw.insert(&mut ctx, ops[1]).unwrap_err();
        assert_eq!(err.kind(), &RewriteErrorKind::DetachedOp(ops[0]));
    }

    #[test]
    fn committed_replacement_takes_the_old_place() {
        let (mut ctx, loc) = test_ctx();
        let block = ctx.create_empty_block(loc);
        let ret = hl::r#return(&mut ctx, loc, []).op_ref();
        ctx.push_op(block, ret);

        let mut rw = PatternRewriter::new();
        let new_ret = ll::r#return(&mut ctx, loc, []).op_ref();
        rw.replace_op(new_ret);
        commit(&mut ctx, ret, rw.into_fate()).unwrap();

        assert_eq!(ctx.block(block).ops.as_slice(), &[new_ret]);
        assert_eq!(ctx.op(ret).parent_block, None);
    }

    #[test]
    fn committed_erase_remaps_results() {
        let (mut ctx, loc) = test_ctx();
        let block = ctx.create_empty_block(loc);
        let ops = consts(&mut ctx, loc, 2);
        for &op in &ops {
            ctx.push_op(block, op);
        }
        let (old, new) = (ctx.op_result(ops[0], 0), ctx.op_result(ops[1], 0));
        let ret = ll::r#return(&mut ctx, loc, [old]).op_ref();
        ctx.push_op(block, ret);

        let mut rw = PatternRewriter::new();
        rw.erase_op(vec![new]);
        commit(&mut ctx, ops[0], rw.into_fate()).unwrap();

        assert_eq!(ctx.op_operands(ret), &[new]);
        assert_eq!(ctx.block(block).ops.as_slice(), &[ops[1], ret]);
    }

    #[test]
    fn erasing_a_detached_op_is_fine() {
        let (mut ctx, loc) = test_ctx();
        let brk = hl::r#break(&mut ctx, loc).op_ref();
        let mut rw = PatternRewriter::new();
        rw.erase_op(vec![]);
        commit(&mut ctx, brk, rw.into_fate()).unwrap();
    }
}
