//! Drives patterns over a module until nothing illegal is left to rewrite.
//!
//! One sweep visits a pre-order snapshot of the module body, so a structured
//! op is lowered before the ops nested inside it. Ops that an earlier rewrite
//! in the same sweep detached, or moved out of the module, are passed over.

use tracing::{debug, warn};

use super::ArenaModule;
use super::conversion_target::{ArenaConversionTarget, LegalityCheck};
use super::error::{RewriteError, RewriteResult};
use super::pattern::ArenaRewritePattern;
use super::rewriter::{self, PatternRewriter};
use crate::arena::context::IrContext;
use crate::arena::refs::{OpRef, RegionRef};
use crate::arena::walk;

const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// Sweeps run, counting the final one that changed nothing.
    pub iterations: usize,
    /// Ops rewritten across all sweeps.
    pub total_changes: usize,
    pub reached_fixpoint: bool,
}

pub struct PatternApplicator {
    patterns: Vec<Box<dyn ArenaRewritePattern>>,
    max_iterations: usize,
}

impl Default for PatternApplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternApplicator {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Patterns are tried in the order they were added.
    pub fn add_pattern(mut self, pattern: impl ArenaRewritePattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// [`apply_partial`](Self::apply_partial), then fail if `target` still
    /// finds an illegal op anywhere in the module.
    pub fn apply(
        &self,
        ctx: &mut IrContext,
        module: ArenaModule,
        target: &ArenaConversionTarget,
    ) -> RewriteResult<ApplyResult> {
        let result = self.apply_partial(ctx, module, target)?;
        if !result.reached_fixpoint {
            warn!(
                iterations = result.iterations,
                changes = result.total_changes,
                "gave up before reaching a fixpoint"
            );
        }

        let leftover = match module.body(ctx) {
            Some(body) => target.verify(ctx, body),
            None => Vec::new(),
        };
        if leftover.is_empty() {
            Ok(result)
        } else {
            Err(RewriteError::illegal_ops(leftover))
        }
    }

    /// Sweep until a sweep changes nothing or the iteration cap is hit.
    /// A pattern error stops everything and leaves the module as it is.
    pub fn apply_partial(
        &self,
        ctx: &mut IrContext,
        module: ArenaModule,
        target: &ArenaConversionTarget,
    ) -> RewriteResult<ApplyResult> {
        let mut result = ApplyResult::default();
        let Some(body) = module.body(ctx) else {
            result.reached_fixpoint = true;
            return Ok(result);
        };

        while result.iterations < self.max_iterations {
            result.iterations += 1;
            let changes = self.sweep(ctx, body, target)?;
            debug!(iteration = result.iterations, changes, "sweep done");
            if changes == 0 {
                result.reached_fixpoint = true;
                break;
            }
            result.total_changes += changes;
        }
        Ok(result)
    }

    fn sweep(
        &self,
        ctx: &mut IrContext,
        body: RegionRef,
        target: &ArenaConversionTarget,
    ) -> RewriteResult<usize> {
        let mut changes = 0;
        for op in walk::collect_preorder(ctx, body) {
            if !nested_in(ctx, op, body) || target.is_legal(ctx, op) == LegalityCheck::Legal {
                continue;
            }
            if self.rewrite_one(ctx, op)? {
                changes += 1;
            }
        }
        Ok(changes)
    }

    /// Offer `op` to each pattern in turn; the first match wins.
    fn rewrite_one(&self, ctx: &mut IrContext, op: OpRef) -> RewriteResult<bool> {
        for pattern in &self.patterns {
            let mut rw = PatternRewriter::new();
            if !pattern.match_and_rewrite(ctx, op, &mut rw)? {
                continue;
            }
            debug!(pattern = pattern.name(), %op, "matched");
            rewriter::commit(ctx, op, rw.into_fate())?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Follow parent links from `op` upwards and report whether they reach `body`.
fn nested_in(ctx: &IrContext, op: OpRef, body: RegionRef) -> bool {
    let mut current = op;
    loop {
        let region = ctx
            .op(current)
            .parent_block
            .and_then(|block| ctx.block(block).parent_region);
        match region {
            None => return false,
            Some(region) if region == body => return true,
            Some(region) => match ctx.region(region).parent_op {
                Some(parent) => current = parent,
                None => return false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::dialect::{core, hl, ll};
    use crate::arena::ops::ArenaDialectOp;
    use crate::arena::rewrite::{RewriteErrorKind, helpers};
    use crate::arena::*;
    use crate::location::Span;
    use crate::symbol::Symbol;
    use smallvec::smallvec;

    fn test_ctx() -> (IrContext, Location) {
        let mut ctx = IrContext::new();
        let path = ctx.paths.intern("test.c");
        (ctx, Location::new(path, Span::new(0, 0)))
    }

    fn module_of(ctx: &mut IrContext, loc: Location, ops: &[OpRef]) -> ArenaModule {
        let block = ctx.create_empty_block(loc);
        for &op in ops {
            ctx.push_op(block, op);
        }
        let body = ctx.create_region(RegionData {
            location: loc,
            blocks: smallvec![block],
            parent_op: None,
        });
        let module = core::module(ctx, loc, Symbol::new("test"), body);
        ArenaModule::new(ctx, module.op_ref()).unwrap()
    }

    struct ReturnToLl;

    impl ArenaRewritePattern for ReturnToLl {
        fn match_and_rewrite(
            &self,
            ctx: &mut IrContext,
            op: OpRef,
            rewriter: &mut PatternRewriter,
        ) -> RewriteResult<bool> {
            let Ok(ret) = hl::Return::from_op(ctx, op) else {
                return Ok(false);
            };
            let location = ctx.op(op).location;
            let values = ret.values(ctx).to_vec();
            let new_op = ll::r#return(ctx, location, values);
            rewriter.replace_op(new_op.op_ref());
            Ok(true)
        }
    }

    struct AlwaysFails;

    impl ArenaRewritePattern for AlwaysFails {
        fn match_and_rewrite(
            &self,
            _ctx: &mut IrContext,
            op: OpRef,
            _rewriter: &mut PatternRewriter,
        ) -> RewriteResult<bool> {
            Err(RewriteError::detached_op(op))
        }
    }

    fn returns_illegal() -> ArenaConversionTarget {
        let mut target = ArenaConversionTarget::new();
        target.add_illegal::<hl::Return>();
        target
    }

    #[test]
    fn stops_after_a_quiet_sweep() {
        let (mut ctx, loc) = test_ctx();
        let ret = hl::r#return(&mut ctx, loc, []);
        let module = module_of(&mut ctx, loc, &[ret.op_ref()]);

        let result = PatternApplicator::new()
            .add_pattern(ReturnToLl)
            .apply(&mut ctx, module, &returns_illegal())
            .unwrap();

        assert_eq!(
            result,
            ApplyResult {
                iterations: 2,
                total_changes: 1,
                reached_fixpoint: true,
            }
        );
        let ops = module.ops(&ctx);
        assert_eq!(ops.len(), 1);
        assert!(ll::Return::matches(&ctx, ops[0]));
    }

    #[test]
    fn legal_ops_are_not_offered() {
        let (mut ctx, loc) = test_ctx();
        let brk = hl::r#break(&mut ctx, loc);
        let module = module_of(&mut ctx, loc, &[brk.op_ref()]);

        let result = PatternApplicator::new()
            .add_pattern(AlwaysFails)
            .apply(&mut ctx, module, &returns_illegal())
            .unwrap();
        assert_eq!(result.total_changes, 0);
    }

    #[test]
    fn a_pattern_error_aborts() {
        let (mut ctx, loc) = test_ctx();
        let ret = hl::r#return(&mut ctx, loc, []);
        let module = module_of(&mut ctx, loc, &[ret.op_ref()]);

        let err = PatternApplicator::new()
            .add_pattern(AlwaysFails)
            .add_pattern(ReturnToLl)
            .apply(&mut ctx, module, &returns_illegal())
            .unwrap_err();
        assert_eq!(err.kind(), &RewriteErrorKind::DetachedOp(ret.op_ref()));
    }

    #[test]
    fn leftovers_are_reported() {
        let (mut ctx, loc) = test_ctx();
        let brk = hl::r#break(&mut ctx, loc);
        let module = module_of(&mut ctx, loc, &[brk.op_ref()]);

        let mut target = returns_illegal();
        target.add_illegal::<hl::Break>();
        let err = PatternApplicator::new()
            .add_pattern(ReturnToLl)
            .apply(&mut ctx, module, &target)
            .unwrap_err();

        let RewriteErrorKind::IllegalOps(ops) = err.kind() else {
            panic!("expected IllegalOps, got {err}");
        };
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].op, brk.op_ref());
    }

    #[test]
    fn iteration_cap_is_respected() {
        let (mut ctx, loc) = test_ctx();
        let ret = hl::r#return(&mut ctx, loc, []);
        let module = module_of(&mut ctx, loc, &[ret.op_ref()]);

        let result = PatternApplicator::new()
            .add_pattern(ReturnToLl)
            .with_max_iterations(1)
            .apply(&mut ctx, module, &returns_illegal())
            .unwrap();
        assert_eq!(result.iterations, 1);
        assert!(!result.reached_fixpoint);
    }

    #[test]
    fn erased_ops_are_not_nested() {
        let (mut ctx, loc) = test_ctx();
        let ret = hl::r#return(&mut ctx, loc, []);
        let module = module_of(&mut ctx, loc, &[ret.op_ref()]);
        let body = module.body(&ctx).unwrap();

        assert!(nested_in(&ctx, ret.op_ref(), body));
        helpers::erase_op(&mut ctx, ret.op_ref()).unwrap();
        assert!(!nested_in(&ctx, ret.op_ref(), body));
    }
}
