use super::error::RewriteResult;
use super::rewriter::PatternRewriter;
use crate::arena::context::IrContext;
use crate::arena::refs::OpRef;

/// One rewrite rule, offered each illegal op by the applicator.
///
/// Return `Ok(false)` without touching the IR when `op` is not yours. On a
/// match, build the replacement IR through `ctx` and `rewriter` and tell the
/// rewriter what becomes of `op`. An `Err` stops the whole application and
/// keeps the edits made so far.
pub trait ArenaRewritePattern {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> RewriteResult<bool>;

    /// Shown in debug logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
