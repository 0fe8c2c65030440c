//! Boolean coercion of branch conditions.

use strata_ir::arena::dialect::hl;
use strata_ir::arena::rewrite::{PatternRewriter, RewriteError, RewriteResult};
use strata_ir::arena::{IrContext, ValueDef, ValueRef};
use tracing::trace;

/// Normalize `value` to an `core.i1` condition.
///
/// An `i1` is returned as is. Any other integer width gets one
/// `hl.implicit_cast` of kind `integral_cast`, placed right after the value's
/// defining op (or at the start of its block for a block argument). A
/// non-integer value is an error.
pub fn coerce_condition(
    ctx: &mut IrContext,
    rewriter: &mut PatternRewriter,
    value: ValueRef,
) -> RewriteResult<ValueRef> {
    let ty = ctx.value_ty(value);
    let Some(width) = ctx.types.integer_width(ty) else {
        let data = ctx.types.get(ty);
        return Err(RewriteError::coercion_failure(
            value,
            format_args!("{}.{}", data.dialect, data.name),
        ));
    };
    if width == 1 {
        return Ok(value);
    }

    let def = ctx.value_def(value);
    let location = match def {
        ValueDef::OpResult(op, _) => ctx.op(op).location,
        ValueDef::BlockArg(block, _) => ctx.block(block).location,
    };
    let i1 = ctx.types.bool();
    let cast = hl::implicit_cast(ctx, location, value, i1, hl::INTEGRAL_CAST());

    rewriter.guarded(|rw| {
        match def {
            ValueDef::OpResult(op, _) => rw.set_insertion_point_after(op),
            ValueDef::BlockArg(block, _) => rw.set_insertion_point_to_start(block),
        }
        rw.insert(ctx, cast.op_ref())
    })?;

    trace!(%value, width, "coerced condition to i1");
    Ok(cast.result(ctx))
}
