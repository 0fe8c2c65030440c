//! Common IR builders for the lowering scenario tests.

use smallvec::smallvec;
use strata::{ArenaModule, IrContext};
use strata_ir::Span;
use strata_ir::Symbol;
use strata_ir::arena::dialect::{core, hl};
use strata_ir::arena::ops::ArenaDialectOp;
use strata_ir::arena::{Attribute, BlockRef, Location, OpRef, RegionData, RegionRef, ValueRef};

pub fn test_ctx() -> (IrContext, Location) {
    let mut ctx = IrContext::new();
    let path = ctx.paths.intern("scenario.c".to_owned());
    (ctx, Location::new(path, Span::new(0, 0)))
}

/// A single-block region holding `ops`.
pub fn region(ctx: &mut IrContext, loc: Location, ops: &[OpRef]) -> (RegionRef, BlockRef) {
    let block = ctx.create_empty_block(loc);
    for &op in ops {
        ctx.push_op(block, op);
    }
    let region = ctx.create_region(RegionData {
        location: loc,
        blocks: smallvec![block],
        parent_op: None,
    });
    (region, block)
}

/// An integer constant of the given width.
pub fn int_const(ctx: &mut IrContext, loc: Location, width: u32, value: u64) -> (OpRef, ValueRef) {
    let ty = ctx.types.int(width);
    let c = hl::r#const(ctx, loc, ty, Attribute::IntBits(value));
    (c.op_ref(), c.result(ctx))
}

/// A condition region yielding a fresh constant of the given width.
pub fn cond(ctx: &mut IrContext, loc: Location, width: u32) -> RegionRef {
    let (c, v) = int_const(ctx, loc, width, 1);
    let y = hl::cond_yield(ctx, loc, v);
    region(ctx, loc, &[c, y.op_ref()]).0
}

/// `return <value>;` as a region body.
#[allow(dead_code)]
pub fn return_const(ctx: &mut IrContext, loc: Location, value: u64) -> RegionRef {
    let (c, v) = int_const(ctx, loc, 32, value);
    let ret = hl::r#return(ctx, loc, [v]);
    region(ctx, loc, &[c, ret.op_ref()]).0
}

/// `module { hl.func @f { <ops>; core.implicit_return } }`.
///
/// Returns the module and the function body region.
pub fn module_with_func(ctx: &mut IrContext, loc: Location, ops: &[OpRef]) -> (ArenaModule, RegionRef) {
    let ret = core::implicit_return(ctx, loc, []);
    let mut ops = ops.to_vec();
    ops.push(ret.op_ref());
    let (func_body, _) = region(ctx, loc, &ops);
    let func = hl::func(ctx, loc, Symbol::new("f"), func_body);
    let (body, _) = region(ctx, loc, &[func.op_ref()]);
    let module = core::module(ctx, loc, Symbol::new("scenario"), body);
    let module = ArenaModule::new(ctx, module.op_ref()).expect("core.module is a module");
    (module, func_body)
}

/// `dialect.name` of every op in `block`.
pub fn op_names(ctx: &IrContext, block: BlockRef) -> Vec<String> {
    ctx.block(block)
        .ops
        .iter()
        .map(|&op| ctx.op_full_name(op))
        .collect()
}

/// Successors of the last op of `block`.
pub fn successors(ctx: &IrContext, block: BlockRef) -> Vec<BlockRef> {
    ctx.last_op(block)
        .map(|op| ctx.op(op).successors.to_vec())
        .unwrap_or_default()
}

/// The body blocks of the `core.scope` at `index` in `block`.
#[allow(dead_code)]
pub fn scope_blocks(ctx: &IrContext, block: BlockRef, index: usize) -> Vec<BlockRef> {
    let op = ctx.block(block).ops[index];
    let scope = core::Scope::from_op(ctx, op).expect("expected a core.scope");
    ctx.region(scope.body(ctx)).blocks.to_vec()
}
