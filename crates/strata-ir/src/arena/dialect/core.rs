//! `core` dialect: ops shared by every abstraction level.

use smallvec::smallvec;

use crate::arena::{
    Attribute, BlockRef, IrContext, Location, OpBuilder, RegionData, RegionRef, ValueRef,
};
use crate::define_op;
use crate::symbol::Symbol;

define_op! {
    /// `core.module`: top-level container with a single body region.
    pub struct Module("core", "module") {
        regions: 1,
    }
}

impl Module {
    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn sym_name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op(self.0)
            .attributes
            .get(&Symbol::new("sym_name"))
            .and_then(Attribute::as_symbol)
    }
}

pub fn module(ctx: &mut IrContext, location: Location, name: Symbol, body: RegionRef) -> Module {
    let op = OpBuilder::new(location, "core", "module")
        .attr("sym_name", Attribute::Symbol(name))
        .region(body)
        .create(ctx);
    Module(op)
}

define_op! {
    /// `core.scope`: delimits the jump-target domain of a lowered loop.
    ///
    /// Its body region has exactly one entry block without predecessors.
    /// `ll.scope_ret` leaves the innermost enclosing scope and
    /// `ll.scope_recurse` restarts it from the entry block.
    pub struct Scope("core", "scope") {
        regions: 1,
    }
}

impl Scope {
    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }
}

pub fn scope(ctx: &mut IrContext, location: Location, body: RegionRef) -> Scope {
    let op = OpBuilder::new(location, "core", "scope")
        .region(body)
        .create(ctx);
    Scope(op)
}

/// Create a `core.scope` whose body holds one fresh, empty entry block.
///
/// Returns the scope and its entry block.
pub fn scope_with_entry(ctx: &mut IrContext, location: Location) -> (Scope, BlockRef) {
    let entry = ctx.create_empty_block(location);
    let body = ctx.create_region(RegionData {
        location,
        blocks: smallvec![entry],
        parent_op: None,
    });
    (scope(ctx, location, body), entry)
}

define_op! {
    /// `core.implicit_return`: return synthesized by the front end at the
    /// end of a function body.
    pub struct ImplicitReturn("core", "implicit_return") {}
}

impl ImplicitReturn {
    pub fn values<'a>(&self, ctx: &'a IrContext) -> &'a [ValueRef] {
        ctx.op_operands(self.0)
    }
}

pub fn implicit_return(
    ctx: &mut IrContext,
    location: Location,
    values: impl IntoIterator<Item = ValueRef>,
) -> ImplicitReturn {
    let op = OpBuilder::new(location, "core", "implicit_return")
        .operands(values)
        .create(ctx);
    ImplicitReturn(op)
}
