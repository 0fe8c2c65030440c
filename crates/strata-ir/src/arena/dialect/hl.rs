//! `hl` dialect: structured, high-level control flow.
//!
//! Loop and branch constructs own their condition, increment and body as
//! separate regions. Condition regions are single-block and end in
//! `hl.cond_yield`, which hands the condition value to the owner without
//! leaving the region.

use smallvec::smallvec;

use crate::arena::ops::ArenaDialectOp;
use crate::arena::{
    Attribute, IrContext, Location, OpBuilder, OpRef, RegionData, RegionRef, TypeRef, ValueRef,
};
use crate::symbol::Symbol;
use crate::{define_op, symbols};

symbols! {
    ATTR_KIND => "kind",
    INTEGRAL_CAST => "integral_cast",
}

// ============================================================================
// Functions and values
// ============================================================================

define_op! {
    /// `hl.func`: a function definition with one body region.
    pub struct Func("hl", "func") {
        regions: 1,
    }
}

impl Func {
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

pub fn func(ctx: &mut IrContext, location: Location, name: Symbol, body: RegionRef) -> Func {
    let op = OpBuilder::new(location, "hl", "func")
        .attr("sym_name", Attribute::Symbol(name))
        .region(body)
        .create(ctx);
    Func(op)
}

define_op! {
    /// `hl.const`: a constant value.
    pub struct Const("hl", "const") {}
}

impl Const {
    pub fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }
}

pub fn r#const(ctx: &mut IrContext, location: Location, ty: TypeRef, value: Attribute) -> Const {
    let op = OpBuilder::new(location, "hl", "const")
        .result(ty)
        .attr("value", value)
        .create(ctx);
    Const(op)
}

define_op! {
    /// `hl.implicit_cast`: value conversion inserted by the compiler.
    ///
    /// The `kind` attribute names the conversion; boolean coercion of
    /// conditions uses `integral_cast`.
    pub struct ImplicitCast("hl", "implicit_cast") {
        operands: 1,
    }
}

impl ImplicitCast {
    pub fn value(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[0]
    }

    pub fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }

    pub fn kind(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op(self.0)
            .attributes
            .get(&ATTR_KIND())
            .and_then(Attribute::as_symbol)
    }
}

pub fn implicit_cast(
    ctx: &mut IrContext,
    location: Location,
    value: ValueRef,
    ty: TypeRef,
    kind: Symbol,
) -> ImplicitCast {
    let op = OpBuilder::new(location, "hl", "implicit_cast")
        .operand(value)
        .result(ty)
        .attr(ATTR_KIND(), Attribute::Symbol(kind))
        .create(ctx);
    ImplicitCast(op)
}

// ============================================================================
// Structured control flow
// ============================================================================

define_op! {
    /// `hl.if`: regions are `cond`, `then` and `else`; `else` may be empty.
    pub struct If("hl", "if") {
        regions: 3,
    }
}

impl If {
    pub fn cond_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn then_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[1]
    }

    /// The else region, or `None` when it holds no blocks.
    pub fn else_region(&self, ctx: &IrContext) -> Option<RegionRef> {
        let region = ctx.op(self.0).regions[2];
        (!ctx.region(region).blocks.is_empty()).then_some(region)
    }
}

/// Build an `hl.if`. A missing else branch is stored as an empty region.
pub fn r#if(
    ctx: &mut IrContext,
    location: Location,
    cond: RegionRef,
    then_region: RegionRef,
    else_region: Option<RegionRef>,
) -> If {
    let else_region = else_region.unwrap_or_else(|| {
        ctx.create_region(RegionData {
            location,
            blocks: smallvec![],
            parent_op: None,
        })
    });
    let op = OpBuilder::new(location, "hl", "if")
        .region(cond)
        .region(then_region)
        .region(else_region)
        .create(ctx);
    If(op)
}

define_op! {
    /// `hl.while`: regions are `cond` and `body`.
    pub struct While("hl", "while") {
        regions: 2,
    }
}

impl While {
    pub fn cond_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[1]
    }
}

pub fn r#while(ctx: &mut IrContext, location: Location, cond: RegionRef, body: RegionRef) -> While {
    let op = OpBuilder::new(location, "hl", "while")
        .region(cond)
        .region(body)
        .create(ctx);
    While(op)
}

define_op! {
    /// `hl.do`: regions are `body` and `cond`; the body runs before the first test.
    pub struct Do("hl", "do") {
        regions: 2,
    }
}

impl Do {
    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn cond_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[1]
    }
}

pub fn r#do(ctx: &mut IrContext, location: Location, body: RegionRef, cond: RegionRef) -> Do {
    let op = OpBuilder::new(location, "hl", "do")
        .region(body)
        .region(cond)
        .create(ctx);
    Do(op)
}

define_op! {
    /// `hl.for`: regions are `cond`, `incr` and `body`.
    pub struct For("hl", "for") {
        regions: 3,
    }
}

impl For {
    pub fn cond_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn incr_region(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[1]
    }

    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[2]
    }
}

pub fn r#for(
    ctx: &mut IrContext,
    location: Location,
    cond: RegionRef,
    incr: RegionRef,
    body: RegionRef,
) -> For {
    let op = OpBuilder::new(location, "hl", "for")
        .region(cond)
        .region(incr)
        .region(body)
        .create(ctx);
    For(op)
}

/// The loop constructs that own their own `break`/`continue` targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    While,
    Do,
    For,
}

impl LoopKind {
    /// Classify `op` as one of the not-yet-lowered loop constructs.
    pub fn of(ctx: &IrContext, op: OpRef) -> Option<LoopKind> {
        if While::matches(ctx, op) {
            Some(LoopKind::While)
        } else if Do::matches(ctx, op) {
            Some(LoopKind::Do)
        } else if For::matches(ctx, op) {
            Some(LoopKind::For)
        } else {
            None
        }
    }
}

// ============================================================================
// Jumps and yields
// ============================================================================

define_op! {
    /// `hl.break`: leave the innermost enclosing loop.
    pub struct Break("hl", "break") {}
}

pub fn r#break(ctx: &mut IrContext, location: Location) -> Break {
    let op = OpBuilder::new(location, "hl", "break").create(ctx);
    Break(op)
}

define_op! {
    /// `hl.continue`: start the next iteration of the innermost enclosing loop.
    pub struct Continue("hl", "continue") {}
}

pub fn r#continue(ctx: &mut IrContext, location: Location) -> Continue {
    let op = OpBuilder::new(location, "hl", "continue").create(ctx);
    Continue(op)
}

define_op! {
    /// `hl.return`: explicit return, with or without a value.
    pub struct Return("hl", "return") {}
}

impl Return {
    pub fn values<'a>(&self, ctx: &'a IrContext) -> &'a [ValueRef] {
        ctx.op_operands(self.0)
    }
}

pub fn r#return(
    ctx: &mut IrContext,
    location: Location,
    values: impl IntoIterator<Item = ValueRef>,
) -> Return {
    let op = OpBuilder::new(location, "hl", "return")
        .operands(values)
        .create(ctx);
    Return(op)
}

define_op! {
    /// `hl.cond_yield`: soft terminator carrying a condition value out of a
    /// condition region.
    pub struct CondYield("hl", "cond_yield") {
        operands: 1,
    }
}

impl CondYield {
    pub fn value(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[0]
    }
}

pub fn cond_yield(ctx: &mut IrContext, location: Location, value: ValueRef) -> CondYield {
    let op = OpBuilder::new(location, "hl", "cond_yield")
        .operand(value)
        .create(ctx);
    CondYield(op)
}
