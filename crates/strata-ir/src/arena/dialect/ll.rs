//! `ll` dialect: unstructured control flow.

use crate::arena::{BlockRef, IrContext, Location, OpBuilder, ValueRef};
use crate::define_op;

define_op! {
    /// `ll.br`: unconditional branch.
    pub struct Br("ll", "br") {
        successors: 1,
    }
}

impl Br {
    pub fn dest(&self, ctx: &IrContext) -> BlockRef {
        ctx.op(self.0).successors[0]
    }
}

pub fn br(ctx: &mut IrContext, location: Location, dest: BlockRef) -> Br {
    let op = OpBuilder::new(location, "ll", "br")
        .successor(dest)
        .create(ctx);
    Br(op)
}

define_op! {
    /// `ll.cond_br`: two-way branch on a boolean.
    pub struct CondBr("ll", "cond_br") {
        operands: 1,
        successors: 2,
    }
}

impl CondBr {
    pub fn cond(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[0]
    }

    pub fn true_dest(&self, ctx: &IrContext) -> BlockRef {
        ctx.op(self.0).successors[0]
    }

    pub fn false_dest(&self, ctx: &IrContext) -> BlockRef {
        ctx.op(self.0).successors[1]
    }
}

pub fn cond_br(
    ctx: &mut IrContext,
    location: Location,
    cond: ValueRef,
    true_dest: BlockRef,
    false_dest: BlockRef,
) -> CondBr {
    let op = OpBuilder::new(location, "ll", "cond_br")
        .operand(cond)
        .successor(true_dest)
        .successor(false_dest)
        .create(ctx);
    CondBr(op)
}

define_op! {
    /// `ll.scope_ret`: leave the innermost enclosing `core.scope`.
    pub struct ScopeRet("ll", "scope_ret") {}
}

impl ScopeRet {
    pub fn values<'a>(&self, ctx: &'a IrContext) -> &'a [ValueRef] {
        ctx.op_operands(self.0)
    }
}

pub fn scope_ret(
    ctx: &mut IrContext,
    location: Location,
    values: impl IntoIterator<Item = ValueRef>,
) -> ScopeRet {
    let op = OpBuilder::new(location, "ll", "scope_ret")
        .operands(values)
        .create(ctx);
    ScopeRet(op)
}

define_op! {
    /// `ll.cond_scope_ret`: continue to `dest` when the condition holds,
    /// otherwise leave the innermost enclosing scope.
    pub struct CondScopeRet("ll", "cond_scope_ret") {
        operands: 1,
        successors: 1,
    }
}

impl CondScopeRet {
    pub fn cond(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[0]
    }

    pub fn dest(&self, ctx: &IrContext) -> BlockRef {
        ctx.op(self.0).successors[0]
    }
}

pub fn cond_scope_ret(
    ctx: &mut IrContext,
    location: Location,
    cond: ValueRef,
    dest: BlockRef,
) -> CondScopeRet {
    let op = OpBuilder::new(location, "ll", "cond_scope_ret")
        .operand(cond)
        .successor(dest)
        .create(ctx);
    CondScopeRet(op)
}

define_op! {
    /// `ll.scope_recurse`: restart the innermost enclosing scope from its entry.
    pub struct ScopeRecurse("ll", "scope_recurse") {}
}

pub fn scope_recurse(ctx: &mut IrContext, location: Location) -> ScopeRecurse {
    let op = OpBuilder::new(location, "ll", "scope_recurse").create(ctx);
    ScopeRecurse(op)
}

define_op! {
    /// `ll.return`: return from the enclosing function.
    pub struct Return("ll", "return") {}
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
    let op = OpBuilder::new(location, "ll", "return")
        .operands(values)
        .create(ctx);
    Return(op)
}
