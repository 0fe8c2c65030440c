//! Structural checks for a lowered module.
//!
//! Each check appends [`Violation`]s to a [`ValidationReport`]:
//!
//! - terminators: at most one per block and only as its last op; every
//!   block of a multi-block region ends in a hard terminator
//! - lowering: no structured `hl` control flow and no implicit return left
//! - use lists: every operand is recorded in its value's use list and the
//!   use lists name nothing else

use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::ops::ControlFlow;

use derive_more::Display;

use super::context::IrContext;
use super::dialect::{core, hl};
use super::ops::ArenaDialectOp;
use super::refs::{BlockRef, OpRef, RegionRef, ValueRef};
use super::rewrite::ArenaModule;
use super::walk::{self, WalkAction};
use crate::op_interface::{TerminatorKind, Terminators};

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Violation {
    #[display("{block}: terminator {name} ({op}) is followed by {trailing} more op(s)")]
    TerminatorNotLast {
        block: BlockRef,
        op: OpRef,
        name: String,
        trailing: usize,
    },
    #[display("{_0}: block of a multi-block region does not end in a hard terminator")]
    Unterminated(BlockRef),
    #[display("{name} ({op}) was not lowered")]
    Unlowered { op: OpRef, name: String },
    #[display("operand #{index} of {op} is {value}, but {value} does not list that use")]
    MissingUse {
        value: ValueRef,
        op: OpRef,
        index: u32,
    },
    #[display("{value} lists a use by operand #{index} of {op}, which is not there")]
    StaleUse {
        value: ValueRef,
        op: OpRef,
        index: u32,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("validation passed");
        }
        writeln!(f, "{} violation(s):", self.len())?;
        for violation in &self.violations {
            writeln!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Check terminator placement in `region` and every region nested in it.
pub fn check_terminators(ctx: &IrContext, region: RegionRef, report: &mut ValidationReport) {
    check_blocks(ctx, region, report);
    let _ = walk::walk_region::<Infallible>(ctx, region, &mut |op| {
        for &nested in &ctx.op(op).regions {
            check_blocks(ctx, nested, report);
        }
        ControlFlow::Continue(WalkAction::Advance)
    });
}

fn check_blocks(ctx: &IrContext, region: RegionRef, report: &mut ValidationReport) {
    let blocks = &ctx.region(region).blocks;
    for &block in blocks {
        let ops = &ctx.block(block).ops;
        let early = ops
            .iter()
            .enumerate()
            .take(ops.len().saturating_sub(1))
            .filter(|&(_, &op)| Terminators::classify(ctx, op).is_some());
        for (index, &op) in early {
            report.violations.push(Violation::TerminatorNotLast {
                block,
                op,
                name: ctx.op_full_name(op),
                trailing: ops.len() - index - 1,
            });
        }

        if blocks.len() > 1 && Terminators::classify_block(ctx, block) != Some(TerminatorKind::Hard)
        {
            report.violations.push(Violation::Unterminated(block));
        }
    }
}

fn is_structured(ctx: &IrContext, op: OpRef) -> bool {
    hl::If::matches(ctx, op)
        || hl::LoopKind::of(ctx, op).is_some()
        || hl::Break::matches(ctx, op)
        || hl::Continue::matches(ctx, op)
        || hl::Return::matches(ctx, op)
        || hl::CondYield::matches(ctx, op)
        || core::ImplicitReturn::matches(ctx, op)
}

/// Report every structured control-flow op still under `region`.
pub fn check_lowered(ctx: &IrContext, region: RegionRef, report: &mut ValidationReport) {
    let _ = walk::walk_region::<Infallible>(ctx, region, &mut |op| {
        if is_structured(ctx, op) {
            report.violations.push(Violation::Unlowered {
                op,
                name: ctx.op_full_name(op),
            });
        }
        ControlFlow::Continue(WalkAction::Advance)
    });
}

/// Compare the stored use lists with the operands actually present.
///
/// Only values that are defined or used under `region` are looked at, so
/// detached ops elsewhere in the arena do not show up.
pub fn check_use_chains(ctx: &IrContext, region: RegionRef, report: &mut ValidationReport) {
    let mut operands: HashSet<(ValueRef, OpRef, u32)> = HashSet::new();
    let mut seen: HashSet<ValueRef> = HashSet::new();

    block_args_of(ctx, region, &mut seen);
    let _ = walk::walk_region::<Infallible>(ctx, region, &mut |op| {
        for (index, &value) in ctx.op_operands(op).iter().enumerate() {
            operands.insert((value, op, index as u32));
            seen.insert(value);
        }
        seen.extend(ctx.op_results(op));
        for &nested in &ctx.op(op).regions {
            block_args_of(ctx, nested, &mut seen);
        }
        ControlFlow::Continue(WalkAction::Advance)
    });

    for &(value, op, index) in &operands {
        let recorded = ctx
            .uses(value)
            .iter()
            .any(|u| u.user == op && u.operand_index == index);
        if !recorded {
            report
                .violations
                .push(Violation::MissingUse { value, op, index });
        }
    }
    for &value in &seen {
        for u in ctx.uses(value) {
            if !operands.contains(&(value, u.user, u.operand_index)) {
                report.violations.push(Violation::StaleUse {
                    value,
                    op: u.user,
                    index: u.operand_index,
                });
            }
        }
    }
}

fn block_args_of(ctx: &IrContext, region: RegionRef, seen: &mut HashSet<ValueRef>) {
    for &block in &ctx.region(region).blocks {
        seen.extend(ctx.block_args(block).iter().copied());
    }
}

/// Run every check over the module body.
pub fn validate_all(ctx: &IrContext, module: ArenaModule) -> ValidationReport {
    let mut report = ValidationReport::default();
    if let Some(body) = module.body(ctx) {
        check_terminators(ctx, body, &mut report);
        check_lowered(ctx, body, &mut report);
        check_use_chains(ctx, body, &mut report);
    }
    report
}
