//! Lowering of structured `hl` control flow to `ll` branches.
//!
//! `hl.if` is flattened in place into a conditional branch and a join block.
//! Loops become a `core.scope` whose blocks are wired with `ll.br`,
//! `ll.cond_scope_ret` and the scope-relative exits `ll.scope_ret` and
//! `ll.scope_recurse`. Returns are swapped for `ll.return`.
//!
//! ## Pipeline
//!
//! ```text
//! hl.if / hl.while / hl.do / hl.for / jumps      (structured)
//!        ↓ patterns, pre-order, to fixpoint
//! core.scope + ll.br / ll.cond_br / ll.*scope*    (CFG)
//!        ↓ unreachable block sweep
//! ```
//!
//! ## Example
//!
//! ```text
//! hl.while { %c = ...; hl.cond_yield %c } { hl.break }
//! ```
//!
//! becomes
//!
//! ```text
//! core.scope {
//!   ^entry: ll.br ^cond
//!   ^cond:  %c = ...; %b = hl.implicit_cast %c; ll.cond_scope_ret %b, ^body
//!   ^body:  ll.scope_ret
//! }
//! ```

mod coerce;
mod config;
mod error;
mod patterns;
mod resolver;

pub use coerce::coerce_condition;
pub use config::{LowerCfConfig, ScopeExitPolicy};
pub use error::LowerCfError;
pub use patterns::{ForLowering, IfLowering, LoopLowering, ReturnLowering};
pub use resolver::{JumpKind, JumpTargets, ResolvedJumps, resolve_jumps};

use strata_ir::arena::dialect::{core, hl, ll};
use strata_ir::arena::ops::ArenaDialectOp;
use strata_ir::arena::rewrite::{ApplyResult, ArenaConversionTarget, PatternApplicator};
use strata_ir::arena::{ArenaModule, IrContext, OpRef, walk};
use tracing::debug;

use crate::unreachable_blocks::{self, UnreachableBlocksResult};

/// Report of one run of [`lower_hl_to_ll_cf`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LowerCfResult {
    /// Fixpoint iterations of the pattern applicator.
    pub iterations: usize,
    /// Constructs and returns rewritten.
    pub rewrites: usize,
    /// `ll.scope_ret` / `ll.scope_recurse` ops left for a later stage.
    pub scope_exits: usize,
    /// Blocks removed by the unreachable-block sweep.
    pub removed_blocks: usize,
}

/// The ops the lowering must eliminate; everything else passes through.
pub fn conversion_target() -> ArenaConversionTarget {
    let mut target = ArenaConversionTarget::new();
    target.add_illegal::<hl::If>();
    target.add_illegal::<hl::While>();
    target.add_illegal::<hl::Do>();
    target.add_illegal::<hl::For>();
    target.add_illegal::<hl::Break>();
    target.add_illegal::<hl::Continue>();
    target.add_illegal::<hl::Return>();
    target.add_illegal::<core::ImplicitReturn>();
    target.add_legal_dialect("ll");
    target
}

/// Lower all structured control flow in `module`.
///
/// Any pattern failure aborts the pass and leaves the module partially
/// rewritten; the cleanup sweep only runs after a successful lowering.
pub fn lower_hl_to_ll_cf(
    ctx: &mut IrContext,
    module: ArenaModule,
    config: &LowerCfConfig,
) -> Result<LowerCfResult, LowerCfError> {
    let applicator = PatternApplicator::new()
        .add_pattern(IfLowering)
        .add_pattern(LoopLowering)
        .add_pattern(ForLowering)
        .add_pattern(ReturnLowering)
        .with_max_iterations(config.effective_max_iterations());

    let ApplyResult {
        iterations,
        total_changes,
        ..
    } = applicator.apply(ctx, module, &conversion_target())?;

    let UnreachableBlocksResult { removed_blocks, .. } = if config.cleanup {
        unreachable_blocks::sweep_module(ctx, module)
    } else {
        UnreachableBlocksResult::default()
    };

    // Exits inside swept blocks are gone by now and are not counted.
    let exits = scope_exits(ctx, module);
    if config.scope_exits == ScopeExitPolicy::Reject && !exits.is_empty() {
        return Err(LowerCfError::UnresolvedScopeExit(exits));
    }

    let result = LowerCfResult {
        iterations,
        rewrites: total_changes,
        scope_exits: exits.len(),
        removed_blocks,
    };
    debug!(
        iterations,
        rewrites = total_changes,
        scope_exits = result.scope_exits,
        removed_blocks,
        "lowered hl control flow"
    );
    Ok(result)
}

/// Every `ll.scope_ret` and `ll.scope_recurse` in the module.
fn scope_exits(ctx: &IrContext, module: ArenaModule) -> Vec<OpRef> {
    let Some(body) = module.body(ctx) else {
        return Vec::new();
    };
    let exits: Vec<OpRef> = walk::collect_preorder(ctx, body)
        .into_iter()
        .filter(|&op| ll::ScopeRet::matches(ctx, op) || ll::ScopeRecurse::matches(ctx, op))
        .collect();
    debug!(count = exits.len(), "scope exits after lowering");
    exits
}
