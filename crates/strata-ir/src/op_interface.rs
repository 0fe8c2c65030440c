//! Operation interfaces: terminator classification.
//!
//! Dialects register their terminators with `register_terminator!`; the
//! registry is collected through `inventory` at first access.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::Symbol;
use crate::arena::{BlockRef, IrContext, OpRef};

/// How an operation ends a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminatorKind {
    /// Unconditionally leaves the block: a branch, return or scope exit.
    Hard,
    /// Produces a value for the owning op without being a CFG exit.
    Soft,
}

/// Registration entry for a terminator op.
pub struct TerminatorRegistration {
    pub dialect: &'static str,
    pub op_name: &'static str,
    pub kind: TerminatorKind,
}

inventory::collect!(TerminatorRegistration);

static REGISTRY: LazyLock<HashMap<(Symbol, Symbol), TerminatorKind>> = LazyLock::new(|| {
    inventory::iter::<TerminatorRegistration>
        .into_iter()
        .map(|reg| {
            (
                (
                    Symbol::from_dynamic(reg.dialect),
                    Symbol::from_dynamic(reg.op_name),
                ),
                reg.kind,
            )
        })
        .collect()
});

/// Interface for querying terminator behavior.
pub struct Terminators;

impl Terminators {
    #[doc(hidden)]
    pub const fn register(
        dialect: &'static str,
        op_name: &'static str,
        kind: TerminatorKind,
    ) -> TerminatorRegistration {
        TerminatorRegistration {
            dialect,
            op_name,
            kind,
        }
    }

    /// Classify a single operation.
    pub fn classify(ctx: &IrContext, op: OpRef) -> Option<TerminatorKind> {
        let data = ctx.op(op);
        REGISTRY.get(&(data.dialect, data.name)).copied()
    }

    /// Classify the last operation of a block. Empty blocks have none.
    pub fn classify_block(ctx: &IrContext, block: BlockRef) -> Option<TerminatorKind> {
        ctx.last_op(block).and_then(|op| Self::classify(ctx, op))
    }

    /// Whether the block already ends in any terminator, hard or soft.
    pub fn is_terminated(ctx: &IrContext, block: BlockRef) -> bool {
        Self::classify_block(ctx, block).is_some()
    }
}

/// Register a terminator op.
///
/// ```text
/// register_terminator!(ll::Br, Hard);
/// register_terminator!(hl::CondYield, Soft);
/// ```
#[macro_export]
macro_rules! register_terminator {
    ($op_type:ty, $kind:ident) => {
        $crate::inventory::submit! {
            $crate::op_interface::Terminators::register(
                <$op_type as $crate::arena::ops::ArenaDialectOp>::DIALECT_NAME,
                <$op_type as $crate::arena::ops::ArenaDialectOp>::OP_NAME,
                $crate::op_interface::TerminatorKind::$kind,
            )
        }
    };
}

mod registrations {
    use crate::arena::dialect::{core, hl, ll};

    register_terminator!(ll::Br, Hard);
    register_terminator!(ll::CondBr, Hard);
    register_terminator!(ll::Return, Hard);
    register_terminator!(ll::ScopeRet, Hard);
    register_terminator!(ll::CondScopeRet, Hard);
    register_terminator!(ll::ScopeRecurse, Hard);

    // Structured jumps end their block as well. Nothing may follow them.
    register_terminator!(hl::Break, Hard);
    register_terminator!(hl::Continue, Hard);
    register_terminator!(hl::Return, Hard);
    register_terminator!(core::ImplicitReturn, Hard);

    register_terminator!(hl::CondYield, Soft);
}
