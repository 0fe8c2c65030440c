//! Which ops a conversion must get rid of.
//!
//! Rules name either a whole dialect or one `dialect.op`. An op rule beats
//! the rule for its dialect; an op no rule mentions is legal.

use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;

use crate::arena::context::IrContext;
use crate::arena::ops::ArenaDialectOp;
use crate::arena::refs::{OpRef, RegionRef};
use crate::arena::walk::{self, WalkAction};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalityCheck {
    Legal,
    Illegal,
}

/// `None` as the op name makes a dialect-wide rule.
type RuleKey = (Symbol, Option<Symbol>);

#[derive(Default)]
pub struct ArenaConversionTarget {
    rules: HashMap<RuleKey, LegalityCheck>,
}

impl ArenaConversionTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_legal_dialect(&mut self, dialect: &str) {
        self.rule(dialect, None, LegalityCheck::Legal);
    }

    pub fn add_illegal_dialect(&mut self, dialect: &str) {
        self.rule(dialect, None, LegalityCheck::Illegal);
    }

    pub fn add_legal_op(&mut self, dialect: &str, name: &str) {
        self.rule(dialect, Some(name), LegalityCheck::Legal);
    }

    pub fn add_illegal_op(&mut self, dialect: &str, name: &str) {
        self.rule(dialect, Some(name), LegalityCheck::Illegal);
    }

    /// Mark the op behind a typed wrapper as illegal.
    pub fn add_illegal<T: ArenaDialectOp>(&mut self) {
        self.add_illegal_op(T::DIALECT_NAME, T::OP_NAME);
    }

    fn rule(&mut self, dialect: &str, name: Option<&str>, check: LegalityCheck) {
        let key = (
            Symbol::from_dynamic(dialect),
            name.map(Symbol::from_dynamic),
        );
        self.rules.insert(key, check);
    }

    pub fn is_legal(&self, ctx: &IrContext, op: OpRef) -> LegalityCheck {
        let data = ctx.op(op);
        self.rules
            .get(&(data.dialect, Some(data.name)))
            .or_else(|| self.rules.get(&(data.dialect, None)))
            .copied()
            .unwrap_or(LegalityCheck::Legal)
    }

    /// Every illegal op under `region`, in pre-order.
    pub fn verify(&self, ctx: &IrContext, region: RegionRef) -> Vec<IllegalOp> {
        let mut illegal = Vec::new();
        let _ = walk::walk_region::<()>(ctx, region, &mut |op| {
            if self.is_legal(ctx, op) == LegalityCheck::Illegal {
                let data = ctx.op(op);
                illegal.push(IllegalOp {
                    op,
                    dialect: data.dialect,
                    name: data.name,
                });
            }
            ControlFlow::Continue(WalkAction::Advance)
        });
        illegal
    }
}

/// An op left behind by a conversion, printed as `dialect.name (opN)`.
#[derive(Clone, Debug, PartialEq)]
pub struct IllegalOp {
    pub op: OpRef,
    pub dialect: Symbol,
    pub name: Symbol,
}

impl fmt::Display for IllegalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.dialect, self.name, self.op)
    }
}
