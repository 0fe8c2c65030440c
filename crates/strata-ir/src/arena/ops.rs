//! Typed views over arena operations.
//!
//! Provides the `ArenaDialectOp` trait and the `define_op!` macro that
//! generates a `Copy` wrapper around an `OpRef` for one `dialect.name`.

use super::context::IrContext;
use super::refs::OpRef;
use crate::ops::ConversionError;

/// Trait for arena-based dialect operation wrappers.
pub trait ArenaDialectOp: Sized + Copy {
    const DIALECT_NAME: &'static str;
    const OP_NAME: &'static str;

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError>;
    fn op_ref(&self) -> OpRef;

    fn matches(ctx: &IrContext, op: OpRef) -> bool {
        let data = ctx.op(op);
        data.dialect == crate::Symbol::new(Self::DIALECT_NAME)
            && data.name == crate::Symbol::new(Self::OP_NAME)
    }
}

/// Define a typed wrapper for one operation.
///
/// The optional `operands`, `regions` and `successors` entries give the
/// minimum shape `from_op` checks, so accessors on a successfully wrapped op
/// can index without further checks.
///
/// ```
/// use strata_ir::define_op;
///
/// define_op! {
///     /// `demo.loop` operation.
///     pub struct Loop("demo", "loop") {
///         regions: 1,
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_op {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($dialect:literal, $op:literal) {
            $(operands: $operands:literal,)?
            $(regions: $regions:literal,)?
            $(successors: $successors:literal,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        $vis struct $name($crate::arena::OpRef);

        impl $crate::arena::ops::ArenaDialectOp for $name {
            const DIALECT_NAME: &'static str = $dialect;
            const OP_NAME: &'static str = $op;

            fn from_op(
                ctx: &$crate::arena::IrContext,
                op: $crate::arena::OpRef,
            ) -> Result<Self, $crate::ConversionError> {
                if !<Self as $crate::arena::ops::ArenaDialectOp>::matches(ctx, op) {
                    return Err($crate::ConversionError::WrongOperation {
                        expected: concat!($dialect, ".", $op),
                        actual: ctx.op_full_name(op),
                    });
                }
                $(
                    if ctx.op_operands(op).len() < $operands {
                        return Err($crate::ConversionError::MissingOperand(concat!(
                            $dialect, ".", $op
                        )));
                    }
                )?
                $(
                    if ctx.op(op).regions.len() < $regions {
                        return Err($crate::ConversionError::MissingRegion(concat!(
                            $dialect, ".", $op
                        )));
                    }
                )?
                $(
                    if ctx.op(op).successors.len() < $successors {
                        return Err($crate::ConversionError::MissingSuccessor(concat!(
                            $dialect, ".", $op
                        )));
                    }
                )?
                Ok(Self(op))
            }

            fn op_ref(&self) -> $crate::arena::OpRef {
                self.0
            }
        }

        impl $name {
            /// Get the underlying OpRef.
            pub fn op_ref(&self) -> $crate::arena::OpRef {
                self.0
            }
        }
    };
}
