//! Strata IR crate.
//!
//! An arena-backed multi-level IR. The `hl` dialect carries structured
//! control flow (`if`/`while`/`do`/`for` with `break`/`continue`), the `ll`
//! dialect carries the unstructured CFG form, and `core` holds the ops shared
//! by both levels (modules, scopes, implicit returns).

pub mod arena;
pub mod symbol;
pub mod location;
pub mod op_interface;
pub mod ops;

// Re-exported for `register_terminator!` expansions in downstream crates.
#[doc(hidden)]
pub use inventory;

// Re-export smallvec for use in macros and external crates
pub use smallvec;

pub use symbol::Symbol;
pub use location::Span;
pub use op_interface::{TerminatorKind, Terminators};
pub use ops::ConversionError;
