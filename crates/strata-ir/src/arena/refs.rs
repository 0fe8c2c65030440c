//! Typed handles into `IrContext` storage.
//!
//! Every handle is a `u32` index. Holding a handle never keeps the entity
//! alive and never implies ownership: a branch target is just a `BlockRef`.

use cranelift_entity::entity_impl;
use std::fmt;

macro_rules! handles {
    ($($(#[$meta:meta])* $name:ident => $prefix:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);
            entity_impl!($name, $prefix);
        )*
    };
}

handles! {
    OpRef => "op";
    /// An op result or a block argument.
    ValueRef => "v";
    BlockRef => "block";
    /// An ordered list of blocks owned by one op.
    RegionRef => "region";
    TypeRef => "ty";
    /// An interned source path.
    PathRef => "path";
}

/// Where a value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// Result `n` of an op.
    OpResult(OpRef, u32),
    /// Argument `n` of a block.
    BlockArg(BlockRef, u32),
}

impl fmt::Display for ValueDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (owner, index) = match *self {
            ValueDef::OpResult(op, index) => (op.to_string(), index),
            ValueDef::BlockArg(block, index) => (block.to_string(), index),
        };
        write!(f, "{owner}#{index}")
    }
}
