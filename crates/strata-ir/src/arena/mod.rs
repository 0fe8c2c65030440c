//! Arena-based mutable IR.
//!
//! All entities live in `cranelift-entity` arenas owned by [`IrContext`].
//! Handles are 4-byte typed indices, so branch targets and parent links are
//! plain references rather than ownership. Use lists make in-place mutation
//! and value replacement cheap.

pub mod context;
pub mod dialect;
pub mod ops;
pub mod refs;
pub mod rewrite;
pub mod types;
pub mod validation;
pub mod walk;

pub use context::{
    BlockData, InsertionPoint, IrContext, OpBuilder, OperationData, RegionData, Use, ValueData,
};
pub use refs::{BlockRef, OpRef, PathRef, RegionRef, TypeRef, ValueDef, ValueRef};
pub use rewrite::ArenaModule;
pub use types::{Attribute, Location, PathInterner, TypeData, TypeInterner};
pub use walk::WalkAction;
