//! Lowering passes over strata IR.
//!
//! - [`hl_to_ll_cf`]: structured `hl` control flow to the `ll` CFG form.
//! - [`unreachable_blocks`]: removes blocks no successor edge reaches.

pub mod hl_to_ll_cf;
pub mod unreachable_blocks;

pub use hl_to_ll_cf::{LowerCfConfig, LowerCfError, LowerCfResult, ScopeExitPolicy, lower_hl_to_ll_cf};
pub use unreachable_blocks::{UnreachableBlocksResult, eliminate_unreachable_blocks, sweep_module};
