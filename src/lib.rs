//! Strata: structured-to-CFG control-flow lowering.
//!
//! The IR lives in [`strata_ir`], the passes in [`strata_passes`]. This crate
//! strings them into the [`pipeline`] a compiler driver calls per module.

pub mod pipeline;

pub use pipeline::{PipelineConfig, PipelineError, PipelineReport, lower_module};
pub use strata_ir::arena::{ArenaModule, IrContext};
pub use strata_passes::{LowerCfConfig, ScopeExitPolicy};
