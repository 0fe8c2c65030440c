//! Lowering pipeline for one module.
//!
//! ```text
//! Module (hl.if / hl.while / hl.do / hl.for, hl jumps)
//!     │
//!     ▼
//! lower_hl_to_ll_cf ─► Module (core.scope + ll branches)
//!     │                 unreachable blocks swept
//!     ▼
//! validate ─► terminator discipline, no structured leftovers,
//!             consistent use-chains
//! ```

use derive_more::{Display, From};
use serde::Deserialize;
use strata_ir::arena::validation::{ValidationReport, validate_all};
use strata_ir::arena::{ArenaModule, IrContext};
use strata_passes::{LowerCfConfig, LowerCfError, LowerCfResult, lower_hl_to_ll_cf};
use tracing::{debug, warn};

/// Configuration for [`lower_module`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub lowering: LowerCfConfig,
    /// Run structural validation after lowering. Default: true.
    pub validate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lowering: LowerCfConfig::default(),
            validate: true,
        }
    }
}

/// What the pipeline did to a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    pub lowering: LowerCfResult,
    /// Whether validation ran (and passed).
    pub validated: bool,
}

#[derive(Display, Debug, From)]
pub enum PipelineError {
    #[display("control-flow lowering failed: {_0}")]
    Lowering(LowerCfError),

    #[display("lowered module failed validation:\n{_0}")]
    Validation(ValidationReport),
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Lowering(err) => Some(err),
            PipelineError::Validation(result) => Some(result),
        }
    }
}

/// Lower the structured control flow of `module`, then validate the result.
pub fn lower_module(
    ctx: &mut IrContext,
    module: ArenaModule,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    let lowering = lower_hl_to_ll_cf(ctx, module, &config.lowering)?;

    if config.validate {
        let report = validate_all(ctx, module);
        if !report.is_ok() {
            warn!(violations = report.len(), "validation failed after lowering");
            return Err(report.into());
        }
    }

    debug!(
        module = %module.name(ctx).unwrap_or_else(|| "<anonymous>".into()),
        ?lowering,
        validated = config.validate,
        "pipeline finished"
    );
    Ok(PipelineReport {
        lowering,
        validated: config.validate,
    })
}
