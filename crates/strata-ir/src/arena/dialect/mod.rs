//! Arena-based dialect definitions.

pub mod core;
pub mod hl;
pub mod ll;
