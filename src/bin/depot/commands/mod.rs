//! Command implementations

pub mod completions;
pub mod provision;
pub mod status;
pub mod teardown;
pub mod toolchain;
