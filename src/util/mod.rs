// logroll - util/mod.rs
//
// Shared utilities: constants, error types, diagnostic logging.

pub mod constants;
pub mod error;
pub mod logging;
