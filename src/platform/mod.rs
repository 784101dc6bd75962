// logroll - platform/mod.rs
//
// Platform abstraction layer: wall clock, filesystem helpers, configuration.
// Must NOT depend on: app.

pub mod clock;
pub mod config;
pub mod fs;
