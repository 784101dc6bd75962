// logroll - core/mod.rs
//
// Core logic layer: levels, record formatting, rotation decisions.
// Must NOT touch the filesystem or spawn threads.

pub mod level;
pub mod record;
pub mod rotation;
