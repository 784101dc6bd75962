// logroll - app/mod.rs
//
// Application layer: the sink, its console mirror, the rotation monitor,
// and the logger facade tying them together.

pub mod console;
pub mod logger;
pub mod monitor;
pub mod sink;
