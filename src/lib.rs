//! Website security check orchestration.
//!
//! A target URL is validated, then a fixed, ordered list of check units runs
//! against it while progress and partial results are published after every unit.

pub mod api;
pub mod checks;
pub mod config;
pub mod errors;
pub mod input;
pub mod scan;
