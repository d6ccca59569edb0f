//! Input/output helpers.
//!
//! - configuration files, TOML or JSON (`config`)
//! - result JSON read/write (`export`)

pub mod config;
pub mod export;

pub use config::*;
pub use export::*;
