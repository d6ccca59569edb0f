//! Reporting utilities: formatted terminal output and result comparison.

pub mod diff;
pub mod format;

pub use diff::*;
pub use format::*;
