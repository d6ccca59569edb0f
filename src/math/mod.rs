//! Mathematical utilities: scalar root finding.

pub mod roots;

pub use roots::*;
