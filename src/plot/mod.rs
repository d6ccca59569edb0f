//! Terminal rendering of resolved layouts.

pub mod sketch;

pub use sketch::*;
