//! Domain types used throughout the resolver.
//!
//! This module defines:
//!
//! - input configuration (`Configuration`, `GratingConfig`, `SampleConfig`, enums)
//! - the component chain and distance graph
//! - the resolved output (`GeometryResult`, `GratingSpec`, ...)

pub mod chain;
pub mod graph;
pub mod result;
pub mod types;

pub use chain::*;
pub use graph::*;
pub use result::*;
pub use types::*;
