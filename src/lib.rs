//! `gi-geometry` library crate.
//!
//! Resolves the physical layout of a grating interferometer (distances,
//! grating pitches, duty cycles and radii) from a declarative configuration.
//!
//! The binary (`gigeo`) is a thin wrapper around this library so that:
//!
//! - the resolver is testable without spawning processes
//! - the engine stays free of I/O, CLI and rendering concerns

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod physics;
pub mod plot;
pub mod report;
pub mod sweep;

pub use domain::{Configuration, GeometryResult};
pub use error::{AppError, ResolveError};
pub use geometry::resolve;
