//! Physical relations: wavelength, Talbot distance, cone-beam magnification.

pub mod talbot;

pub use talbot::*;
