//! Conversion between cells and foreign layout formats.

pub mod error;
pub mod gds;
