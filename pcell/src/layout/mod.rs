//! APIs for layout generation.

pub mod cell;
pub mod convert;
pub mod db;
pub mod elements;
pub mod error;
pub mod layers;
