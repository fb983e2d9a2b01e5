//! Reusable layout elements.

pub mod via;
