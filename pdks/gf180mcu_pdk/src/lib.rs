//! GlobalFoundries 180nm MCU process support.
//!
//! Provides the layer table and the capacitor generators of the PDK.

use pcell::error::Result;
use pcell::layout::layers::Layers;
use pcell::pdk::Pdk;
use pcell::units::SiPrefix;

pub mod cap;
pub mod constants;
pub mod layers;

#[derive(Debug, Clone, Copy, Default)]
pub struct Gf180Pdk;

impl Gf180Pdk {
    pub fn new() -> Self {
        Self
    }
}

impl Pdk for Gf180Pdk {
    fn name(&self) -> &'static str {
        "gf180mcu"
    }

    fn process(&self) -> &'static str {
        "gf180mcu"
    }

    fn lengths(&self) -> SiPrefix {
        SiPrefix::Nano
    }

    fn layers(&self) -> Result<Layers> {
        Gf180Pdk::layers()
    }

    fn layout_grid(&self) -> i64 {
        constants::GRID
    }
}
