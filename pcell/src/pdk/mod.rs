//! The interface a process design kit provides to device generators.

use crate::error::Result;
use crate::layout::layers::Layers;
use crate::units::SiPrefix;

pub trait Pdk {
    fn name(&self) -> &'static str;

    fn process(&self) -> &'static str;

    /// The size of one layout database unit.
    fn lengths(&self) -> SiPrefix;

    /// Builds the layer table of this PDK.
    ///
    /// Callers should build it once and share it.
    fn layers(&self) -> Result<Layers>;

    /// The grid on which all layout geometry must lie, in database units.
    fn layout_grid(&self) -> i64;
}
