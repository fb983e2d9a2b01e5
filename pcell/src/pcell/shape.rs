//! Creating parametric cells from existing shapes.

use pcgeom::{Point, Rect, Shape};

/// Derives generator parameters from a shape drawn by the user.
///
/// Only rectangles are accepted; the bounding box width maps to the
/// device width and its height to the device length.
pub trait FromShape {
    type Params;

    fn can_create_from_shape(&self, shape: &Shape) -> bool {
        shape.as_rect().is_some()
    }

    /// Derives parameters from a bounding box in database units.
    fn params_from_bbox(&self, bbox: Rect) -> Self::Params;

    /// The placement of the generated cell: the center of the bounding box.
    fn transformation_from_bbox(&self, bbox: Rect) -> Point {
        bbox.center()
    }

    /// Derives parameters from `shape`, or [`None`] if it is not a rectangle.
    fn params_from_shape(&self, shape: &Shape) -> Option<(Self::Params, Point)> {
        if !self.can_create_from_shape(shape) {
            return None;
        }
        let rect = shape.as_rect()?;
        Some((self.params_from_bbox(rect), self.transformation_from_bbox(rect)))
    }
}
