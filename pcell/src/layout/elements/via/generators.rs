//! Via array generators.
//!
//! A [`ViaArray`] tiles a rectangular region with as many cuts as the
//! [`ViaSpec`] allows and centers the resulting grid in the region.

use pcgeom::{floor_to_grid, Dims, Dir, Point, Rect};

use super::ViaSpec;
use crate::layout::cell::Element;
use crate::layout::layers::LayerSpec;
use crate::log;

/// A regular grid of via cuts inside a region.
///
/// The array is computed eagerly on construction, but the cuts themselves
/// are produced lazily by [`ViaArray::rects`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ViaArray {
    /// The region the cuts must stay inside, enclosure included.
    region: Rect,
    spec: ViaSpec,
    layer: LayerSpec,
    nx: usize,
    ny: usize,
    /// Lower-left corner of the first cut.
    origin: Point,
}

impl ViaArray {
    /// Creates a via array on a grid of one database unit.
    pub fn new(region: Rect, spec: ViaSpec, layer: LayerSpec) -> Self {
        Self::with_grid(region, spec, layer, 1)
    }

    /// Creates a via array whose leftover margins are rounded to multiples of `grid`.
    ///
    /// When the leftover space does not split evenly, the extra grid unit
    /// goes to the top and right margins.
    pub fn with_grid(region: Rect, spec: ViaSpec, layer: LayerSpec, grid: i64) -> Self {
        let mut nx = spec.max_n(Dir::Horiz, region.width());
        let mut ny = spec.max_n(Dir::Vert, region.height());
        if nx == 0 || ny == 0 {
            nx = 0;
            ny = 0;
        }

        let origin = if nx == 0 {
            region.p0
        } else {
            let array = spec.array_dims(nx, ny);
            let offset = |dir: Dir| {
                let enc = spec.enclosure().dim(dir);
                let leftover = region.length(dir) - 2 * enc - array.dim(dir);
                region.p0.coord(dir) + enc + floor_to_grid(leftover / 2, grid)
            };
            Point::new(offset(Dir::Horiz), offset(Dir::Vert))
        };

        log::trace!("via array in {region:?}: {nx} x {ny} cuts");

        Self {
            region,
            spec,
            layer,
            nx,
            ny,
            origin,
        }
    }

    /// The number of cuts along x and y.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// The total number of cuts.
    #[inline]
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn region(&self) -> Rect {
        self.region
    }

    #[inline]
    pub fn layer(&self) -> &LayerSpec {
        &self.layer
    }

    /// The bounding box of all cuts, or [`None`] if the array is empty.
    pub fn bbox(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let dims = self.spec.array_dims(self.nx, self.ny);
        Some(Rect::new(self.origin, self.origin + dims))
    }

    /// Returns an iterator over the cuts.
    ///
    /// Cuts are produced row by row from the bottom, left to right within
    /// each row. Each call starts a fresh pass.
    pub fn rects(&self) -> ViaRects {
        ViaRects {
            origin: self.origin,
            size: self.spec.size(),
            pitch: self.spec.size() + self.spec.spacing(),
            nx: self.nx,
            total: self.len(),
            idx: 0,
        }
    }

    /// Returns an iterator over the cuts as [`Element`]s on the via layer.
    pub fn elements(&self) -> ViaElements<'_> {
        self.into_iter()
    }
}

/// An iterator over the cuts of a [`ViaArray`].
#[derive(Debug, Clone)]
pub struct ViaRects {
    origin: Point,
    size: Dims,
    pitch: Dims,
    nx: usize,
    total: usize,
    idx: usize,
}

impl Iterator for ViaRects {
    type Item = Rect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.total {
            return None;
        }
        let (ix, iy) = (self.idx % self.nx, self.idx / self.nx);
        self.idx += 1;

        let p0 = self.origin + Point::new(self.pitch.w() * ix as i64, self.pitch.h() * iy as i64);
        Some(Rect::new(p0, p0 + self.size))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ViaRects {}

/// An iterator over the cuts of a [`ViaArray`] as layered [`Element`]s.
#[derive(Debug, Clone)]
pub struct ViaElements<'a> {
    rects: ViaRects,
    layer: &'a LayerSpec,
}

impl<'a> Iterator for ViaElements<'a> {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        self.rects
            .next()
            .map(|rect| Element::new(self.layer.clone(), rect))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rects.size_hint()
    }
}

impl<'a> IntoIterator for &'a ViaArray {
    type Item = Element;
    type IntoIter = ViaElements<'a>;

    fn into_iter(self) -> Self::IntoIter {
        ViaElements {
            rects: self.rects(),
            layer: &self.layer,
        }
    }
}
