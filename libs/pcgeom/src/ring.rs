//! Rectangular ring geometry.
//!
//! Used for structures that enclose other structures, such as guard rings.

use array_map::ArrayMap;
use serde::{Deserialize, Serialize};

use super::bbox::{Bbox, BoundBox};
use super::{Rect, Side, Sign, Span};

/// A rectangular ring surrounding an enclosed rectangle.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ring {
    /// Vertical span of top segment.
    topv: Span,
    /// Vertical span of bottom segment.
    botv: Span,
    /// Horizontal span of left segment.
    lefth: Span,
    /// Horizontal span of right segment.
    righth: Span,
}

/// Represents all ways [`Ring`] geometry can be specified.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RingContents {
    /// The ring must fit within the given rectangle.
    Outer(Rect),
    /// The ring must enclose the given rectangle.
    Inner(Rect),
}

impl RingContents {
    pub fn rect(&self) -> Rect {
        match self {
            Self::Outer(r) | Self::Inner(r) => *r,
        }
    }

    pub fn is_outer(&self) -> bool {
        matches!(self, Self::Outer(_))
    }
}

#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RingBuilder {
    contents: Option<RingContents>,
    widths: ArrayMap<Side, i64, 4>,
}

impl Ring {
    #[inline]
    pub fn builder() -> RingBuilder {
        RingBuilder::new()
    }

    fn is_valid(&self) -> bool {
        self.topv.start() > self.botv.stop() && self.righth.start() > self.lefth.stop()
    }

    pub fn outer_hspan(&self) -> Span {
        Span::new(self.lefth.start(), self.righth.stop())
    }

    pub fn inner_hspan(&self) -> Span {
        Span::new(self.lefth.stop(), self.righth.start())
    }

    pub fn outer_vspan(&self) -> Span {
        Span::new(self.botv.start(), self.topv.stop())
    }

    pub fn inner_vspan(&self) -> Span {
        Span::new(self.botv.stop(), self.topv.start())
    }

    pub fn outer(&self) -> Rect {
        Rect::from_spans(self.outer_hspan(), self.outer_vspan())
    }

    pub fn inner(&self) -> Rect {
        Rect::from_spans(self.inner_hspan(), self.inner_vspan())
    }

    /// The segment on the given side.
    ///
    /// Top and bottom segments span the full outer width, so they overlap the
    /// left and right segments at the corners.
    #[inline]
    pub fn rect(&self, side: Side) -> Rect {
        match side {
            Side::Top => Rect::from_spans(self.outer_hspan(), self.topv),
            Side::Right => Rect::from_spans(self.righth, self.outer_vspan()),
            Side::Bot => Rect::from_spans(self.outer_hspan(), self.botv),
            Side::Left => Rect::from_spans(self.lefth, self.outer_vspan()),
        }
    }

    /// The segment on the given side, excluding the corner squares.
    #[inline]
    pub fn inner_rect(&self, side: Side) -> Rect {
        match side {
            Side::Top => Rect::from_spans(self.inner_hspan(), self.topv),
            Side::Right => Rect::from_spans(self.righth, self.inner_vspan()),
            Side::Bot => Rect::from_spans(self.inner_hspan(), self.botv),
            Side::Left => Rect::from_spans(self.lefth, self.inner_vspan()),
        }
    }

    /// Four non-overlapping rectangles that together cover the ring.
    ///
    /// The bottom and top segments span the full width; the left and right
    /// segments fill the space between them.
    pub fn tiles(&self) -> [Rect; 4] {
        [
            self.rect(Side::Bot),
            self.rect(Side::Top),
            self.inner_rect(Side::Left),
            self.inner_rect(Side::Right),
        ]
    }
}

impl BoundBox for Ring {
    #[inline]
    fn bbox(&self) -> Bbox {
        self.outer().bbox()
    }
}

impl RingBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the ring.
    ///
    /// # Panics
    ///
    /// Panics if no contents were given, or if the widths leave no hole in
    /// an outer-specified ring.
    pub fn build(&mut self) -> Ring {
        let contents = self.contents.expect("ring contents must be specified");
        let r = contents.rect();

        let sign = if contents.is_outer() {
            Sign::Neg
        } else {
            Sign::Pos
        };

        let topv = Span::with_point_and_length(sign, r.top(), self.widths[Side::Top]);
        let righth = Span::with_point_and_length(sign, r.right(), self.widths[Side::Right]);
        let lefth = Span::with_point_and_length(!sign, r.left(), self.widths[Side::Left]);
        let botv = Span::with_point_and_length(!sign, r.bottom(), self.widths[Side::Bot]);

        let res = Ring {
            topv,
            botv,
            lefth,
            righth,
        };

        assert!(res.is_valid());
        res
    }

    pub fn outer(&mut self, rect: Rect) -> &mut Self {
        self.contents = Some(RingContents::Outer(rect));
        self
    }

    pub fn inner(&mut self, rect: Rect) -> &mut Self {
        self.contents = Some(RingContents::Inner(rect));
        self
    }

    pub fn side_width(&mut self, side: Side, value: i64) -> &mut Self {
        self.widths[side] = value;
        self
    }

    /// Sets the width of all ring edges to the given value.
    pub fn uniform_width(&mut self, value: i64) -> &mut Self {
        for side in Side::all() {
            self.side_width(side, value);
        }
        self
    }
}
