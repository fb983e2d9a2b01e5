//! Core geometric types for parametric cell layout.
//!
//! All coordinates are integer database units. The PDK decides how large one
//! unit is; for GF180MCU it is one nanometer.

use std::fmt::Display;

use array_map::Indexable;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use self::bbox::{Bbox, BoundBox};

pub mod bbox;
pub mod ring;

/// Snaps `pos` to the nearest multiple of `grid`.
pub fn snap_to_grid(pos: i64, grid: i64) -> i64 {
    assert!(grid > 0);

    let rem = pos.rem_euclid(grid);
    if rem <= grid / 2 {
        pos - rem
    } else {
        pos + grid - rem
    }
}

/// Rounds `pos` down to the nearest multiple of `grid`.
pub fn floor_to_grid(pos: i64, grid: i64) -> i64 {
    assert!(grid > 0);
    pos - pos.rem_euclid(grid)
}

/// A point in two-dimensional layout-space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, (0, 0).
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Gets the coordinate associated with direction `dir`.
    pub fn coord(&self, dir: Dir) -> i64 {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }

    #[inline]
    pub fn snap_to_grid(&self, grid: i64) -> Self {
        Self::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Add<Dims> for Point {
    type Output = Self;
    fn add(self, rhs: Dims) -> Self::Output {
        Self::new(self.x + rhs.w, self.y + rhs.h)
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// A one-dimensional span.
#[derive(
    Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq,
)]
pub struct Span {
    start: i64,
    stop: i64,
}

impl Span {
    /// Creates a new [`Span`] between two integers.
    ///
    /// The endpoints are sorted, so `start` may exceed `stop`.
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start: start.min(stop),
            stop: start.max(stop),
        }
    }

    /// Creates a span of the given length that begins at `point` and
    /// extends in the direction of `sign`.
    pub fn with_point_and_length(sign: Sign, point: i64, length: i64) -> Self {
        match sign {
            Sign::Pos => Self::new(point, point + length),
            Sign::Neg => Self::new(point - length, point),
        }
    }

    /// Returns the midpoint of the span, rounded towards negative infinity.
    pub fn center(&self) -> i64 {
        (self.start + self.stop).div_euclid(2)
    }

    #[inline]
    pub fn length(&self) -> i64 {
        self.stop - self.start
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Returns `true` if `other` lies entirely within this span.
    pub fn contains(self, other: Self) -> bool {
        self.start <= other.start && self.stop >= other.stop
    }

    /// Returns `true` if the spans share an interval of nonzero length.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.stop && other.start < self.stop
    }
}

impl From<(i64, i64)> for Span {
    fn from(value: (i64, i64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// An enumeration of axis-aligned directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Dir {
    /// The horizontal, or x-aligned, direction.
    Horiz,
    /// The vertical, or y-aligned, direction.
    Vert,
}

impl Dir {
    /// Returns the perpendicular direction.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl std::ops::Not for Dir {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// Enumeration over possible signs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Sign {
    /// Positive.
    Pos,
    /// Negative.
    Neg,
}

impl std::ops::Not for Sign {
    type Output = Self;
    /// Flips the [`Sign`].
    fn not(self) -> Self::Output {
        match self {
            Self::Pos => Self::Neg,
            Self::Neg => Self::Pos,
        }
    }
}

/// An enumeration of the sides of a axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Side {
    Top,
    Right,
    Bot,
    Left,
}

impl Side {
    /// Gets the direction of the coordinate corresponding to this side.
    ///
    /// Top and bottom edges are y-coordinates, so they are on the **vertical** axis.
    /// Left and right edges are x-coordinates, so they are on the **horizontal** axis.
    pub fn coord_dir(&self) -> Dir {
        match self {
            Side::Top | Side::Bot => Dir::Vert,
            Side::Left | Side::Right => Dir::Horiz,
        }
    }

    /// Returns the opposite side.
    pub fn other(&self) -> Self {
        match self {
            Side::Top => Side::Bot,
            Side::Right => Side::Left,
            Side::Bot => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Returns the sign corresponding to moving towards this side.
    pub fn sign(&self) -> Sign {
        match self {
            Side::Top | Side::Right => Sign::Pos,
            Side::Bot | Side::Left => Sign::Neg,
        }
    }

    /// All four sides, in the order top, right, bottom, left.
    pub fn all() -> [Side; 4] {
        [Side::Top, Side::Right, Side::Bot, Side::Left]
    }
}

impl std::ops::Not for Side {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// A closed polygon with an arbitrary number of vertices.
///
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
#[derive(Debug, Default, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    /// Returns the equivalent [`Rect`] if this polygon is an axis-aligned rectangle.
    ///
    /// A trailing point equal to the first point is ignored.
    pub fn as_rect(&self) -> Option<Rect> {
        let mut pts = self.points.as_slice();
        if pts.len() == 5 && pts[0] == pts[4] {
            pts = &pts[..4];
        }
        if pts.len() != 4 {
            return None;
        }
        let rect = Rect::new(pts[0], pts[2]);
        let corners = [
            rect.p0,
            Point::new(rect.p1.x, rect.p0.y),
            rect.p1,
            Point::new(rect.p0.x, rect.p1.y),
        ];
        if pts.iter().all(|p| corners.contains(p)) && corners.iter().all(|c| pts.contains(c)) {
            Some(rect)
        } else {
            None
        }
    }
}

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    pub p0: Point,
    /// The upper-right corner.
    pub p1: Point,
}

impl Rect {
    /// Creates a new rectangle, sorting the coordinates of the given corners.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle from horizontal and vertical [`Span`]s.
    pub fn from_spans(h: Span, v: Span) -> Self {
        Self {
            p0: Point::new(h.start(), v.start()),
            p1: Point::new(h.stop(), v.stop()),
        }
    }

    /// Returns the center point of the rectangle, rounded towards negative infinity.
    pub fn center(&self) -> Point {
        Point::new(self.hspan().center(), self.vspan().center())
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.p0.y
    }

    #[inline]
    pub fn top(&self) -> i64 {
        self.p1.y
    }

    #[inline]
    pub fn left(&self) -> i64 {
        self.p0.x
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.p1.x
    }

    /// Returns the coordinate of the given side.
    pub fn side(&self, side: Side) -> i64 {
        match side {
            Side::Top => self.top(),
            Side::Right => self.right(),
            Side::Bot => self.bottom(),
            Side::Left => self.left(),
        }
    }

    /// Returns the horizontal span of the rectangle.
    pub fn hspan(&self) -> Span {
        Span::new(self.p0.x, self.p1.x)
    }

    /// Returns the vertical span of the rectangle.
    pub fn vspan(&self) -> Span {
        Span::new(self.p0.y, self.p1.y)
    }

    /// Returns the span of the rectangle along `dir`.
    pub fn span(&self, dir: Dir) -> Span {
        match dir {
            Dir::Horiz => self.hspan(),
            Dir::Vert => self.vspan(),
        }
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns the length of the rectangle along `dir`.
    pub fn length(&self, dir: Dir) -> i64 {
        self.span(dir).length()
    }

    /// Returns the dimensions of the rectangle as [`Dims`].
    #[inline]
    pub fn dims(&self) -> Dims {
        Dims::new(self.width(), self.height())
    }

    /// Expands the rectangle by `amount` on all sides.
    #[inline]
    pub fn expand(&self, amount: i64) -> Self {
        self.expand_dims(Dims::square(amount), ExpandMode::All)
    }

    /// Expands this rectangle by the given dimensions.
    ///
    /// With [`ExpandMode::All`], the left and right edges move out by `dims.w()`
    /// and the top and bottom edges by `dims.h()`, so the total growth is
    /// twice each dimension. The corner modes only move the two named edges.
    pub fn expand_dims(self, dims: Dims, mode: ExpandMode) -> Self {
        use ExpandMode::*;
        let left = match mode {
            All | LowerLeft | UpperLeft => self.p0.x - dims.w(),
            _ => self.p0.x,
        };
        let bot = match mode {
            All | LowerLeft | LowerRight => self.p0.y - dims.h(),
            _ => self.p0.y,
        };
        let right = match mode {
            All | LowerRight | UpperRight => self.p1.x + dims.w(),
            _ => self.p1.x,
        };
        let top = match mode {
            All | UpperLeft | UpperRight => self.p1.y + dims.h(),
            _ => self.p1.y,
        };

        Self::new(Point::new(left, bot), Point::new(right, top))
    }

    /// Shrinks the rectangle by `dims` on every side.
    ///
    /// Returns [`None`] if the rectangle is too small to shrink by that much.
    pub fn shrink_dims(&self, dims: Dims) -> Option<Self> {
        if 2 * dims.w() > self.width() || 2 * dims.h() > self.height() {
            return None;
        }
        Some(Self {
            p0: Point::new(self.p0.x + dims.w(), self.p0.y + dims.h()),
            p1: Point::new(self.p1.x - dims.w(), self.p1.y - dims.h()),
        })
    }

    /// Returns a strip of the given thickness lying inside this rectangle along `side`.
    ///
    /// The strip is clamped to the rectangle if `thickness` exceeds its extent.
    pub fn side_strip(&self, side: Side, thickness: i64) -> Self {
        let dir = side.coord_dir();
        let thickness = thickness.min(self.length(dir));
        let span = Span::with_point_and_length(!side.sign(), self.side(side), thickness);
        match dir {
            Dir::Horiz => Self::from_spans(span, self.vspan()),
            Dir::Vert => Self::from_spans(self.hspan(), span),
        }
    }

    /// Returns `true` if `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.hspan().contains(other.hspan()) && self.vspan().contains(other.vspan())
    }

    /// Returns `true` if the rectangles share an area of nonzero size.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.hspan().overlaps(&other.hspan()) && self.vspan().overlaps(&other.vspan())
    }

    pub fn snap_to_grid(&self, grid: i64) -> Self {
        Self::new(self.p0.snap_to_grid(grid), self.p1.snap_to_grid(grid))
    }
}

/// Specifies how to expand geometry.
///
/// See [`Rect::expand_dims`] for more information.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, Serialize, Deserialize)]
pub enum ExpandMode {
    #[default]
    All,
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

impl From<Bbox> for Rect {
    fn from(r: Bbox) -> Self {
        debug_assert!(!r.is_empty());
        Self { p0: r.p0, p1: r.p1 }
    }
}

/// The primary geometric primitive comprising raw layout.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Shape::Rect(rect) => Some(*rect),
            Shape::Polygon(poly) => poly.as_rect(),
        }
    }
}

/// Common shape operations, dispatched from the [`Shape`] enum to its variants by [mod@enum_dispatch].
#[enum_dispatch]
pub trait ShapeTrait {
    /// Returns an arbitrary [`Point`] on the shape.
    fn point0(&self) -> Point;
    /// Returns `true` if the shape contains [`Point`] `pt`.
    ///
    /// Containment is inclusive of the boundary.
    fn contains(&self, pt: Point) -> bool;
    /// Converts the shape to a [`Polygon`], the most general of shapes.
    fn to_poly(&self) -> Polygon;
}

impl ShapeTrait for Rect {
    fn point0(&self) -> Point {
        self.p0
    }
    fn contains(&self, pt: Point) -> bool {
        self.p0.x <= pt.x && self.p1.x >= pt.x && self.p0.y <= pt.y && self.p1.y >= pt.y
    }
    fn to_poly(&self) -> Polygon {
        Polygon {
            points: vec![
                self.p0,
                Point::new(self.p1.x, self.p0.y),
                self.p1,
                Point::new(self.p0.x, self.p1.y),
            ],
        }
    }
}

impl ShapeTrait for Polygon {
    fn point0(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    /// Even-odd ray casting, with points on an edge counted as inside.
    fn contains(&self, pt: Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let on_segment = (b.x - a.x) * (pt.y - a.y) == (b.y - a.y) * (pt.x - a.x)
                && pt.x >= a.x.min(b.x)
                && pt.x <= a.x.max(b.x)
                && pt.y >= a.y.min(b.y)
                && pt.y <= a.y.max(b.y);
            if on_segment {
                return true;
            }
            if (a.y > pt.y) != (b.y > pt.y) {
                let x_cross = a.x as f64
                    + (pt.y - a.y) as f64 * (b.x - a.x) as f64 / (b.y - a.y) as f64;
                if (pt.x as f64) < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn to_poly(&self) -> Polygon {
        self.clone()
    }
}

/// A horizontal and vertical rectangular dimension with no specified location.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct Dims {
    /// The width dimension.
    w: i64,
    /// The height dimension.
    h: i64,
}

impl Dims {
    /// Creates a new [`Dims`] from a width and height.
    pub const fn new(w: i64, h: i64) -> Self {
        Self { w, h }
    }

    /// Creates a new [`Dims`] with width and height equal to `value`.
    pub const fn square(value: i64) -> Self {
        Self { w: value, h: value }
    }

    /// Returns the dimension in the specified direction.
    pub fn dim(&self, dir: Dir) -> i64 {
        match dir {
            Dir::Vert => self.h,
            Dir::Horiz => self.w,
        }
    }

    #[inline]
    pub fn w(&self) -> i64 {
        self.w
    }

    #[inline]
    pub fn h(&self) -> i64 {
        self.h
    }
}

impl std::ops::Add<Dims> for Dims {
    type Output = Self;
    fn add(self, rhs: Dims) -> Self::Output {
        Self::new(self.w + rhs.w, self.h + rhs.h)
    }
}

impl std::ops::Sub<Dims> for Dims {
    type Output = Self;
    fn sub(self, rhs: Dims) -> Self::Output {
        Self::new(self.w - rhs.w, self.h - rhs.h)
    }
}

impl std::ops::Mul<i64> for Dims {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self::Output {
        Self::new(self.w * rhs, self.h * rhs)
    }
}

impl std::ops::Mul<(usize, usize)> for Dims {
    type Output = Self;
    fn mul(self, rhs: (usize, usize)) -> Self::Output {
        Self::new(self.w * rhs.0 as i64, self.h * rhs.1 as i64)
    }
}

impl BoundBox for Shape {
    fn bbox(&self) -> Bbox {
        match self {
            Shape::Rect(r) => r.bbox(),
            Shape::Polygon(p) => p.points.bbox(),
        }
    }
}
