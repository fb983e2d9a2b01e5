//! Layered geometry and the named [`Cell`]s built from it.

use pcgeom::bbox::{Bbox, BoundBox};
use pcgeom::{Point, Rect, Shape};
use serde::{Deserialize, Serialize};

use super::layers::LayerSpec;
use crate::deps::arcstr::ArcStr;
use crate::log::{self, Log};

/// A primitive geometric element.
///
/// Combines a geometric [`Shape`] with a [`LayerSpec`].
#[derive(Debug, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
    /// The layer spec where the element is located.
    pub layer: LayerSpec,
    /// The element's shape.
    pub inner: Shape,
}

impl Element {
    /// Creates a new [`Element`].
    pub fn new(layer: LayerSpec, shape: impl Into<Shape>) -> Self {
        Self {
            layer,
            inner: shape.into(),
        }
    }

    #[inline]
    pub fn layer(&self) -> &LayerSpec {
        &self.layer
    }

    #[inline]
    pub fn inner(&self) -> &Shape {
        &self.inner
    }

    pub fn into_inner(self) -> Shape {
        self.inner
    }
}

impl BoundBox for Element {
    fn bbox(&self) -> Bbox {
        self.inner.bbox()
    }
}

/// A text annotation.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextElement {
    /// The string value of the annotation.
    ///
    /// May be empty.
    pub string: ArcStr,
    /// The location of the annotation
    pub loc: Point,
    /// The layer on which the annotation resides.
    pub layer: LayerSpec,
}

impl TextElement {
    pub fn new(string: impl Into<ArcStr>, loc: Point, layer: LayerSpec) -> Self {
        Self {
            string: string.into(),
            loc,
            layer,
        }
    }
}

/// An ordered collection of layered shapes and labels.
///
/// Insertion order is the drawing order. It carries no meaning beyond making
/// the output deterministic.
#[derive(Debug, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShapeSet {
    elems: Vec<Element>,
    labels: Vec<TextElement>,
}

impl ShapeSet {
    /// Creates an empty [`ShapeSet`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element.
    pub fn push(&mut self, elem: Element) {
        self.elems.push(elem);
    }

    /// Appends a rectangle on `layer`, returning the rectangle for further derivation.
    pub fn add_rect(&mut self, layer: LayerSpec, rect: Rect) -> Rect {
        self.elems.push(Element::new(layer, rect));
        rect
    }

    /// Appends a label.
    pub fn add_label(&mut self, label: TextElement) {
        self.labels.push(label);
    }

    #[inline]
    pub fn elems(&self) -> &[Element] {
        &self.elems
    }

    #[inline]
    pub fn labels(&self) -> &[TextElement] {
        &self.labels
    }

    /// Returns the rectangles drawn on `layer`, in drawing order.
    pub fn rects_on<'a>(&'a self, layer: &'a LayerSpec) -> impl Iterator<Item = Rect> + 'a {
        self.elems
            .iter()
            .filter(move |e| &e.layer == layer)
            .filter_map(|e| e.inner.as_rect())
    }

    /// Returns `true` if the set contains no elements and no labels.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty() && self.labels.is_empty()
    }

    /// Compares the layers, positions and sizes of two shape sets.
    ///
    /// Label text is ignored; label layers and anchors are not.
    pub fn geometry_eq(&self, other: &ShapeSet) -> bool {
        self.elems.len() == other.elems.len()
            && self.labels.len() == other.labels.len()
            && self
                .elems
                .iter()
                .zip(other.elems.iter())
                .all(|(a, b)| a.layer == b.layer && a.inner.as_rect() == b.inner.as_rect())
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.layer == b.layer && a.loc == b.loc)
    }
}

impl Extend<Element> for ShapeSet {
    fn extend<T: IntoIterator<Item = Element>>(&mut self, iter: T) {
        self.elems.extend(iter);
    }
}

impl BoundBox for ShapeSet {
    fn bbox(&self) -> Bbox {
        let bbox = self
            .elems
            .iter()
            .fold(Bbox::empty(), |acc, elem| acc.union(elem.bbox()));
        self.labels
            .iter()
            .fold(bbox, |acc, label| acc.union(label.loc.bbox()))
    }
}

/// A named, immutable aggregate of layered geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The cell's name.
    name: ArcStr,
    /// The cell's geometry.
    shapes: ShapeSet,
}

impl Cell {
    /// Creates a new [`Cell`] owning the given shapes.
    pub fn new(name: impl Into<ArcStr>, shapes: ShapeSet) -> Self {
        Self {
            name: name.into(),
            shapes,
        }
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    #[inline]
    pub fn elems(&self) -> &[Element] {
        self.shapes.elems()
    }

    #[inline]
    pub fn labels(&self) -> &[TextElement] {
        self.shapes.labels()
    }
}

impl BoundBox for Cell {
    fn bbox(&self) -> Bbox {
        self.shapes.bbox()
    }
}

impl Log for Cell {
    fn log(&self) {
        log::debug!(
            "cell {} has {} elements, {} labels, bbox {:?}",
            self.name,
            self.elems().len(),
            self.labels().len(),
            self.bbox().into_rect()
        );
    }
}

#[cfg(test)]
mod tests {
    use pcgeom::Point;
    use slotmap::SlotMap;

    use super::*;
    use crate::layout::layers::LayerKey;

    #[test]
    fn geometry_eq_ignores_label_text() {
        let mut keys: SlotMap<LayerKey, ()> = SlotMap::with_key();
        let m1 = keys.insert(());

        let mut a = ShapeSet::new();
        let r = a.add_rect(
            LayerSpec::drawing(m1),
            Rect::new(Point::zero(), Point::new(100, 100)),
        );
        a.add_label(TextElement::new("G", r.center(), LayerSpec::label(m1)));

        let mut b = a.clone();
        assert!(a.geometry_eq(&b));

        b.labels[0].string = arcstr::literal!("");
        assert!(a.geometry_eq(&b));
        assert_ne!(a, b);

        b.labels[0].loc = Point::zero();
        assert!(!a.geometry_eq(&b));
    }

    #[test]
    fn bbox_covers_elements() {
        let mut keys: SlotMap<LayerKey, ()> = SlotMap::with_key();
        let m1 = keys.insert(());
        let mut set = ShapeSet::new();
        set.add_rect(
            LayerSpec::drawing(m1),
            Rect::new(Point::new(-10, -10), Point::new(0, 0)),
        );
        set.add_rect(
            LayerSpec::drawing(m1),
            Rect::new(Point::new(5, 5), Point::new(20, 30)),
        );
        assert_eq!(
            set.bbox().into_rect(),
            Some(Rect::new(Point::new(-10, -10), Point::new(20, 30)))
        );
        assert_eq!(set.rects_on(&LayerSpec::drawing(m1)).count(), 2);
    }
}
