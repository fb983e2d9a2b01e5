//! Table-driven derivation of capacitor geometry.
//!
//! A device is described by a [`CapRules`] record: an ordered list of
//! rectangles derived from a reference rectangle, the via arrays to drop
//! into some of them, an optional guard ring and two label anchors.

use pcell::error::{ErrorSource, Result};
use pcell::layout::cell::{ShapeSet, TextElement};
use pcell::layout::elements::via::generators::ViaArray;
use pcell::layout::elements::via::ViaSpec;
use pcell::layout::layers::{LayerSpec, Layers};
use pcgeom::ring::Ring;
use pcgeom::{Dims, ExpandMode, Point, Rect, Side};

use crate::constants::GRID;

/// How a rectangle is derived.
///
/// Indices refer to rectangles derived earlier by the same rule list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Derive {
    /// The reference grown by the given amount on every side.
    Expand(Dims),
    /// The same footprint as an earlier rectangle.
    Match(usize),
    /// An earlier rectangle grown by the given amount on every side.
    ExpandFrom(usize, Dims),
    /// A strip of an earlier rectangle hugging one of its sides.
    Strip {
        from: usize,
        side: Side,
        thickness: i64,
    },
}

/// A rectangle drawn on `layer`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DeriveRule {
    pub layer: &'static str,
    pub rule: Derive,
}

impl DeriveRule {
    pub const fn new(layer: &'static str, rule: Derive) -> Self {
        Self { layer, rule }
    }

    /// The reference rectangle itself.
    pub const fn reference(layer: &'static str) -> Self {
        Self::new(layer, Derive::Expand(Dims::new(0, 0)))
    }
}

/// A via array filling a derived rectangle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ViaRule {
    pub layer: &'static str,
    pub region: usize,
    pub spec: ViaSpec,
}

/// Where a label is placed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Anchor {
    /// The center of a derived rectangle.
    Center(usize),
    /// Centered horizontally on `outer`, halfway between the bottoms of
    /// `outer` and `inner`.
    BottomMargin { outer: usize, inner: usize },
}

/// A label on the label purpose of `layer`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LabelRule {
    pub layer: &'static str,
    pub anchor: Anchor,
}

/// A contacted diffusion ring around a derived rectangle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GuardRingRule {
    pub around: usize,
    pub spacing: i64,
    pub width: i64,
    pub implant_enclosure: i64,
    pub diffusion: &'static str,
    pub implant: &'static str,
    pub metal: &'static str,
    pub contact: &'static str,
    pub contact_spec: ViaSpec,
}

/// The complete construction record of one device configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CapRules {
    pub shapes: Vec<DeriveRule>,
    pub vias: Vec<ViaRule>,
    pub guard_ring: Option<GuardRingRule>,
    /// Top (gate or top plate) and bottom (source/drain or bottom plate) labels.
    pub labels: [LabelRule; 2],
}

impl CapRules {
    /// Derives every rectangle, via and label from `reference`.
    ///
    /// `labels` holds the top and bottom label text, or [`None`] when the
    /// device is not labeled. Every layer is resolved before anything is
    /// drawn.
    pub fn apply(
        &self,
        reference: Rect,
        labels: Option<(&str, &str)>,
        layers: &Layers,
    ) -> Result<ShapeSet> {
        let shape_layers = self
            .shapes
            .iter()
            .map(|r| layers.drawing(r.layer))
            .collect::<Result<Vec<_>>>()?;
        let via_layers = self
            .vias
            .iter()
            .map(|r| layers.drawing(r.layer))
            .collect::<Result<Vec<_>>>()?;
        let ring_layers = self
            .guard_ring
            .as_ref()
            .map(|g| g.layers(layers))
            .transpose()?;
        let label_layers = match labels {
            Some(_) => Some([
                layers.label(self.labels[0].layer)?,
                layers.label(self.labels[1].layer)?,
            ]),
            None => None,
        };

        let mut shapes = ShapeSet::new();
        let mut rects: Vec<Rect> = Vec::with_capacity(self.shapes.len());
        for (rule, layer) in self.shapes.iter().zip(shape_layers) {
            let rect = derive(&rects, reference, rule.rule)?;
            rects.push(shapes.add_rect(layer, rect));
        }

        for (rule, layer) in self.vias.iter().zip(via_layers) {
            let region = *get(&rects, rule.region)?;
            let vias = ViaArray::with_grid(region, rule.spec, layer, GRID);
            log::debug!(
                "{} array of {:?} cuts in {region:?}",
                rule.layer,
                vias.dims()
            );
            shapes.extend(&vias);
        }

        if let (Some(ring), Some(ring_layers)) = (&self.guard_ring, ring_layers) {
            ring.draw(*get(&rects, ring.around)?, ring_layers, &mut shapes);
        }

        if let (Some((top, bot)), Some([top_layer, bot_layer])) = (labels, label_layers) {
            let top_loc = anchor(&rects, self.labels[0].anchor)?;
            let bot_loc = anchor(&rects, self.labels[1].anchor)?;
            shapes.add_label(TextElement::new(top, top_loc, top_layer));
            shapes.add_label(TextElement::new(bot, bot_loc, bot_layer));
        }

        Ok(shapes)
    }
}

struct RingLayers {
    diffusion: LayerSpec,
    implant: LayerSpec,
    metal: LayerSpec,
    contact: LayerSpec,
}

impl GuardRingRule {
    fn layers(&self, layers: &Layers) -> Result<RingLayers> {
        Ok(RingLayers {
            diffusion: layers.drawing(self.diffusion)?,
            implant: layers.drawing(self.implant)?,
            metal: layers.drawing(self.metal)?,
            contact: layers.drawing(self.contact)?,
        })
    }

    fn draw(&self, around: Rect, layers: RingLayers, shapes: &mut ShapeSet) {
        let ring = Ring::builder()
            .inner(around.expand(self.spacing))
            .uniform_width(self.width)
            .build();
        let implant = Ring::builder()
            .inner(ring.inner().expand(-self.implant_enclosure))
            .uniform_width(self.width + 2 * self.implant_enclosure)
            .build();

        for tile in ring.tiles() {
            shapes.add_rect(layers.diffusion.clone(), tile);
        }
        for tile in implant.tiles() {
            shapes.add_rect(layers.implant.clone(), tile);
        }
        for tile in ring.tiles() {
            shapes.add_rect(layers.metal.clone(), tile);
        }
        for tile in ring.tiles() {
            let vias = ViaArray::with_grid(tile, self.contact_spec, layers.contact.clone(), GRID);
            shapes.extend(&vias);
        }
    }
}

fn get(rects: &[Rect], idx: usize) -> Result<&Rect> {
    rects.get(idx).ok_or_else(|| {
        ErrorSource::Internal(format!(
            "construction rule refers to rectangle {idx}, but only {} are derived",
            rects.len()
        ))
        .into()
    })
}

fn derive(rects: &[Rect], reference: Rect, rule: Derive) -> Result<Rect> {
    Ok(match rule {
        Derive::Expand(dims) => reference.expand_dims(dims, ExpandMode::All),
        Derive::Match(idx) => *get(rects, idx)?,
        Derive::ExpandFrom(idx, dims) => get(rects, idx)?.expand_dims(dims, ExpandMode::All),
        Derive::Strip {
            from,
            side,
            thickness,
        } => get(rects, from)?.side_strip(side, thickness),
    })
}

fn anchor(rects: &[Rect], anchor: Anchor) -> Result<Point> {
    Ok(match anchor {
        Anchor::Center(idx) => get(rects, idx)?.center(),
        Anchor::BottomMargin { outer, inner } => {
            let (outer, inner) = (get(rects, outer)?, get(rects, inner)?);
            Point::new(
                outer.center().x,
                (outer.bottom() + inner.bottom()).div_euclid(2),
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gf180Pdk;

    fn square(side: i64) -> Rect {
        Rect::new(Point::zero(), Point::new(side, side))
    }

    #[test]
    fn rules_refer_to_earlier_rectangles() {
        let layers = Gf180Pdk::layers().unwrap();
        let rules = CapRules {
            shapes: vec![
                DeriveRule::reference("metal2"),
                DeriveRule::new("metal1", Derive::ExpandFrom(0, Dims::square(100))),
                DeriveRule::new("cap_mk", Derive::Match(1)),
                DeriveRule::new(
                    "mim_l_mk",
                    Derive::Strip {
                        from: 0,
                        side: Side::Bot,
                        thickness: 50,
                    },
                ),
            ],
            vias: vec![],
            guard_ring: None,
            labels: [
                LabelRule {
                    layer: "metal2",
                    anchor: Anchor::Center(0),
                },
                LabelRule {
                    layer: "metal1",
                    anchor: Anchor::BottomMargin { outer: 1, inner: 0 },
                },
            ],
        };
        let shapes = rules
            .apply(square(1_000), Some(("a", "b")), &layers)
            .unwrap();
        let rects: Vec<_> = shapes
            .elems()
            .iter()
            .filter_map(|e| e.inner().as_rect())
            .collect();
        assert_eq!(rects[1], Rect::new(Point::new(-100, -100), Point::new(1_100, 1_100)));
        assert_eq!(rects[2], rects[1]);
        assert_eq!(rects[3], Rect::new(Point::zero(), Point::new(1_000, 50)));
        assert_eq!(shapes.labels()[0].loc, Point::new(500, 500));
        assert_eq!(shapes.labels()[1].loc, Point::new(500, -50));
    }

    #[test]
    fn dangling_index_is_an_internal_error() {
        let layers = Gf180Pdk::layers().unwrap();
        let rules = CapRules {
            shapes: vec![DeriveRule::new("metal1", Derive::Match(3))],
            vias: vec![],
            guard_ring: None,
            labels: [
                LabelRule {
                    layer: "metal1",
                    anchor: Anchor::Center(0),
                },
                LabelRule {
                    layer: "metal1",
                    anchor: Anchor::Center(0),
                },
            ],
        };
        let err = rules.apply(square(100), None, &layers).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::Internal(_)));
    }

    #[test]
    fn missing_layers_fail_before_drawing() {
        let layers = Gf180Pdk::layers().unwrap();
        let rules = CapRules {
            shapes: vec![
                DeriveRule::reference("metal1"),
                DeriveRule::reference("metal9"),
            ],
            vias: vec![],
            guard_ring: None,
            labels: [
                LabelRule {
                    layer: "metal1",
                    anchor: Anchor::Center(0),
                },
                LabelRule {
                    layer: "metal1",
                    anchor: Anchor::Center(0),
                },
            ],
        };
        let err = rules.apply(square(100), None, &layers).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::LayerNotFound(_)));
    }

    #[test]
    fn guard_ring_tiles_do_not_overlap() {
        let layers = Gf180Pdk::layers().unwrap();
        let rule = GuardRingRule {
            around: 0,
            spacing: 2_500,
            width: 360,
            implant_enclosure: 160,
            diffusion: "comp",
            implant: "pplus",
            metal: "metal1",
            contact: "contact",
            contact_spec: crate::constants::GUARD_RING_CONTACT,
        };
        let mut shapes = ShapeSet::new();
        let around = square(2_000);
        rule.draw(around, rule.layers(&layers).unwrap(), &mut shapes);

        let comp = layers.drawing("comp").unwrap();
        let tiles: Vec<_> = shapes.rects_on(&comp).collect();
        assert_eq!(tiles.len(), 4);
        for (i, a) in tiles.iter().enumerate() {
            assert!(!a.overlaps(&around.expand(2_500)));
            for b in &tiles[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
        let contact = layers.drawing("contact").unwrap();
        assert!(shapes.rects_on(&contact).count() > 0);
    }
}
