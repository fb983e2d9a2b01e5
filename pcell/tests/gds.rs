use std::sync::Arc;

use pcell::deps::arcstr;
use pcell::layout::cell::{Cell, ShapeSet, TextElement};
use pcell::layout::convert::gds::{from_gds, to_gds};
use pcell::layout::db::{GdsMaterializer, LayoutDb, Materializer};
use pcell::layout::elements::via::generators::ViaArray;
use pcell::layout::elements::via::ViaSpec;
use pcell::layout::layers::{LayerSpec, Layers, Selector};
use pcell::units::SiPrefix;
use pcgeom::{Dims, Point, Polygon, Rect};

mod common;
use common::{layers, out_path};

fn stack(layers: &Layers, top: &str, bot: &str) -> ShapeSet {
    let m1 = layers.get(Selector::Metal(1)).unwrap();
    let m2 = layers.get(Selector::Metal(2)).unwrap();
    let v1 = layers.get(Selector::Via(1)).unwrap();

    let mut shapes = ShapeSet::new();
    let upper = shapes.add_rect(
        LayerSpec::drawing(m2),
        Rect::new(Point::zero(), Point::new(5_000, 5_000)),
    );
    let lower = shapes.add_rect(LayerSpec::drawing(m1), upper.expand(600));
    let vias = ViaArray::with_grid(
        upper,
        ViaSpec::new(Dims::square(220), Dims::square(500), Dims::square(400)),
        LayerSpec::drawing(v1),
        5,
    );
    shapes.extend(&vias);
    shapes.add_label(TextElement::new(top, upper.center(), LayerSpec::label(m2)));
    shapes.add_label(TextElement::new(bot, lower.center(), LayerSpec::label(m1)));
    shapes
}

#[test]
fn test_gds_round_trip() {
    let layers = layers();
    let path = out_path("test_gds_round_trip", "layout.gds");
    let cell = Cell::new("stack", stack(&layers, "top", "bot"));

    to_gds(&path, "test", [&cell], &layers, SiPrefix::Nano).unwrap();
    let cells = from_gds(&path, &layers, SiPrefix::Nano).unwrap();

    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0], cell);
}

#[test]
fn test_gds_round_trip_ignores_label_text() {
    let layers = Arc::new(layers());
    let path = out_path("test_gds_round_trip_ignores_label_text", "exchange.gds");
    let materializer =
        GdsMaterializer::new(layers.clone(), SiPrefix::Nano, "test").with_exchange_file(&path);

    let mut db = LayoutDb::new();
    for (top, bot) in [("", ""), ("PLUS", "MINUS")] {
        let input = stack(&layers, top, bot);
        let cell = materializer
            .materialize(&mut db, input.clone(), arcstr::literal!("stack"))
            .unwrap();
        assert!(cell.shapes().geometry_eq(&input));
        assert_eq!(cell.labels()[0].string.as_str(), top);
    }
    assert_eq!(db.len(), 1);
    assert!(path.exists());
}

#[test]
fn test_gds_polygons_survive() {
    let layers = layers();
    let path = out_path("test_gds_polygons_survive", "layout.gds");
    let m1 = layers.get(Selector::Name("metal1")).unwrap();

    let mut shapes = ShapeSet::new();
    shapes.push(pcell::layout::cell::Element::new(
        LayerSpec::drawing(m1),
        Polygon {
            points: vec![
                Point::new(0, 0),
                Point::new(1_000, 0),
                Point::new(1_000, 500),
                Point::new(500, 1_000),
                Point::new(0, 1_000),
            ],
        },
    ));
    let cell = Cell::new("poly", shapes);

    to_gds(&path, "test", [&cell], &layers, SiPrefix::Nano).unwrap();
    let cells = from_gds(&path, &layers, SiPrefix::Nano).unwrap();
    assert_eq!(cells[0], cell);
}
