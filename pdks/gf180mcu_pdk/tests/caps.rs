use std::sync::Arc;

use gf180mcu_pdk::cap::{CapDevice, CapParams};
use gf180mcu_pdk::Gf180Pdk;
use itertools::Itertools;
use pcell::deps::arcstr::{self, ArcStr};
use pcell::error::{ErrorContext, ErrorSource};
use pcell::layout::cell::ShapeSet;
use pcell::layout::convert::gds::{from_gds, to_gds};
use pcell::layout::db::{GdsMaterializer, InMemoryMaterializer, LayoutDb};
use pcell::layout::layers::Layers;
use pcell::pcell::Pcell;
use pcell::units::SiPrefix;
use pcgeom::{Dims, Point, Rect};

mod common;
use common::{labeled, out_path, params};

fn build(device: CapDevice, params: &CapParams, layers: &Layers) -> ShapeSet {
    let spec = device.coerce(params).unwrap();
    device.build(&spec, layers).unwrap()
}

#[test]
fn test_builds_are_deterministic() {
    let layers = Gf180Pdk::layers().unwrap();
    for device in CapDevice::ALL {
        for variant in device.allowed_variants() {
            let mut p = labeled(2.5, 3.5, "top", "bot");
            p.variant = Some(ArcStr::from(variant.as_str()));
            assert_eq!(build(device, &p, &layers), build(device, &p, &layers));
        }
    }
}

#[test]
fn test_contacts_sit_inside_metal1() {
    let layers = Gf180Pdk::layers().unwrap();
    let mut p = params(2.0, 3.0);
    p.volt = arcstr::literal!("5/6V");
    p.variant = Some(arcstr::literal!("guard_ring"));
    let shapes = build(CapDevice::Nmos, &p, &layers);

    let metal1: Vec<_> = shapes
        .rects_on(&layers.drawing("metal1").unwrap())
        .collect();
    let contacts: Vec<_> = shapes
        .rects_on(&layers.drawing("contact").unwrap())
        .collect();

    // Four pads plus four guard ring tiles.
    assert_eq!(metal1.len(), 8);
    assert!(!contacts.is_empty());
    for contact in &contacts {
        assert_eq!(contact.dims(), Dims::square(220));
        assert!(metal1.iter().any(|m| m.contains_rect(contact)));
    }
    for (a, b) in contacts.iter().tuple_combinations() {
        assert!(!a.overlaps(b));
    }
}

#[test]
fn test_mim_vias_are_centered() {
    let layers = Gf180Pdk::layers().unwrap();
    let shapes = build(CapDevice::Mim, &params(5.0, 5.0), &layers);

    let upper = Rect::new(Point::zero(), Point::new(5_000, 5_000));
    let usable = upper.shrink_dims(Dims::square(400)).unwrap();
    let vias: Vec<_> = shapes
        .rects_on(&layers.drawing("via2").unwrap())
        .collect();
    assert_eq!(vias.len(), 36);
    assert!(vias.iter().all(|v| usable.contains_rect(v)));
    for (a, b) in vias.iter().tuple_combinations() {
        assert!(!a.overlaps(b));
    }

    let left = vias.iter().map(|v| v.left()).min().unwrap() - usable.left();
    let right = usable.right() - vias.iter().map(|v| v.right()).max().unwrap();
    let bot = vias.iter().map(|v| v.bottom()).min().unwrap() - usable.bottom();
    let top = usable.top() - vias.iter().map(|v| v.top()).max().unwrap();
    assert!((left - right).abs() <= 5);
    assert!((bot - top).abs() <= 5);
}

#[test]
fn test_mim_b_metal_levels() {
    let layers = Gf180Pdk::layers().unwrap();
    for (level, upper, bottom, via) in [
        ("default", "metal4", "metal3", "via3"),
        ("M4", "metal4", "metal3", "via3"),
        ("M5", "metal5", "metal4", "via4"),
        ("M6", "metaltop", "metal5", "via5"),
    ] {
        let mut p = params(6.0, 6.0);
        p.mim_option = arcstr::literal!("MIM-B");
        p.metal_level = ArcStr::from(level);
        let shapes = build(CapDevice::Mim, &p, &layers);

        let plate = Rect::new(Point::zero(), Point::new(6_000, 6_000));
        assert_eq!(
            shapes
                .rects_on(&layers.drawing(upper).unwrap())
                .collect::<Vec<_>>(),
            vec![plate]
        );
        assert_eq!(
            shapes
                .rects_on(&layers.drawing(bottom).unwrap())
                .collect::<Vec<_>>(),
            vec![plate.expand(600)]
        );
        assert!(shapes
            .rects_on(&layers.drawing(via).unwrap())
            .next()
            .is_some());
    }
}

#[test]
fn test_generate_through_gds_exchange() {
    let layers = Arc::new(Gf180Pdk::layers().unwrap());
    let exchange = out_path("test_generate_through_gds_exchange", "exchange.gds");
    let materializer = GdsMaterializer::new(layers.clone(), SiPrefix::Nano, "gf180mcu")
        .with_exchange_file(&exchange);

    let mut db = LayoutDb::new();
    for device in CapDevice::ALL {
        let p = labeled(3.0, 4.0, "PLUS", "MINUS");
        let cell = device
            .generate(&p, &layers, &materializer, &mut db)
            .unwrap();
        assert_eq!(cell.name(), &device.cell_name());
        assert!(cell.shapes().geometry_eq(&build(device, &p, &layers)));
        assert_eq!(cell.labels()[0].string.as_str(), "PLUS");
    }
    assert_eq!(db.len(), CapDevice::ALL.len());

    let path = out_path("test_generate_through_gds_exchange", "caps.gds");
    to_gds(&path, "gf180mcu", db.cells().map(|c| &**c), &layers, SiPrefix::Nano).unwrap();
    let cells = from_gds(&path, &layers, SiPrefix::Nano).unwrap();
    assert_eq!(cells.len(), db.len());
    for cell in cells {
        assert_eq!(&cell, db.try_get(cell.name()).unwrap().as_ref());
    }
}

#[test]
fn test_empty_labels_survive_gds_exchange() {
    let layers = Arc::new(Gf180Pdk::layers().unwrap());
    let exchange = out_path("test_empty_labels_survive_gds_exchange", "exchange.gds");
    let materializer = GdsMaterializer::new(layers.clone(), SiPrefix::Nano, "gf180mcu")
        .with_exchange_file(&exchange);

    let mut db = LayoutDb::new();
    for device in CapDevice::ALL {
        let p = labeled(2.0, 2.0, "", "");
        let cell = device
            .generate(&p, &layers, &materializer, &mut db)
            .unwrap();
        assert!(cell.shapes().geometry_eq(&build(device, &p, &layers)));
        assert_eq!(cell.labels().len(), 2);
        assert!(cell.labels().iter().all(|l| l.string.is_empty()));
    }
    assert_eq!(db.len(), CapDevice::ALL.len());
}

#[test]
fn test_mim_a_ignores_metal_level() {
    let layers = Gf180Pdk::layers().unwrap();
    let reference = build(CapDevice::Mim, &params(4.0, 4.0), &layers);
    for level in ["M4", "M5", "M6"] {
        let mut p = params(4.0, 4.0);
        p.metal_level = ArcStr::from(level);
        let shapes = build(CapDevice::Mim, &p, &layers);
        assert_eq!(shapes, reference);
        assert!(shapes
            .rects_on(&layers.drawing("via2").unwrap())
            .next()
            .is_some());
    }
}

#[test]
fn test_failed_generation_registers_nothing() {
    let layers = Gf180Pdk::layers().unwrap();
    let mut db = LayoutDb::new();

    let mut p = params(6.0, 6.0);
    p.mim_option = arcstr::literal!("MIM-B");
    p.metal_level = arcstr::literal!("M7");
    let err = CapDevice::Mim
        .generate(&p, &layers, &InMemoryMaterializer, &mut db)
        .unwrap_err();
    assert!(matches!(
        err.source(),
        ErrorSource::UnsupportedConfiguration(_)
    ));
    assert!(err
        .context()
        .contains(&ErrorContext::Build(arcstr::literal!("cap_mim"))));

    let mut p = params(1.0, 2.0);
    p.volt = arcstr::literal!("12V");
    let err = CapDevice::Pmos
        .generate(&p, &layers, &InMemoryMaterializer, &mut db)
        .unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
    assert!(db.is_empty());
}
