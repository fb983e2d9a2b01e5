//! MOS capacitor construction rules.

use pcgeom::{Dims, Side};

use super::rules::{Anchor, CapRules, Derive, DeriveRule, GuardRingRule, LabelRule, ViaRule};
use super::{CapDevice, Variant, VoltageDomain};
use crate::constants::*;

const POLY: usize = 1;
const COMP: usize = 2;

/// Selects the construction record of a MOS capacitor.
///
/// The gate is the reference rectangle. Poly extends past it in y to form
/// the contacted end caps, and comp extends past it in x to form the
/// source/drain strips.
pub(crate) fn rules(device: CapDevice, volt: VoltageDomain, variant: Variant) -> CapRules {
    let mut shapes = vec![
        DeriveRule::reference("mos_cap_mk"),
        DeriveRule::new("poly2", Derive::Expand(Dims::new(0, POLY_END_CAP))),
        DeriveRule::new("comp", Derive::Expand(Dims::new(COMP_SD_EXTENSION, 0))),
    ];
    let implant = match device {
        CapDevice::Nmos | CapDevice::NmosB => "nplus",
        _ => "pplus",
    };
    shapes.push(DeriveRule::new(
        implant,
        Derive::ExpandFrom(COMP, Dims::square(IMPLANT_COMP_ENCLOSURE)),
    ));

    let nwell_enclosure = match volt {
        VoltageDomain::V3_3 => NWELL_COMP_ENCLOSURE,
        VoltageDomain::V5_6 => NWELL_COMP_ENCLOSURE_HV,
    };
    let mut dnwell = None;
    match (device, variant.has_deep_nwell()) {
        (CapDevice::Pmos, false) | (CapDevice::NmosB, _) => {
            shapes.push(DeriveRule::new(
                "nwell",
                Derive::ExpandFrom(COMP, Dims::square(nwell_enclosure)),
            ));
        }
        (CapDevice::Pmos, true) => {
            dnwell = Some(shapes.len());
            shapes.push(DeriveRule::new(
                "dnwell",
                Derive::ExpandFrom(COMP, Dims::square(DNWELL_COMP_ENCLOSURE)),
            ));
        }
        (CapDevice::Nmos, true) => {
            let lvpwell = shapes.len();
            shapes.push(DeriveRule::new(
                "lvpwell",
                Derive::ExpandFrom(COMP, Dims::square(LVPWELL_COMP_ENCLOSURE)),
            ));
            dnwell = Some(shapes.len());
            shapes.push(DeriveRule::new(
                "dnwell",
                Derive::ExpandFrom(lvpwell, Dims::square(DNWELL_LVPWELL_ENCLOSURE)),
            ));
        }
        _ => {}
    }

    if volt == VoltageDomain::V5_6 {
        shapes.push(DeriveRule::new(
            "dualgate",
            Derive::Expand(Dims::square(DUALGATE_ENCLOSURE)),
        ));
    }

    let gate_pads = [Side::Top, Side::Bot].map(|side| {
        shapes.push(DeriveRule::new(
            "metal1",
            Derive::Strip {
                from: POLY,
                side,
                thickness: POLY_END_CAP,
            },
        ));
        shapes.len() - 1
    });
    let sd_pads = [Side::Left, Side::Right].map(|side| {
        shapes.push(DeriveRule::new(
            "metal1",
            Derive::Strip {
                from: COMP,
                side,
                thickness: COMP_SD_EXTENSION,
            },
        ));
        shapes.len() - 1
    });

    let vias = gate_pads
        .iter()
        .map(|&region| (region, POLY_CONTACT))
        .chain(sd_pads.iter().map(|&region| (region, COMP_CONTACT)))
        .map(|(region, spec)| ViaRule {
            layer: "contact",
            region,
            spec,
        })
        .collect();

    let guard_ring = match (variant, dnwell) {
        (Variant::GuardRing, Some(around)) => Some(GuardRingRule {
            around,
            spacing: GUARD_RING_SPACING,
            width: GUARD_RING_WIDTH,
            implant_enclosure: IMPLANT_COMP_ENCLOSURE,
            diffusion: "comp",
            implant: "pplus",
            metal: "metal1",
            contact: "contact",
            contact_spec: GUARD_RING_CONTACT,
        }),
        _ => None,
    };

    CapRules {
        shapes,
        vias,
        guard_ring,
        labels: [
            LabelRule {
                layer: "metal1",
                anchor: Anchor::Center(gate_pads[0]),
            },
            LabelRule {
                layer: "metal1",
                anchor: Anchor::Center(sd_pads[0]),
            },
        ],
    }
}
