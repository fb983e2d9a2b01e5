//! MIM capacitor construction rules.

use pcell::error::{PcellError, Result};
use pcgeom::{Dims, Side};

use super::rules::{Anchor, CapRules, Derive, DeriveRule, LabelRule, ViaRule};
use super::{MetalLevel, MimOption};
use crate::constants::{MIM_BOTTOM_ENCLOSURE, MIM_L_MK_WIDTH, MIM_VIA};

/// The plate and via layers of a MIM capacitor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MimLayers {
    pub upper: &'static str,
    pub bottom: &'static str,
    pub via: &'static str,
}

impl MimLayers {
    const fn new(upper: &'static str, bottom: &'static str, via: &'static str) -> Self {
        Self { upper, bottom, via }
    }
}

/// Looks up the plate layers of a MIM option and metal level.
///
/// MIM-A always sits between metal2 and metal3 and ignores the metal level.
/// MIM-B sits below the selected top metal, metal4 by default.
pub fn mim_layers(option: MimOption, level: MetalLevel) -> Result<MimLayers> {
    use MetalLevel::*;
    match (option, level) {
        (MimOption::A, _) => Ok(MimLayers::new("metal3", "metal2", "via2")),
        (MimOption::B, Default | Level(4)) => Ok(MimLayers::new("metal4", "metal3", "via3")),
        (MimOption::B, Level(5)) => Ok(MimLayers::new("metal5", "metal4", "via4")),
        (MimOption::B, Level(6)) => Ok(MimLayers::new("metaltop", "metal5", "via5")),
        (option, level) => Err(PcellError::unsupported(format!(
            "metal level {level} is not available for {option}"
        ))),
    }
}

const UPPER: usize = 0;
const FUSETOP: usize = 1;
const BOTTOM: usize = 3;

/// Selects the construction record of a MIM capacitor.
pub(crate) fn rules(option: MimOption, level: MetalLevel) -> Result<CapRules> {
    let layers = mim_layers(option, level)?;
    Ok(CapRules {
        shapes: vec![
            DeriveRule::reference(layers.upper),
            DeriveRule::new("fusetop", Derive::Match(UPPER)),
            DeriveRule::new(
                "mim_l_mk",
                Derive::Strip {
                    from: FUSETOP,
                    side: Side::Bot,
                    thickness: MIM_L_MK_WIDTH,
                },
            ),
            DeriveRule::new(
                layers.bottom,
                Derive::ExpandFrom(UPPER, Dims::square(MIM_BOTTOM_ENCLOSURE)),
            ),
            DeriveRule::new("cap_mk", Derive::Match(BOTTOM)),
        ],
        vias: vec![ViaRule {
            layer: layers.via,
            region: UPPER,
            spec: MIM_VIA,
        }],
        guard_ring: None,
        labels: [
            LabelRule {
                layer: layers.upper,
                anchor: Anchor::Center(UPPER),
            },
            LabelRule {
                layer: layers.bottom,
                anchor: Anchor::BottomMargin {
                    outer: BOTTOM,
                    inner: UPPER,
                },
            },
        ],
    })
}
