use pcell::error::Result;
use pcell::layout::layers::{LayerInfo, LayerType, Layers};

use crate::Gf180Pdk;

/// The highest metal, drawn on `metaltop`.
const TOP_METAL_IDX: usize = 6;

impl Gf180Pdk {
    /// Builds the GF180MCU layer table.
    ///
    /// Metals are indexed from `metal1` up to `metaltop` (metal 6). Vias are
    /// indexed by the metal below them, with `contact` as via 0.
    pub fn layers() -> Result<Layers> {
        Layers::from_csv(
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/layers.csv")),
            |name| {
                let builder = LayerInfo::builder();
                let builder = if name == "metaltop" {
                    builder
                        .metal_idx(TOP_METAL_IDX)
                        .layer_type(LayerType::Metal)
                } else if let Some(num) = index_suffix(name, "metal") {
                    builder.metal_idx(num).layer_type(LayerType::Metal)
                } else if name == "contact" {
                    builder.via_idx(0).layer_type(LayerType::Via)
                } else if let Some(num) = index_suffix(name, "via") {
                    builder.via_idx(num).layer_type(LayerType::Via)
                } else {
                    let layer_type = match name {
                        "comp" => LayerType::Diffusion,
                        "poly2" => LayerType::Gate,
                        "nwell" | "dnwell" | "lvpwell" => LayerType::Well,
                        "nplus" | "pplus" | "dualgate" => LayerType::Implant,
                        "cap_mk" | "mim_l_mk" | "mos_cap_mk" | "fusetop" | "pr_bndry" => {
                            LayerType::Marker
                        }
                        _ => LayerType::Other,
                    };
                    builder.layer_type(layer_type)
                };
                // Every field has a default, so building cannot fail.
                builder.build().unwrap_or_default()
            },
        )
    }
}

fn index_suffix(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.parse().ok()
}
