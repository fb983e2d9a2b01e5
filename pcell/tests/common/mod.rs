#![allow(dead_code)]

use std::path::PathBuf;

use pcell::layout::layers::{LayerInfo, LayerType, Layers};

pub const BUILD_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");

pub fn out_path(test_name: &str, file_name: &str) -> PathBuf {
    PathBuf::from(BUILD_DIR).join(format!("tests/{test_name}/{file_name}"))
}

const LAYERS_CSV: &str = "layernum,datatype,name,purpose
34,0,metal1,drawing
34,10,metal1,label
35,0,via1,drawing
36,0,metal2,drawing
36,10,metal2,label
";

/// A two-metal layer table.
pub fn layers() -> Layers {
    Layers::from_csv(LAYERS_CSV, |name| {
        let builder = LayerInfo::builder();
        match name {
            "metal1" => builder.metal_idx(1).layer_type(LayerType::Metal),
            "metal2" => builder.metal_idx(2).layer_type(LayerType::Metal),
            "via1" => builder.via_idx(1).layer_type(LayerType::Via),
            _ => builder,
        }
        .build()
        .unwrap()
    })
    .unwrap()
}
