#![allow(dead_code)]

use std::path::PathBuf;

use gf180mcu_pdk::cap::CapParams;

pub const BUILD_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");

pub fn out_path(test_name: &str, file_name: &str) -> PathBuf {
    PathBuf::from(BUILD_DIR).join(format!("tests/{test_name}/{file_name}"))
}

pub fn params(lc: f64, wc: f64) -> CapParams {
    CapParams::builder().lc(lc).wc(wc).build().unwrap()
}

pub fn labeled(lc: f64, wc: f64, top: &str, bot: &str) -> CapParams {
    CapParams::builder()
        .lc(lc)
        .wc(wc)
        .label(true)
        .top_label(top)
        .bot_label(bot)
        .build()
        .unwrap()
}
