use std::path::PathBuf;

use capgen::generate;
use clap::Parser;
use gf180mcu_pdk::cap::{CapDevice, CapParams};
use pcell::config::PcellConfig;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate a GF180MCU MOS or MIM capacitor and write it to GDS"
)]
pub struct Args {
    /// The device type: cap_nmos, cap_pmos, cap_nmos_b, cap_pmos_b or cap_mim.
    #[arg(short, long, default_value = "cap_nmos")]
    device: CapDevice,
    /// Length in micrometers. Defaults to the device minimum.
    #[arg(long)]
    lc: Option<f64>,
    /// Width in micrometers. Defaults to the device minimum.
    #[arg(long)]
    wc: Option<f64>,
    /// Voltage area of MOS capacitors.
    #[arg(long, default_value = "3.3V")]
    volt: String,
    /// Device variant, such as deep_nwell or guard_ring.
    #[arg(long)]
    variant: Option<String>,
    #[arg(long, default_value = "MIM-A")]
    mim_option: String,
    /// Top metal of MIM capacitors, such as M5.
    #[arg(long, default_value = "default")]
    metal_level: String,
    /// Draw the top and bottom labels.
    #[arg(long)]
    label: bool,
    #[arg(long, default_value = "")]
    top_label: String,
    #[arg(long, default_value = "")]
    bot_label: String,
    /// The output GDS file.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// A TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn params(&self) -> CapParams {
        let mut params = CapParams::defaults(self.device);
        if let Some(lc) = self.lc {
            params.lc = lc;
        }
        if let Some(wc) = self.wc {
            params.wc = wc;
        }
        params.volt = self.volt.as_str().into();
        params.variant = self.variant.as_deref().map(Into::into);
        params.mim_option = self.mim_option.as_str().into();
        params.metal_level = self.metal_level.as_str().into();
        params.label = self.label;
        params.top_label = self.top_label.as_str().into();
        params.bot_label = self.bot_label.as_str().into();
        params
    }
}

pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PcellConfig::from_file(path)?,
        None => PcellConfig::default(),
    };
    generate(args.device, &args.params(), &config, args.output.as_deref())?;
    Ok(())
}
