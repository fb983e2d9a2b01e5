//! Generates a single GF180 capacitor cell and writes it to GDS.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gf180mcu_pdk::cap::{CapDevice, CapParams, CapSpec};
use gf180mcu_pdk::Gf180Pdk;
use pcell::config::PcellConfig;
use pcell::error::{ErrorContext, Result};
use pcell::layout::cell::Cell;
use pcell::layout::convert::gds::to_gds;
use pcell::layout::db::{materializer, LayoutDb};
use pcell::pcell::Pcell;
use pcell::pdk::Pdk;

/// A generated capacitor.
#[derive(Debug, Clone)]
pub struct Generated {
    pub spec: CapSpec,
    pub cell: Arc<Cell>,
    /// The GDS file the cell was written to.
    pub path: PathBuf,
}

/// Generates `device` from `params`, then writes the cell to `output`.
///
/// When `output` is [`None`], the cell is written to
/// `{out_dir}/{cell_name}.gds`.
pub fn generate(
    device: CapDevice,
    params: &CapParams,
    config: &PcellConfig,
    output: Option<&Path>,
) -> Result<Generated> {
    let pdk = Gf180Pdk::new();
    let layers = Arc::new(Pdk::layers(&pdk)?);

    let spec = device
        .coerce(params)
        .map_err(|err| err.with_context(ErrorContext::Coerce(device.name())))?;

    let mut db = LayoutDb::new();
    let materializer = materializer(config, layers.clone(), pdk.lengths());
    let cell = device.generate(params, &layers, materializer.as_ref(), &mut db)?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => config.out_dir.join(format!("{}.gds", cell.name())),
    };
    to_gds(&path, &config.lib_name, [cell.as_ref()], &layers, pdk.lengths())?;

    let metrics = spec.metrics();
    log::info!(
        "{}: area = {:.4} um^2, perimeter = {:.4} um",
        spec.display_text(),
        metrics.area,
        metrics.perim
    );
    log::info!("wrote {} to {path:?}", cell.name());

    Ok(Generated { spec, cell, path })
}

#[cfg(test)]
mod tests {
    use pcell::config::ExchangeMode;
    use pcell::layout::convert::gds::from_gds;
    use pcell::units::SiPrefix;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn writes_the_cell_to_the_output_directory() {
        let dir = TempDir::new("capgen").unwrap();
        let config = PcellConfig::builder()
            .out_dir(dir.path())
            .exchange(ExchangeMode::Gds)
            .build()
            .unwrap();
        let params = CapParams::builder().lc(6.0).wc(7.0).build().unwrap();

        let out = generate(CapDevice::Mim, &params, &config, None).unwrap();
        assert_eq!(out.path, dir.path().join("mim_cap_dev.gds"));
        assert_eq!(out.spec.display_text(), "cap_mim(LC=6.000,WC=7.000)");

        let layers = Gf180Pdk::layers().unwrap();
        let cells = from_gds(&out.path, &layers, SiPrefix::Nano).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(&cells[0], out.cell.as_ref());
    }

    #[test]
    fn invalid_parameters_write_nothing() {
        let dir = TempDir::new("capgen").unwrap();
        let config = PcellConfig::builder()
            .out_dir(dir.path())
            .build()
            .unwrap();
        let params = CapParams::builder()
            .lc(1.0)
            .wc(2.0)
            .volt("9V")
            .build()
            .unwrap();

        let err = generate(CapDevice::Nmos, &params, &config, None).unwrap_err();
        assert!(err
            .context()
            .contains(&ErrorContext::Coerce(CapDevice::Nmos.name())));
        assert!(!dir.path().join("cap_nmos_dev.gds").exists());
    }

    #[test]
    fn build_failures_carry_build_context() {
        let dir = TempDir::new("capgen").unwrap();
        let config = PcellConfig::builder()
            .out_dir(dir.path())
            .exchange(ExchangeMode::Gds)
            .build()
            .unwrap();
        let params = CapParams::builder()
            .lc(6.0)
            .wc(6.0)
            .mim_option("MIM-B")
            .metal_level("M7")
            .build()
            .unwrap();

        let err = generate(CapDevice::Mim, &params, &config, None).unwrap_err();
        assert!(err
            .context()
            .contains(&ErrorContext::Build(CapDevice::Mim.name())));
        assert!(!dir.path().join("mim_cap_dev.gds").exists());
    }
}
