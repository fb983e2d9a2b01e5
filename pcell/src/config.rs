//! Generator configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::deps::arcstr::{self, ArcStr};
use crate::error::{ErrorContext, PcellError, Result};

/// How generated shapes are handed to the layout database.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeMode {
    /// Register shapes directly.
    #[default]
    Memory,
    /// Round-trip shapes through a GDS exchange file.
    Gds,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct PcellConfig {
    /// Name of written GDS libraries.
    #[builder(setter(into), default = "arcstr::literal!(\"gf180mcu\")")]
    pub lib_name: ArcStr,
    /// Directory for generated output.
    #[builder(setter(into), default = "PathBuf::from(\"build\")")]
    pub out_dir: PathBuf,
    #[builder(default)]
    pub exchange: ExchangeMode,
    /// Fixed exchange file for [`ExchangeMode::Gds`].
    ///
    /// A fresh temporary directory is used when unset.
    #[builder(setter(into, strip_option), default)]
    pub exchange_file: Option<PathBuf>,
}

impl Default for PcellConfig {
    fn default() -> Self {
        Self {
            lib_name: arcstr::literal!("gf180mcu"),
            out_dir: PathBuf::from("build"),
            exchange: ExchangeMode::default(),
            exchange_file: None,
        }
    }
}

impl PcellConfig {
    #[inline]
    pub fn builder() -> PcellConfigBuilder {
        PcellConfigBuilder::default()
    }

    /// Loads a configuration from the TOML file at `path`.
    ///
    /// Missing keys take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = crate::io::read_to_string(path)?;
        Self::from_toml(&contents)
            .map_err(|err| err.with_context(ErrorContext::ReadFile(path.to_path_buf())))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config = toml::from_str(contents).map_err(PcellError::new)?;
        Ok(config)
    }
}
