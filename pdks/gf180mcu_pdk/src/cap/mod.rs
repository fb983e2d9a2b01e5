//! MOS and MIM capacitor generators.
//!
//! Every capacitor is generated in three stages. [`CapParams`] are coerced
//! into a [`CapSpec`], which clamps the dimensions to the device minimums,
//! and the spec is built into a [`ShapeSet`] by applying the device's
//! construction rules to a reference rectangle at the origin.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use derive_builder::Builder;
use pcell::error::{ErrorSource, PcellError, Result};
use pcell::layout::cell::ShapeSet;
use pcell::layout::layers::Layers;
use pcell::pcell::schema::{ParamDecl, ParamValues};
use pcell::pcell::shape::FromShape;
use pcell::pcell::Pcell;
use pcell::units::{db_to_um, um_to_db, SiPrefix};
use pcgeom::{snap_to_grid, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::constants::*;

mod mim;
mod mos;
pub mod rules;

pub use mim::{mim_layers, MimLayers};

/// A capacitor device type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CapDevice {
    #[serde(rename = "cap_nmos")]
    Nmos,
    #[serde(rename = "cap_pmos")]
    Pmos,
    /// NMOS capacitor in an n-well body.
    #[serde(rename = "cap_nmos_b")]
    NmosB,
    /// PMOS capacitor in the p-substrate body.
    #[serde(rename = "cap_pmos_b")]
    PmosB,
    #[serde(rename = "cap_mim")]
    Mim,
}

impl CapDevice {
    pub const ALL: [CapDevice; 5] = [
        Self::Nmos,
        Self::Pmos,
        Self::NmosB,
        Self::PmosB,
        Self::Mim,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nmos => "cap_nmos",
            Self::Pmos => "cap_pmos",
            Self::NmosB => "cap_nmos_b",
            Self::PmosB => "cap_pmos_b",
            Self::Mim => "cap_mim",
        }
    }

    #[inline]
    pub fn is_mos(&self) -> bool {
        !matches!(self, Self::Mim)
    }

    #[inline]
    pub fn is_body_tied(&self) -> bool {
        matches!(self, Self::NmosB | Self::PmosB)
    }

    /// The minimum length and width in micrometers.
    pub fn min_dims_um(&self) -> (f64, f64) {
        match self {
            Self::Mim => (MIM_CAP_MIN_LENGTH_UM, MIM_CAP_MIN_WIDTH_UM),
            _ => (MOS_CAP_MIN_LENGTH_UM, MOS_CAP_MIN_WIDTH_UM),
        }
    }

    pub fn allowed_variants(&self) -> &'static [Variant] {
        match self {
            Self::Nmos | Self::Pmos => &[Variant::Plain, Variant::DeepNwell, Variant::GuardRing],
            Self::NmosB | Self::PmosB => &[Variant::BodyTied],
            Self::Mim => &[Variant::Plain],
        }
    }

    pub fn default_variant(&self) -> Variant {
        if self.is_body_tied() {
            Variant::BodyTied
        } else {
            Variant::Plain
        }
    }

    /// Host parameter names of the top and bottom labels.
    fn label_names(&self) -> (&'static str, &'static str) {
        match self {
            Self::Mim => ("top_label", "bot_label"),
            _ => ("g_label", "sd_label"),
        }
    }
}

impl Display for CapDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CapDevice {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cap_nmos" => Ok(Self::Nmos),
            "cap_pmos" => Ok(Self::Pmos),
            "cap_nmos_b" => Ok(Self::NmosB),
            "cap_pmos_b" => Ok(Self::PmosB),
            "cap_mim" | "mim" => Ok(Self::Mim),
            _ => Err(PcellError::invalid_parameter(format!(
                "unknown capacitor type {s:?}"
            ))),
        }
    }
}

/// The operating voltage area of a MOS capacitor.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum VoltageDomain {
    #[default]
    V3_3,
    /// Thick-oxide devices inside a dual-gate region.
    V5_6,
}

impl VoltageDomain {
    pub const CHOICES: [&'static str; 2] = ["3.3V", "5/6V"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3_3 => Self::CHOICES[0],
            Self::V5_6 => Self::CHOICES[1],
        }
    }
}

impl Display for VoltageDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoltageDomain {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3.3V" => Ok(Self::V3_3),
            "5/6V" => Ok(Self::V5_6),
            _ => Err(PcellError::invalid_parameter(format!(
                "volt must be one of {}, got {s:?}",
                Self::CHOICES.join(", ")
            ))),
        }
    }
}

/// A device configuration.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Variant {
    Plain,
    DeepNwell,
    /// A deep n-well surrounded by a contacted p-type guard ring.
    GuardRing,
    BodyTied,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::DeepNwell => "deep_nwell",
            Self::GuardRing => "guard_ring",
            Self::BodyTied => "body_tied",
        }
    }

    #[inline]
    pub fn has_deep_nwell(&self) -> bool {
        matches!(self, Self::DeepNwell | Self::GuardRing)
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Variant {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Self::Plain),
            "deep_nwell" => Ok(Self::DeepNwell),
            "guard_ring" => Ok(Self::GuardRing),
            "body_tied" => Ok(Self::BodyTied),
            _ => Err(PcellError::invalid_parameter(format!(
                "unknown variant {s:?}"
            ))),
        }
    }
}

/// The MIM process option.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MimOption {
    /// MIM between metal2 and metal3.
    #[default]
    A,
    /// MIM below a selectable top metal.
    B,
}

impl MimOption {
    pub const CHOICES: [&'static str; 2] = ["MIM-A", "MIM-B"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => Self::CHOICES[0],
            Self::B => Self::CHOICES[1],
        }
    }
}

impl Display for MimOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MimOption {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MIM-A" => Ok(Self::A),
            "MIM-B" => Ok(Self::B),
            _ => Err(PcellError::invalid_parameter(format!(
                "mim_option must be one of {}, got {s:?}",
                Self::CHOICES.join(", ")
            ))),
        }
    }
}

/// The top metal of a MIM capacitor.
///
/// Any `M<n>` parses; [`mim_layers`] decides whether it is supported.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MetalLevel {
    #[default]
    Default,
    Level(u8),
}

impl MetalLevel {
    pub const CHOICES: [&'static str; 5] = ["default", "M3", "M4", "M5", "M6"];
}

impl Display for MetalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Level(n) => write!(f, "M{n}"),
        }
    }
}

impl FromStr for MetalLevel {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "default" {
            return Ok(Self::Default);
        }
        s.strip_prefix('M')
            .and_then(|n| n.parse().ok())
            .map(Self::Level)
            .ok_or_else(|| {
                PcellError::invalid_parameter(format!("malformed metal level {s:?}"))
            })
    }
}

/// Raw capacitor parameters, as supplied by a caller.
///
/// Lengths are in micrometers. String choices are parsed during coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct CapParams {
    /// Length.
    pub lc: f64,
    /// Width.
    pub wc: f64,
    #[builder(setter(into), default = "arcstr::literal!(\"3.3V\")")]
    #[serde(default = "default_volt")]
    pub volt: ArcStr,
    /// The device variant. [`None`] selects the default variant of the device.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub variant: Option<ArcStr>,
    #[builder(setter(into), default = "arcstr::literal!(\"MIM-A\")")]
    #[serde(default = "default_mim_option")]
    pub mim_option: ArcStr,
    #[builder(setter(into), default = "arcstr::literal!(\"default\")")]
    #[serde(default = "default_metal_level")]
    pub metal_level: ArcStr,
    /// Whether to draw the top and bottom labels.
    #[builder(default)]
    #[serde(default)]
    pub label: bool,
    #[builder(setter(into), default)]
    #[serde(default)]
    pub top_label: ArcStr,
    #[builder(setter(into), default)]
    #[serde(default)]
    pub bot_label: ArcStr,
}

fn default_volt() -> ArcStr {
    arcstr::literal!("3.3V")
}

fn default_mim_option() -> ArcStr {
    arcstr::literal!("MIM-A")
}

fn default_metal_level() -> ArcStr {
    arcstr::literal!("default")
}

impl CapParams {
    #[inline]
    pub fn builder() -> CapParamsBuilder {
        CapParamsBuilder::default()
    }

    /// The default parameters of `device`: minimum dimensions, no labels.
    pub fn defaults(device: CapDevice) -> Self {
        let (lc, wc) = device.min_dims_um();
        Self {
            lc,
            wc,
            volt: default_volt(),
            variant: None,
            mim_option: default_mim_option(),
            metal_level: default_metal_level(),
            label: false,
            top_label: ArcStr::default(),
            bot_label: ArcStr::default(),
        }
    }

    /// Converts a host value map into parameters for `device`.
    ///
    /// Values are checked against the device schema first. The `deepnwell`
    /// and `pcmpgr` flags select the variant; a guard ring without deep
    /// n-well is ignored. The read-only `area` and `perim` outputs are
    /// ignored too.
    pub fn from_values(device: CapDevice, values: &ParamValues) -> Result<Self> {
        values.validate(&device.schema())?;
        let mut params = Self::defaults(device);
        if let Some(lc) = values.double("lc")? {
            params.lc = lc;
        }
        if let Some(wc) = values.double("wc")? {
            params.wc = wc;
        }
        if let Some(label) = values.bool("label")? {
            params.label = label;
        }
        let (top, bot) = device.label_names();
        if let Some(top) = values.string(top)? {
            params.top_label = top.clone();
        }
        if let Some(bot) = values.string(bot)? {
            params.bot_label = bot.clone();
        }
        if let Some(volt) = values.string("volt")? {
            params.volt = volt.clone();
        }
        if let Some(option) = values.string("mim_option")? {
            params.mim_option = option.clone();
        }
        if let Some(level) = values.string("metal_level")? {
            params.metal_level = level.clone();
        }

        let deep_nwell = values.bool("deepnwell")?.unwrap_or(false);
        let guard_ring = values.bool("pcmpgr")?.unwrap_or(false);
        if guard_ring && !deep_nwell {
            log::warn!("{device}: guard ring requested without deep n-well, ignoring");
        }
        params.variant = match (deep_nwell, guard_ring) {
            (true, true) => Some(ArcStr::from(Variant::GuardRing.as_str())),
            (true, false) => Some(ArcStr::from(Variant::DeepNwell.as_str())),
            _ => None,
        };
        Ok(params)
    }
}

/// Derived electrical quantities of a capacitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// Area in square micrometers.
    pub area: f64,
    /// Perimeter in micrometers.
    pub perim: f64,
}

/// Coerced capacitor parameters.
///
/// Only [`Pcell::coerce`] creates a spec, so every spec satisfies the
/// device minimums and its choices are valid for its device.
#[derive(Debug, Clone, PartialEq)]
pub struct CapSpec {
    device: CapDevice,
    lc: f64,
    wc: f64,
    volt: VoltageDomain,
    variant: Variant,
    mim_option: MimOption,
    metal_level: MetalLevel,
    label: bool,
    top_label: ArcStr,
    bot_label: ArcStr,
}

impl CapSpec {
    #[inline]
    pub fn device(&self) -> CapDevice {
        self.device
    }

    #[inline]
    pub fn lc(&self) -> f64 {
        self.lc
    }

    #[inline]
    pub fn wc(&self) -> f64 {
        self.wc
    }

    #[inline]
    pub fn volt(&self) -> VoltageDomain {
        self.volt
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn mim_option(&self) -> MimOption {
        self.mim_option
    }

    #[inline]
    pub fn metal_level(&self) -> MetalLevel {
        self.metal_level
    }

    /// The top and bottom label text, or [`None`] when labels are disabled.
    pub fn labels(&self) -> Option<(&str, &str)> {
        self.label
            .then(|| (self.top_label.as_str(), self.bot_label.as_str()))
    }

    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics {
            area: self.wc * self.lc,
            perim: 2.0 * (self.wc + self.lc),
        }
    }

    /// Converts the spec back into raw parameters.
    pub fn to_params(&self) -> CapParams {
        CapParams {
            lc: self.lc,
            wc: self.wc,
            volt: ArcStr::from(self.volt.as_str()),
            variant: Some(ArcStr::from(self.variant.as_str())),
            mim_option: ArcStr::from(self.mim_option.as_str()),
            metal_level: ArcStr::from(self.metal_level.to_string()),
            label: self.label,
            top_label: self.top_label.clone(),
            bot_label: self.bot_label.clone(),
        }
    }

    /// Writes the spec back into host values, including the read-only
    /// `area` and `perim` outputs.
    ///
    /// Reading the result with [`CapParams::from_values`] and coercing it
    /// gives this spec again.
    pub fn to_values(&self) -> ParamValues {
        let DerivedMetrics { area, perim } = self.metrics();
        let (top, bot) = self.device.label_names();
        let mut values = ParamValues::new();
        values
            .set("lc", self.lc)
            .set("wc", self.wc)
            .set("area", area)
            .set("perim", perim)
            .set("label", self.label)
            .set(top, self.top_label.clone())
            .set(bot, self.bot_label.clone());
        match self.device {
            CapDevice::Mim => {
                values
                    .set("mim_option", self.mim_option.as_str())
                    .set("metal_level", ArcStr::from(self.metal_level.to_string()));
            }
            CapDevice::Nmos | CapDevice::Pmos => {
                values
                    .set("volt", self.volt.as_str())
                    .set("deepnwell", self.variant.has_deep_nwell())
                    .set("pcmpgr", self.variant == Variant::GuardRing);
            }
            CapDevice::NmosB | CapDevice::PmosB => {
                values.set("volt", self.volt.as_str());
            }
        }
        values
    }

    /// A short description such as `cap_nmos(LC=1.000,WC=1.880)`.
    pub fn display_text(&self) -> String {
        format!("{}(LC={:.3},WC={:.3})", self.device, self.lc, self.wc)
    }
}

fn check_length(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(PcellError::invalid_parameter(format!(
            "{name} must be a finite non-negative length, got {value}"
        )));
    }
    if value > CAP_MAX_LENGTH_UM {
        return Err(PcellError::invalid_parameter(format!(
            "{name} must be at most {CAP_MAX_LENGTH_UM} um, got {value}"
        )));
    }
    Ok(())
}

fn clamp(device: CapDevice, name: &str, value: f64, min: f64) -> f64 {
    if value < min {
        log::debug!("{device}: clamping {name} from {value} um to {min} um");
        min
    } else {
        value
    }
}

impl CapDevice {
    /// Declares the host parameters of this device.
    pub fn schema(&self) -> Vec<ParamDecl> {
        let (lc, wc) = self.min_dims_um();
        let (top, bot) = self.label_names();
        let mut decls = Vec::new();
        match self {
            Self::Mim => {
                decls.push(ParamDecl::choice(
                    "mim_option",
                    "MIM option",
                    MimOption::CHOICES,
                ));
                decls.push(ParamDecl::choice(
                    "metal_level",
                    "Metal level",
                    MetalLevel::CHOICES,
                ));
            }
            Self::Nmos | Self::Pmos => {
                decls.push(ParamDecl::bool("deepnwell", "Deep NWELL", false));
                decls.push(ParamDecl::bool("pcmpgr", "Guard ring", false));
                decls.push(ParamDecl::choice(
                    "volt",
                    "Voltage area",
                    VoltageDomain::CHOICES,
                ));
            }
            Self::NmosB | Self::PmosB => {
                decls.push(ParamDecl::choice(
                    "volt",
                    "Voltage area",
                    VoltageDomain::CHOICES,
                ));
            }
        }
        decls.extend([
            ParamDecl::double("lc", "Length", lc).with_unit("um"),
            ParamDecl::double("wc", "Width", wc).with_unit("um"),
            ParamDecl::readonly_double("area", "Area").with_unit("um^2"),
            ParamDecl::readonly_double("perim", "Perimeter").with_unit("um"),
            ParamDecl::bool("label", "Labels", false),
            ParamDecl::string(top, "Top label", ""),
            ParamDecl::string(bot, "Bottom label", ""),
        ]);
        decls
    }
}

impl Pcell for CapDevice {
    type Params = CapParams;
    type Spec = CapSpec;

    fn name(&self) -> ArcStr {
        ArcStr::from(self.as_str())
    }

    fn cell_name(&self) -> ArcStr {
        match self {
            Self::Nmos => arcstr::literal!("cap_nmos_dev"),
            Self::Pmos => arcstr::literal!("cap_pmos_dev"),
            Self::NmosB => arcstr::literal!("cap_nmos_b_dev"),
            Self::PmosB => arcstr::literal!("cap_pmos_b_dev"),
            Self::Mim => arcstr::literal!("mim_cap_dev"),
        }
    }

    fn schema(&self) -> Vec<ParamDecl> {
        CapDevice::schema(self)
    }

    fn coerce(&self, params: &CapParams) -> Result<CapSpec> {
        check_length("lc", params.lc)?;
        check_length("wc", params.wc)?;

        let variant = match &params.variant {
            Some(variant) => variant.parse()?,
            None => self.default_variant(),
        };
        if !self.allowed_variants().contains(&variant) {
            return Err(PcellError::invalid_parameter(format!(
                "{self} does not support the {variant} variant"
            )));
        }

        let (volt, mim_option, metal_level) = if self.is_mos() {
            (
                params.volt.parse()?,
                MimOption::default(),
                MetalLevel::default(),
            )
        } else {
            (
                VoltageDomain::default(),
                params.mim_option.parse()?,
                params.metal_level.parse()?,
            )
        };

        let (min_lc, min_wc) = self.min_dims_um();
        Ok(CapSpec {
            device: *self,
            lc: clamp(*self, "lc", params.lc, min_lc),
            wc: clamp(*self, "wc", params.wc, min_wc),
            volt,
            variant,
            mim_option,
            metal_level,
            label: params.label,
            top_label: params.top_label.clone(),
            bot_label: params.bot_label.clone(),
        })
    }

    fn build(&self, spec: &CapSpec, layers: &Layers) -> Result<ShapeSet> {
        if spec.device != *self {
            return Err(ErrorSource::Internal(format!(
                "{self} cannot build a {} spec",
                spec.device
            ))
            .into());
        }

        let rules = match self {
            Self::Mim => mim::rules(spec.mim_option, spec.metal_level)?,
            _ => mos::rules(*self, spec.volt, spec.variant),
        };

        let w = snap_to_grid(um_to_db(spec.wc, SiPrefix::Nano), GRID);
        let l = snap_to_grid(um_to_db(spec.lc, SiPrefix::Nano), GRID);
        let reference = Rect::new(Point::zero(), Point::new(w, l));
        rules.apply(reference, spec.labels(), layers)
    }
}

impl FromShape for CapDevice {
    type Params = CapParams;

    fn params_from_bbox(&self, bbox: Rect) -> CapParams {
        CapParams {
            lc: db_to_um(bbox.height(), SiPrefix::Nano),
            wc: db_to_um(bbox.width(), SiPrefix::Nano),
            ..CapParams::defaults(*self)
        }
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use pcgeom::Shape;

    use super::*;
    use crate::Gf180Pdk;

    fn params(lc: f64, wc: f64) -> CapParams {
        CapParams::builder().lc(lc).wc(wc).build().unwrap()
    }

    fn all_params() -> Vec<(CapDevice, CapParams)> {
        let mut out = Vec::new();
        for device in CapDevice::ALL {
            for variant in device.allowed_variants() {
                let mut p = params(3.0, 4.0);
                p.variant = Some(ArcStr::from(variant.as_str()));
                p.label = true;
                p.top_label = arcstr::literal!("top");
                p.bot_label = arcstr::literal!("bot");
                out.push((device, p.clone()));
                if device.is_mos() {
                    p.volt = arcstr::literal!("5/6V");
                    out.push((device, p));
                }
            }
        }
        out
    }

    #[test]
    fn small_capacitors_clamp_to_minimums() {
        let spec = CapDevice::Nmos.coerce(&params(0.5, 0.5)).unwrap();
        assert_float_eq!(spec.lc(), 1.0, abs <= 1e-12);
        assert_float_eq!(spec.wc(), 1.88, abs <= 1e-12);
        let metrics = spec.metrics();
        assert_float_eq!(metrics.area, 1.88, abs <= 1e-9);
        assert_float_eq!(metrics.perim, 5.76, abs <= 1e-9);

        let spec = CapDevice::Mim.coerce(&params(0.0, 12.0)).unwrap();
        assert_float_eq!(spec.lc(), 5.0, abs <= 1e-12);
        assert_float_eq!(spec.wc(), 12.0, abs <= 1e-12);
    }

    #[test]
    fn coercion_is_idempotent() {
        for (device, p) in all_params() {
            let spec = device.coerce(&p).unwrap();
            assert_eq!(device.coerce(&spec.to_params()).unwrap(), spec);
        }
        let spec = CapDevice::Pmos.coerce(&params(0.1, 0.1)).unwrap();
        assert_eq!(CapDevice::Pmos.coerce(&spec.to_params()).unwrap(), spec);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut p = params(1.0, 2.0);
        p.volt = arcstr::literal!("12V");
        let err = CapDevice::Nmos.coerce(&p).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));

        for (lc, wc) in [(-1.0, 2.0), (f64::NAN, 2.0), (1.0, f64::INFINITY)] {
            let err = CapDevice::Pmos.coerce(&params(lc, wc)).unwrap_err();
            assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
        }

        let mut p = params(1.0, 2.0);
        p.variant = Some(arcstr::literal!("deep_nwell"));
        let err = CapDevice::NmosB.coerce(&p).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
        let err = CapDevice::Mim.coerce(&p).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
    }

    #[test]
    fn mim_ignores_voltage() {
        let mut p = params(6.0, 6.0);
        p.volt = arcstr::literal!("not a voltage");
        let spec = CapDevice::Mim.coerce(&p).unwrap();
        assert_eq!(spec.volt(), VoltageDomain::V3_3);
    }

    #[test]
    fn body_tied_devices_default_to_body_tied() {
        let spec = CapDevice::PmosB.coerce(&params(1.0, 2.0)).unwrap();
        assert_eq!(spec.variant(), Variant::BodyTied);
        let spec = CapDevice::Nmos.coerce(&params(1.0, 2.0)).unwrap();
        assert_eq!(spec.variant(), Variant::Plain);
    }

    #[test]
    fn display_text_reports_coerced_dims() {
        let spec = CapDevice::Nmos.coerce(&params(0.5, 2.5)).unwrap();
        assert_eq!(spec.display_text(), "cap_nmos(LC=1.000,WC=2.500)");
    }

    #[test]
    fn metal_levels_parse() {
        assert_eq!("".parse::<MetalLevel>().unwrap(), MetalLevel::Default);
        assert_eq!("M7".parse::<MetalLevel>().unwrap(), MetalLevel::Level(7));
        assert!("metal3".parse::<MetalLevel>().is_err());
        assert_eq!(MetalLevel::Level(5).to_string(), "M5");
    }

    #[test]
    fn host_values_select_variants() {
        let mut values = ParamValues::defaults(&CapDevice::Nmos.schema());
        values
            .set("deepnwell", true)
            .set("pcmpgr", true)
            .set("g_label", "G")
            .set("lc", 2.0);
        let p = CapParams::from_values(CapDevice::Nmos, &values).unwrap();
        assert_eq!(p.variant.as_deref(), Some("guard_ring"));
        assert_eq!(p.top_label.as_str(), "G");
        assert_float_eq!(p.lc, 2.0, abs <= 1e-12);

        let mut values = ParamValues::defaults(&CapDevice::Pmos.schema());
        values.set("pcmpgr", true);
        let p = CapParams::from_values(CapDevice::Pmos, &values).unwrap();
        assert_eq!(p.variant, None);

        let mut values = ParamValues::defaults(&CapDevice::Mim.schema());
        values.set("metal_level", "M9");
        assert!(CapParams::from_values(CapDevice::Mim, &values).is_err());

        let mut values = ParamValues::defaults(&CapDevice::NmosB.schema());
        values.set("deepnwell", true);
        assert!(CapParams::from_values(CapDevice::NmosB, &values).is_err());
    }

    #[test]
    fn host_values_round_trip() {
        for (device, p) in all_params() {
            let spec = device.coerce(&p).unwrap();
            let values = spec.to_values();
            values.validate(&device.schema()).unwrap();
            let metrics = spec.metrics();
            assert_eq!(values.double("area").unwrap(), Some(metrics.area));
            assert_eq!(values.double("perim").unwrap(), Some(metrics.perim));

            let again = CapParams::from_values(device, &values).unwrap();
            assert_eq!(device.coerce(&again).unwrap(), spec);
        }

        let mut values = ParamValues::defaults(&CapDevice::Pmos.schema());
        values.set("lc", 0.2).set("deepnwell", true);
        let spec = CapDevice::Pmos
            .coerce(&CapParams::from_values(CapDevice::Pmos, &values).unwrap())
            .unwrap();
        let written = spec.to_values();
        assert_eq!(written.double("lc").unwrap(), Some(1.0));
        assert_eq!(written.bool("deepnwell").unwrap(), Some(true));
        assert_eq!(written.bool("pcmpgr").unwrap(), Some(false));
        let again = CapParams::from_values(CapDevice::Pmos, &written).unwrap();
        assert_eq!(CapDevice::Pmos.coerce(&again).unwrap(), spec);
    }

    #[test]
    fn oversized_lengths_are_rejected() {
        for device in CapDevice::ALL {
            for (lc, wc) in [(1e16, 2.0), (2.0, 1e16), (CAP_MAX_LENGTH_UM + 1.0, 6.0)] {
                let err = device.coerce(&params(lc, wc)).unwrap_err();
                assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
            }
        }
        let layers = Gf180Pdk::layers().unwrap();
        let spec = CapDevice::Mim
            .coerce(&params(CAP_MAX_LENGTH_UM, MIM_CAP_MIN_WIDTH_UM))
            .unwrap();
        let shapes = CapDevice::Mim.build(&spec, &layers).unwrap();
        let bottom = layers.drawing("metal2").unwrap();
        let plate = shapes.rects_on(&bottom).next().unwrap();
        assert_eq!(plate.top(), 10_000_600);
    }

    #[test]
    fn every_configuration_builds() {
        let layers = Gf180Pdk::layers().unwrap();
        for (device, p) in all_params() {
            let spec = device.coerce(&p).unwrap();
            let shapes = device.build(&spec, &layers).unwrap();
            assert!(!shapes.is_empty());
            assert_eq!(shapes.labels().len(), 2);
        }
    }

    #[test]
    fn mos_gate_sits_at_the_origin() {
        let layers = Gf180Pdk::layers().unwrap();
        let spec = CapDevice::Nmos.coerce(&params(0.5, 0.5)).unwrap();
        let shapes = CapDevice::Nmos.build(&spec, &layers).unwrap();
        let gate = layers.drawing("mos_cap_mk").unwrap();
        let rects: Vec<_> = shapes.rects_on(&gate).collect();
        assert_eq!(rects, vec![Rect::new(Point::zero(), Point::new(1_880, 1_000))]);

        let poly = layers.drawing("poly2").unwrap();
        let poly: Vec<_> = shapes.rects_on(&poly).collect();
        assert_eq!(
            poly,
            vec![Rect::new(Point::new(0, -520), Point::new(1_880, 1_520))]
        );
        assert!(shapes.labels().is_empty());
    }

    #[test]
    fn mim_labels_sit_on_the_plates() {
        let layers = Gf180Pdk::layers().unwrap();
        let mut p = params(10.0, 8.0);
        p.label = true;
        p.top_label = arcstr::literal!("PLUS");
        p.bot_label = arcstr::literal!("MINUS");
        let spec = CapDevice::Mim.coerce(&p).unwrap();
        let shapes = CapDevice::Mim.build(&spec, &layers).unwrap();

        let [top, bot] = shapes.labels() else {
            panic!("expected two labels");
        };
        assert_eq!(top.string.as_str(), "PLUS");
        assert_eq!(top.loc, Point::new(4_000, 5_000));
        assert_eq!(top.layer, layers.label("metal3").unwrap());
        assert_eq!(bot.loc, Point::new(4_000, -300));
        assert_eq!(bot.layer, layers.label("metal2").unwrap());
    }

    #[test]
    fn unsupported_metal_level_fails_build() {
        let layers = Gf180Pdk::layers().unwrap();
        let mut p = params(6.0, 6.0);
        p.mim_option = arcstr::literal!("MIM-B");
        p.metal_level = arcstr::literal!("M7");
        let spec = CapDevice::Mim.coerce(&p).unwrap();
        let err = CapDevice::Mim.build(&spec, &layers).unwrap_err();
        assert!(matches!(
            err.source(),
            ErrorSource::UnsupportedConfiguration(_)
        ));
    }

    #[test]
    fn build_rejects_foreign_specs() {
        let layers = Gf180Pdk::layers().unwrap();
        let spec = CapDevice::Nmos.coerce(&params(1.0, 2.0)).unwrap();
        let err = CapDevice::Pmos.build(&spec, &layers).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::Internal(_)));
    }

    #[test]
    fn params_from_drawn_rectangle() {
        let rect = Rect::new(Point::new(100, 200), Point::new(3_100, 2_200));
        let (p, at) = CapDevice::Mim
            .params_from_shape(&Shape::Rect(rect))
            .unwrap();
        assert_float_eq!(p.wc, 3.0, abs <= 1e-9);
        assert_float_eq!(p.lc, 2.0, abs <= 1e-9);
        assert_eq!(at, Point::new(1_600, 1_200));
    }
}
