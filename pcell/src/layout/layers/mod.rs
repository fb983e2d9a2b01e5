//! Utilities and types for managing layers in a PDK.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::deps::arcstr::ArcStr;
use crate::error::{ErrorSource, Result};

pub mod selector;

pub use self::selector::Selector;

new_key_type! {
    /// A unique identifier for a layer in a PDK.
    pub struct LayerKey;
}

/// A GDS layer specification.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct GdsLayerSpec(pub i16, pub i16);

#[derive(Deserialize)]
struct CsvLayerRecord {
    layernum: i16,
    datatype: i16,
    name: String,
    purpose: String,
}

/// An enumeration of layer purposes.
#[derive(Debug, Clone, Serialize, Deserialize, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub enum LayerPurpose {
    Drawing,
    Pin,
    Label,
    Outline,
    /// Named purpose, not first-class supported
    Named(ArcStr),
}

#[derive(Debug, Error)]
#[error("empty layer purpose")]
pub struct FromStrError;

impl FromStr for LayerPurpose {
    type Err = FromStrError;
    fn from_str(purp: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match purp.trim() {
            "" => return Err(FromStrError),
            "drawing" => Self::Drawing,
            "pin" => Self::Pin,
            "label" => Self::Label,
            "outline" => Self::Outline,
            other => Self::Named(ArcStr::from(other)),
        })
    }
}

/// A unique identifier for a specific GDS layer based on its definition in a PDK.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LayerSpec(LayerKey, LayerPurpose);

impl LayerSpec {
    /// Creates a new [`LayerSpec`].
    #[inline]
    pub fn new(key: LayerKey, purpose: LayerPurpose) -> Self {
        Self(key, purpose)
    }

    /// Returns the spec for the drawing purpose of the layer associated with key `key`.
    pub fn drawing(key: LayerKey) -> Self {
        Self(key, LayerPurpose::Drawing)
    }

    /// Returns the spec for the label purpose of the layer associated with key `key`.
    pub fn label(key: LayerKey) -> Self {
        Self(key, LayerPurpose::Label)
    }

    /// Returns the layer key of a [`LayerSpec`].
    #[inline]
    pub fn layer(&self) -> LayerKey {
        self.0
    }

    /// Returns the purpose of a [`LayerSpec`].
    #[inline]
    pub fn purpose(&self) -> &LayerPurpose {
        &self.1
    }
}

/// A manager for layers in a PDK.
///
/// Keeps track of layers and indexes them by name, metal/via index and GDS
/// spec. A [`Layers`] is read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layers {
    slots: SlotMap<LayerKey, Layer>,
    names: HashMap<ArcStr, LayerKey>,
    gds_to_layout: HashMap<GdsLayerSpec, LayerSpec>,
    metal_idxs: HashMap<usize, LayerKey>,
    via_idxs: HashMap<usize, LayerKey>,
}

impl Layers {
    /// Creates an empty [`Layers`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`Layers`] from purposes specified in a CSV file.
    ///
    /// The CSV has the columns `layernum,datatype,name,purpose`. Rows sharing
    /// a name become purposes of the same layer. Layers are added in order
    /// of first appearance, so the same table always yields the same keys.
    ///
    /// Uses the provided `base` closure to fill out additional metadata for
    /// each layer.
    pub fn from_csv(csv: &str, mut base: impl FnMut(&str) -> LayerInfo) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let mut order: Vec<String> = Vec::new();
        let mut layer_infos: HashMap<String, LayerInfo> = HashMap::new();

        for record in reader.deserialize() {
            let record: CsvLayerRecord = record?;
            let purp = LayerPurpose::from_str(&record.purpose).map_err(|_| {
                ErrorSource::InvalidParameter(format!(
                    "layer {} has an empty purpose",
                    record.name
                ))
            })?;
            let gds_spec = GdsLayerSpec(record.layernum, record.datatype);
            if let Some(info) = layer_infos.get_mut(&record.name) {
                info.add_purpose(purp, gds_spec);
            } else {
                let mut info = base(&record.name);
                info.name = ArcStr::from(record.name.as_str());
                info.add_purpose(purp, gds_spec);
                order.push(record.name.clone());
                layer_infos.insert(record.name, info);
            }
        }

        let mut layers = Self::new();
        for name in order {
            if let Some(info) = layer_infos.remove(&name) {
                layers.add(info);
            }
        }
        Ok(layers)
    }

    /// Adds a [`Layer`] to our slot-map and number-map, and name-map.
    pub fn add(&mut self, layer: LayerInfo) -> LayerKey {
        let name = layer.name.clone();
        let key = self.slots.insert_with_key(|k| Layer::new(k, layer));
        for (purp, gds_spec) in self.slots[key].info.purps.iter() {
            self.gds_to_layout
                .insert(*gds_spec, LayerSpec::new(key, purp.clone()));
        }
        self.names.insert(name, key);

        if let Some(via_idx) = self.slots[key].info.via_idx {
            self.via_idxs.insert(via_idx, key);
        }
        if let Some(metal_idx) = self.slots[key].info.metal_idx {
            self.metal_idxs.insert(metal_idx, key);
        }

        key
    }

    /// Gets a [`LayerKey`] based on the provided [`Selector`].
    pub fn get(&self, sel: Selector) -> Result<LayerKey> {
        let key = match sel {
            Selector::Metal(n) => self.metal_idxs.get(&n).copied(),
            Selector::Via(n) => self.via_idxs.get(&n).copied(),
            Selector::Name(n) => self.names.get(n).copied(),
            Selector::Gds(spec) => self.get_from_spec(spec).map(|s| s.layer()),
        };
        key.ok_or_else(|| ErrorSource::LayerNotFound(format!("{sel:?}")).into())
    }

    /// Returns the drawing spec of the layer named `name`.
    pub fn drawing(&self, name: &str) -> Result<LayerSpec> {
        Ok(LayerSpec::drawing(self.get(Selector::Name(name))?))
    }

    /// Returns the label spec of the layer named `name`.
    ///
    /// Fails if the layer has no label purpose.
    pub fn label(&self, name: &str) -> Result<LayerSpec> {
        let key = self.get(Selector::Name(name))?;
        let purpose = self.slots[key].info.label_purpose.clone();
        let spec = LayerSpec::new(key, purpose);
        if self.to_gds_spec(&spec).is_none() {
            return Err(ErrorSource::LayerNotFound(format!("{name} label")).into());
        }
        Ok(spec)
    }

    /// Gets the [`LayerKey`] with layer name `name`.
    pub fn get_key<Q>(&self, name: &Q) -> Option<LayerKey>
    where
        Q: Hash + Eq + ?Sized,
        ArcStr: Borrow<Q>,
    {
        self.names.get(name).cloned()
    }

    /// Gets the name of `key`.
    pub fn get_name(&self, key: LayerKey) -> Result<&ArcStr> {
        let layer = self
            .slots
            .get(key)
            .ok_or_else(|| ErrorSource::LayerNotFound(format!("{key:?}")))?;
        Ok(&layer.info.name)
    }

    /// Gets the [`LayerInfo`] associated with [`LayerKey`] `key`.
    pub fn info(&self, key: LayerKey) -> Result<&LayerInfo> {
        self.slots
            .get(key)
            .map(|l| &l.info)
            .ok_or_else(|| ErrorSource::LayerNotFound(format!("{key:?}")).into())
    }

    /// Gets the [`LayerSpec`] corresponding to [`GdsLayerSpec`] `spec`.
    pub fn get_from_spec(&self, spec: GdsLayerSpec) -> Option<&LayerSpec> {
        self.gds_to_layout.get(&spec)
    }

    /// Converts a [`LayerSpec`] into its corresponding [`GdsLayerSpec`].
    pub fn to_gds_spec(&self, spec: &LayerSpec) -> Option<GdsLayerSpec> {
        self.slots
            .get(spec.layer())
            .and_then(|layer| layer.info.spec(spec.purpose()))
    }
}

/// A layer in a PDK.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    /// A unique identifier.
    pub id: LayerKey,
    /// Information associated with the layer.
    pub info: LayerInfo,
}

impl Layer {
    pub(crate) fn new(id: LayerKey, info: LayerInfo) -> Self {
        Self { id, info }
    }
}

/// Metadata associated with a layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(pattern = "owned")]
pub struct LayerInfo {
    /// The layer name.
    #[builder(setter(into), default)]
    pub name: ArcStr,
    /// A layer purpose to GDS spec lookup table.
    #[builder(setter(into), default)]
    pub purps: HashMap<LayerPurpose, GdsLayerSpec>,
    /// The metal index of this layer, if it is a metal layer.
    #[builder(setter(strip_option), default)]
    pub metal_idx: Option<usize>,
    /// The via index of this layer, if it is a via layer.
    ///
    /// See [`Selector::Via`] for more information.
    #[builder(setter(strip_option), default)]
    pub via_idx: Option<usize>,
    /// The type of the layer.
    #[builder(default)]
    pub layer_type: LayerType,
    /// The purpose with which labels should be emitted.
    #[builder(default = "LayerPurpose::Label")]
    pub label_purpose: LayerPurpose,
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            name: Default::default(),
            purps: Default::default(),
            metal_idx: Default::default(),
            via_idx: Default::default(),
            layer_type: Default::default(),
            label_purpose: LayerPurpose::Label,
        }
    }
}

/// An enumeraton of layer types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, Serialize, Deserialize)]
pub enum LayerType {
    Metal,
    Via,
    Diffusion,
    Gate,
    Well,
    Implant,
    Marker,
    #[default]
    Other,
}

impl LayerInfo {
    /// Creates a new [`LayerInfoBuilder`].
    #[inline]
    pub fn builder() -> LayerInfoBuilder {
        LayerInfoBuilder::default()
    }

    /// Adds a new [`LayerPurpose`].
    #[inline]
    pub fn add_purpose(&mut self, purp: LayerPurpose, spec: GdsLayerSpec) {
        self.purps.insert(purp, spec);
    }

    /// Retrieves the spec for this layer and [`purpose`](LayerPurpose).
    pub fn spec(&self, purpose: &LayerPurpose) -> Option<GdsLayerSpec> {
        self.purps.get(purpose).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "layernum,datatype,name,purpose
34,0,metal1,drawing
34,10,metal1,label
35,0,via1,drawing
36,0,metal2,drawing
117,5,cap_mk,drawing
";

    fn layers() -> Layers {
        Layers::from_csv(CSV, |name| match name {
            "metal1" => LayerInfo::builder()
                .metal_idx(1)
                .layer_type(LayerType::Metal)
                .build()
                .unwrap(),
            "via1" => LayerInfo::builder()
                .via_idx(1)
                .layer_type(LayerType::Via)
                .build()
                .unwrap(),
            _ => LayerInfo::default(),
        })
        .unwrap()
    }

    #[test]
    fn purposes_group_under_one_layer() {
        let layers = layers();
        let m1 = layers.get(Selector::Name("metal1")).unwrap();
        assert_eq!(layers.get(Selector::Metal(1)).unwrap(), m1);
        assert_eq!(
            layers.to_gds_spec(&LayerSpec::label(m1)),
            Some(GdsLayerSpec(34, 10))
        );
        assert_eq!(
            layers.get_from_spec(GdsLayerSpec(34, 10)),
            Some(&LayerSpec::label(m1))
        );
        assert_eq!(layers.get_name(m1).unwrap().as_str(), "metal1");
    }

    #[test]
    fn missing_layers_are_reported() {
        let layers = layers();
        assert!(matches!(
            layers.get(Selector::Name("metal7")).unwrap_err().source(),
            ErrorSource::LayerNotFound(_)
        ));
        // metal2 has no label purpose in this table.
        assert!(layers.label("metal2").is_err());
        assert!(layers.label("metal1").is_ok());
    }

    #[test]
    fn keys_follow_csv_order() {
        let a = layers();
        let b = layers();
        for name in ["metal1", "via1", "metal2", "cap_mk"] {
            assert_eq!(a.get_key(name), b.get_key(name));
        }
    }
}
