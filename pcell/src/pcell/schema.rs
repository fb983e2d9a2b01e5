//! Typed parameter declarations for hosting frameworks.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::deps::arcstr::ArcStr;
use crate::error::{PcellError, Result};

/// The kind of value a parameter holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Bool,
    Double,
    String,
    /// A closed set of string choices.
    Choice(Vec<ArcStr>),
}

/// A parameter value supplied by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Bool(bool),
    Double(f64),
    String(ArcStr),
}

impl ParamValue {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(ArcStr::from(value))
    }
}

impl From<ArcStr> for ParamValue {
    fn from(value: ArcStr) -> Self {
        Self::String(value)
    }
}

/// The declaration of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: ArcStr,
    pub description: ArcStr,
    pub kind: ParamKind,
    /// The default value. [`None`] for derived read-only values.
    pub default: Option<ParamValue>,
    pub unit: Option<ArcStr>,
    /// Read-only parameters are outputs, recomputed from the others.
    pub readonly: bool,
}

impl ParamDecl {
    pub fn new(name: impl Into<ArcStr>, description: impl Into<ArcStr>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            default: None,
            unit: None,
            readonly: false,
        }
    }

    pub fn bool(name: impl Into<ArcStr>, description: impl Into<ArcStr>, default: bool) -> Self {
        Self::new(name, description, ParamKind::Bool).with_default(default)
    }

    pub fn double(name: impl Into<ArcStr>, description: impl Into<ArcStr>, default: f64) -> Self {
        Self::new(name, description, ParamKind::Double).with_default(default)
    }

    pub fn string(name: impl Into<ArcStr>, description: impl Into<ArcStr>, default: &str) -> Self {
        Self::new(name, description, ParamKind::String).with_default(default)
    }

    /// A choice parameter defaulting to the first choice.
    pub fn choice<I, S>(name: impl Into<ArcStr>, description: impl Into<ArcStr>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>,
    {
        let choices: Vec<ArcStr> = choices.into_iter().map(Into::into).collect();
        let default = choices.first().cloned().map(ParamValue::String);
        Self {
            default,
            ..Self::new(name, description, ParamKind::Choice(choices))
        }
    }

    /// A derived double-valued output.
    pub fn readonly_double(name: impl Into<ArcStr>, description: impl Into<ArcStr>) -> Self {
        Self {
            readonly: true,
            ..Self::new(name, description, ParamKind::Double)
        }
    }

    pub fn with_default(mut self, default: impl Into<ParamValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<ArcStr>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Checks that `value` has this parameter's kind and, for choices,
    /// is one of the allowed values.
    pub fn check(&self, value: &ParamValue) -> Result<()> {
        let ok = match (&self.kind, value) {
            (ParamKind::Bool, ParamValue::Bool(_)) => true,
            (ParamKind::Double, ParamValue::Double(v)) => v.is_finite(),
            (ParamKind::String, ParamValue::String(_)) => true,
            (ParamKind::Choice(choices), ParamValue::String(v)) => choices.contains(v),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(PcellError::invalid_parameter(format!(
                "{} ({}) cannot take the {} value {value}",
                self.name,
                self.kind_name(),
                value.kind_name()
            )))
        }
    }

    fn kind_name(&self) -> String {
        match &self.kind {
            ParamKind::Bool => "bool".to_string(),
            ParamKind::Double => "double".to_string(),
            ParamKind::String => "string".to_string(),
            ParamKind::Choice(choices) => format!("one of {}", choices.join(", ")),
        }
    }
}

/// A map of parameter names to values, as supplied by a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamValues {
    values: BTreeMap<ArcStr, ParamValue>,
}

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// The defaults of every writable parameter in `schema`.
    pub fn defaults(schema: &[ParamDecl]) -> Self {
        let values = schema
            .iter()
            .filter(|decl| !decl.readonly)
            .filter_map(|decl| Some((decl.name.clone(), decl.default.clone()?)))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<ArcStr>, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Checks every value against `schema`.
    ///
    /// Unknown names are rejected. Values of read-only parameters are
    /// outputs written back by the generator and are not checked.
    pub fn validate(&self, schema: &[ParamDecl]) -> Result<()> {
        for (name, value) in self.values.iter() {
            let decl = schema
                .iter()
                .find(|decl| &decl.name == name)
                .ok_or_else(|| PcellError::invalid_parameter(format!("unknown parameter {name}")))?;
            if decl.readonly {
                continue;
            }
            decl.check(value)?;
        }
        Ok(())
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => Err(mismatch(name, "bool", other)),
        }
    }

    pub fn double(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Double(v)) => Ok(Some(*v)),
            Some(other) => Err(mismatch(name, "double", other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<Option<&ArcStr>> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::String(v)) => Ok(Some(v)),
            Some(other) => Err(mismatch(name, "string", other)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &ParamValue)> {
        self.values.iter()
    }
}

fn mismatch(name: &str, expected: &str, got: &ParamValue) -> PcellError {
    PcellError::invalid_parameter(format!(
        "{name} must be a {expected}, got the {} value {got}",
        got.kind_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSource;

    fn schema() -> Vec<ParamDecl> {
        vec![
            ParamDecl::bool("label", "Labels", false),
            ParamDecl::choice("volt", "Voltage area", ["3.3V", "5/6V"]),
            ParamDecl::double("lc", "Length", 1.0).with_unit("um"),
            ParamDecl::readonly_double("area", "Area").with_unit("um^2"),
        ]
    }

    #[test]
    fn defaults_skip_readonly_outputs() {
        let values = ParamValues::defaults(&schema());
        assert_eq!(values.bool("label").unwrap(), Some(false));
        assert_eq!(values.string("volt").unwrap().map(|s| s.as_str()), Some("3.3V"));
        assert_eq!(values.double("lc").unwrap(), Some(1.0));
        assert!(values.get("area").is_none());
        values.validate(&schema()).unwrap();
    }

    #[test]
    fn validation_rejects_bad_values() {
        let schema = schema();
        for (name, value) in [
            ("volt", ParamValue::from("12V")),
            ("lc", ParamValue::from(true)),
            ("lc", ParamValue::from(f64::NAN)),
            ("nonsense", ParamValue::from(1.0)),
        ] {
            let mut values = ParamValues::defaults(&schema);
            values.set(name, value);
            let err = values.validate(&schema).unwrap_err();
            assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
        }
    }

    #[test]
    fn readonly_outputs_are_ignored() {
        let schema = schema();
        let mut values = ParamValues::defaults(&schema);
        values.set("area", 12.5);
        values.validate(&schema).unwrap();
        values.set("area", "stale");
        values.validate(&schema).unwrap();
    }

    #[test]
    fn typed_getters_report_mismatches() {
        let mut values = ParamValues::new();
        values.set("lc", "wide");
        assert!(values.double("lc").is_err());
        assert_eq!(values.double("wc").unwrap(), None);
    }
}
