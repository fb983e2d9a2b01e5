use std::fmt::{Debug, Display};
use std::path::PathBuf;

use thiserror::Error;

use crate::deps::arcstr::ArcStr;
use crate::layout::error::LayoutError;

pub type Result<T> = std::result::Result<T, PcellError>;

pub struct PcellError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl PcellError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    /// The contexts in which this error occurred, innermost first.
    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

impl std::error::Error for PcellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for PcellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Error:\n{}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for item in self.context.iter() {
                writeln!(f, "\twhile {}", item)?;
            }
        }
        Ok(())
    }
}

impl Debug for PcellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for PcellError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl PcellError {
    pub fn new(source: impl Into<ErrorSource>) -> Self {
        Self {
            source: source.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }

    #[inline]
    pub fn into_inner(self) -> ErrorSource {
        self.source
    }

    /// Shorthand for an [`ErrorSource::InvalidParameter`] error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::new(ErrorSource::InvalidParameter(msg.into()))
    }

    /// Shorthand for an [`ErrorSource::UnsupportedConfiguration`] error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(ErrorSource::UnsupportedConfiguration(msg.into()))
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<PcellError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    /// Validating and clamping the parameters of a device.
    Coerce(ArcStr),
    /// Deriving the shapes of a device.
    Build(ArcStr),
    /// Registering a cell in a layout database.
    Materialize(ArcStr),
    CreateDir(PathBuf),
    CreateFile(PathBuf),
    ReadFile(PathBuf),
    Task(ArcStr),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            Coerce(device) => write!(f, "coercing parameters of {device}"),
            Build(device) => write!(f, "building layout of {device}"),
            Materialize(cell) => write!(f, "materializing cell {cell}"),
            CreateDir(path) => write!(f, "creating directory {path:?}"),
            CreateFile(path) => write!(f, "creating file {path:?}"),
            ReadFile(path) => write!(f, "reading file {path:?}"),
            Task(task) => write!(f, "{task}"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("error while generating layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("no such layer: {0}")]
    LayerNotFound(String),

    #[error("no such cell: {0}")]
    CellNotFound(ArcStr),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("error parsing CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_context() {
        let err = PcellError::invalid_parameter("volt must be one of 3.3V, 5/6V")
            .with_context(ErrorContext::Coerce(arcstr::literal!("cap_nmos")));
        let msg = format!("{err}");
        assert!(msg.contains("invalid parameter: volt must be one of 3.3V, 5/6V"));
        assert!(msg.contains("while coercing parameters of cap_nmos"));
        assert!(matches!(err.source(), ErrorSource::InvalidParameter(_)));
    }
}
