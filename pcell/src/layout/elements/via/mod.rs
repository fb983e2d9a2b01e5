//! Utilities and types for drawing vias.

use derive_builder::Builder;
use pcgeom::{Dims, Dir};
use serde::{Deserialize, Serialize};

use crate::error::{PcellError, Result};

pub mod generators;

/// Via cut rules.
///
/// All values are in database units.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ViaSpec {
    /// The size of each via cut.
    size: Dims,
    /// The edge-to-edge spacing between adjacent cuts.
    #[builder(default)]
    spacing: Dims,
    /// The minimum distance from a cut to the edge of the enclosing region.
    #[builder(default)]
    enclosure: Dims,
}

impl ViaSpecBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(size) = self.size {
            if size.w() <= 0 || size.h() <= 0 {
                return Err(format!("via size must be positive, got {size:?}"));
            }
        }
        for (name, dims) in [("spacing", self.spacing), ("enclosure", self.enclosure)] {
            if let Some(dims) = dims {
                if dims.w() < 0 || dims.h() < 0 {
                    return Err(format!("via {name} must be non-negative, got {dims:?}"));
                }
            }
        }
        Ok(())
    }
}

impl ViaSpec {
    /// Creates a new [`ViaSpec`] without validation.
    ///
    /// Intended for rule tables. Use [`ViaSpec::builder`] for user input.
    pub const fn new(size: Dims, spacing: Dims, enclosure: Dims) -> Self {
        Self {
            size,
            spacing,
            enclosure,
        }
    }

    #[inline]
    pub fn builder() -> ViaSpecBuilder {
        ViaSpecBuilder::default()
    }

    /// Builds a validated [`ViaSpec`].
    pub fn checked(size: Dims, spacing: Dims, enclosure: Dims) -> Result<Self> {
        Self::builder()
            .size(size)
            .spacing(spacing)
            .enclosure(enclosure)
            .build()
            .map_err(|err| PcellError::invalid_parameter(err.to_string()))
    }

    #[inline]
    pub fn size(&self) -> Dims {
        self.size
    }

    #[inline]
    pub fn spacing(&self) -> Dims {
        self.spacing
    }

    #[inline]
    pub fn enclosure(&self) -> Dims {
        self.enclosure
    }

    /// The extent of an `nx` by `ny` array of cuts.
    ///
    /// Both counts must be at least one.
    pub fn array_dims(&self, nx: usize, ny: usize) -> Dims {
        debug_assert!(nx >= 1);
        debug_assert!(ny >= 1);

        self.size * (nx, ny) + self.spacing * (nx - 1, ny - 1)
    }

    /// The maximum number of cuts that fit along `dir` in a region of length `len`,
    /// leaving the enclosure on both ends.
    ///
    /// Returns zero if not even a single cut fits.
    pub fn max_n(&self, dir: Dir, len: i64) -> usize {
        let line_and_space = self.size.dim(dir) + self.spacing.dim(dir);
        let usable = len - 2 * self.enclosure.dim(dir);
        if usable < self.size.dim(dir) {
            return 0;
        }

        let max = (usable + self.spacing.dim(dir)) / line_and_space;
        usize::try_from(max).unwrap_or(usize::MAX)
    }
}
