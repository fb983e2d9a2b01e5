//! APIs for parametric cell generators.

use std::sync::Arc;

use crate::deps::arcstr::ArcStr;
use crate::error::{ErrorContext, Result};
use crate::layout::cell::{Cell, ShapeSet};
use crate::layout::db::{LayoutDb, Materializer};
use crate::layout::layers::Layers;

pub mod schema;
pub mod shape;

use self::schema::ParamDecl;

/// The trait that all parametric cell generators implement.
///
/// Generation runs in three stages: raw parameters are coerced into a
/// validated spec, the spec is built into a [`ShapeSet`], and the shapes
/// are handed to a [`Materializer`].
pub trait Pcell {
    /// The raw parameter type, as supplied by a host.
    type Params;
    /// The validated parameter type.
    type Spec;

    /// The device type name, such as `cap_nmos`.
    fn name(&self) -> ArcStr;

    /// The name of the cell registered by [`Pcell::generate`].
    fn cell_name(&self) -> ArcStr;

    /// Declares the parameters a host should present.
    fn schema(&self) -> Vec<ParamDecl>;

    /// Validates `params`, clamping dimensions to their minimums.
    fn coerce(&self, params: &Self::Params) -> Result<Self::Spec>;

    /// Derives the geometry of a validated spec.
    ///
    /// Must be deterministic.
    fn build(&self, spec: &Self::Spec, layers: &Layers) -> Result<ShapeSet>;

    /// Coerces, builds and materializes in one step.
    fn generate(
        &self,
        params: &Self::Params,
        layers: &Layers,
        materializer: &dyn Materializer,
        db: &mut LayoutDb,
    ) -> Result<Arc<Cell>> {
        let spec = self
            .coerce(params)
            .map_err(|err| err.with_context(ErrorContext::Coerce(self.name())))?;
        let shapes = self
            .build(&spec, layers)
            .map_err(|err| err.with_context(ErrorContext::Build(self.name())))?;
        materializer.materialize(db, shapes, self.cell_name())
    }
}
