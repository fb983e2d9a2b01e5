//! The in-process layout database and the adapters that populate it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tempdir::TempDir;

use super::cell::{Cell, ShapeSet};
use super::convert::gds::{to_gds, GdsImporter};
use super::error::LayoutError;
use super::layers::Layers;
use crate::config::{ExchangeMode, PcellConfig};
use crate::deps::arcstr::ArcStr;
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::log::{self, Log};
use crate::units::SiPrefix;

/// A database of named cells.
///
/// Registering a cell under an existing name replaces the previous cell.
/// Cells are iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct LayoutDb {
    cells: BTreeMap<ArcStr, Arc<Cell>>,
}

impl LayoutDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `cell`, replacing any cell with the same name.
    pub fn insert(&mut self, cell: Cell) -> Arc<Cell> {
        let cell = Arc::new(cell);
        if self
            .cells
            .insert(cell.name().clone(), cell.clone())
            .is_some()
        {
            log::debug!("replaced existing cell {}", cell.name());
        }
        cell
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Cell>> {
        self.cells.get(name)
    }

    /// Returns the cell named `name`, or [`ErrorSource::CellNotFound`].
    pub fn try_get(&self, name: &str) -> Result<Arc<Cell>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ErrorSource::CellNotFound(ArcStr::from(name)).into())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Arc<Cell>> {
        self.cells.values()
    }
}

/// Turns a [`ShapeSet`] into a named cell registered in a [`LayoutDb`].
pub trait Materializer {
    /// Registers `shapes` as the cell `name`.
    ///
    /// On error, `db` is left untouched.
    fn materialize(&self, db: &mut LayoutDb, shapes: ShapeSet, name: ArcStr) -> Result<Arc<Cell>>;
}

/// Registers shapes directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryMaterializer;

impl Materializer for InMemoryMaterializer {
    fn materialize(&self, db: &mut LayoutDb, shapes: ShapeSet, name: ArcStr) -> Result<Arc<Cell>> {
        let cell = db.insert(Cell::new(name, shapes));
        log::info!("materialized cell {}", cell.name());
        cell.log();
        Ok(cell)
    }
}

/// Where a [`GdsMaterializer`] writes its exchange library.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum ExchangeFile {
    /// A fresh temporary directory per call.
    #[default]
    Temp,
    Fixed(PathBuf),
}

/// Registers shapes by writing them to a one-cell GDS library and reading
/// the cell back.
#[derive(Debug, Clone)]
pub struct GdsMaterializer {
    layers: Arc<Layers>,
    units: SiPrefix,
    lib_name: ArcStr,
    exchange: ExchangeFile,
}

impl GdsMaterializer {
    pub fn new(layers: Arc<Layers>, units: SiPrefix, lib_name: impl Into<ArcStr>) -> Self {
        Self {
            layers,
            units,
            lib_name: lib_name.into(),
            exchange: ExchangeFile::Temp,
        }
    }

    /// Uses `path` as the exchange file instead of a temporary directory.
    pub fn with_exchange_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.exchange = ExchangeFile::Fixed(path.into());
        self
    }

    fn round_trip(&self, cell: &Cell) -> Result<Cell> {
        // Keeps the temporary directory alive until the library is read back.
        let (path, _dir) = match &self.exchange {
            ExchangeFile::Fixed(path) => (path.clone(), None),
            ExchangeFile::Temp => {
                let dir = with_err_context(TempDir::new("pcell"), || {
                    ErrorContext::CreateDir(std::env::temp_dir())
                })?;
                (dir.path().join(format!("{}.gds", cell.name())), Some(dir))
            }
        };

        to_gds(&path, &self.lib_name, [cell], &self.layers, self.units)?;
        let lib = with_err_context(
            gds21::GdsLibrary::load(&path).map_err(LayoutError::from),
            || ErrorContext::ReadFile(path.clone()),
        )?;
        GdsImporter::new(&self.layers, self.units).import_named(&lib, cell.name())
    }
}

impl Materializer for GdsMaterializer {
    fn materialize(&self, db: &mut LayoutDb, shapes: ShapeSet, name: ArcStr) -> Result<Arc<Cell>> {
        let cell = Cell::new(name.clone(), shapes);
        let imported = self
            .round_trip(&cell)
            .map_err(|err| err.with_context(ErrorContext::Materialize(name)))?;
        let cell = db.insert(imported);
        log::info!("materialized cell {} through GDS exchange", cell.name());
        cell.log();
        Ok(cell)
    }
}

/// Creates the materializer selected by `config`.
pub fn materializer(
    config: &PcellConfig,
    layers: Arc<Layers>,
    units: SiPrefix,
) -> Box<dyn Materializer> {
    match config.exchange {
        ExchangeMode::Memory => Box::new(InMemoryMaterializer),
        ExchangeMode::Gds => {
            let m = GdsMaterializer::new(layers, units, config.lib_name.clone());
            match &config.exchange_file {
                Some(path) => Box::new(m.with_exchange_file(path)),
                None => Box::new(m),
            }
        }
    }
}
