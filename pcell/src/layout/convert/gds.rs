//! GDSII import and export.
//!
//! Cells are flat, so a library is simply a list of structs. Rectangles are
//! written as closed five-point boundaries and labels as text elements on
//! the label purpose of their layer.

use std::path::Path;

use derivative::Derivative;
use pcgeom::{Point, Polygon, Shape};

use super::error::{ErrorContext, ErrorHelper};
use crate::deps::arcstr::ArcStr;
use crate::error::{with_err_context, ErrorContext as PcellErrorContext, ErrorSource, Result};
use crate::layout::cell::{Cell, Element, ShapeSet, TextElement};
use crate::layout::error::{LayoutError, LayoutResult};
use crate::layout::layers::{GdsLayerSpec, LayerSpec, Layers};
use crate::log;
use crate::units::SiPrefix;

/// Stand-in for an empty label string, stripped again on import.
const EMPTY_TEXT: char = '\0';

/// Writes `cells` to a GDS library named `lib_name` at `path`.
///
/// Creates the parent directory of `path` if it does not exist.
pub fn to_gds<'a>(
    path: impl AsRef<Path>,
    lib_name: &str,
    cells: impl IntoIterator<Item = &'a Cell>,
    layers: &Layers,
    units: SiPrefix,
) -> Result<()> {
    let path = path.as_ref();
    let lib = GdsExporter::new(layers, units).export_lib(lib_name, cells)?;
    crate::io::create_parent_dir(path)?;
    with_err_context(lib.save(path).map_err(LayoutError::from), || {
        PcellErrorContext::CreateFile(path.to_path_buf())
    })?;
    log::debug!("wrote GDS library {lib_name} to {path:?}");
    Ok(())
}

/// Reads every cell of the GDS library at `path`.
pub fn from_gds(path: impl AsRef<Path>, layers: &Layers, units: SiPrefix) -> Result<Vec<Cell>> {
    let path = path.as_ref();
    let lib = with_err_context(
        gds21::GdsLibrary::load(path).map_err(LayoutError::from),
        || PcellErrorContext::ReadFile(path.to_path_buf()),
    )?;
    GdsImporter::new(layers, units).import_lib(&lib)
}

/// Converts [`Cell`]s into a [`gds21::GdsLibrary`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GdsExporter<'a> {
    backtrace: Vec<ErrorContext>,
    #[derivative(Debug = "ignore")]
    layers: &'a Layers,
    units: SiPrefix,
}

impl<'a> GdsExporter<'a> {
    pub fn new(layers: &'a Layers, units: SiPrefix) -> Self {
        Self {
            backtrace: Vec::new(),
            layers,
            units,
        }
    }

    /// Exports a library containing one struct per cell, in iteration order.
    pub fn export_lib<'b>(
        &mut self,
        name: &str,
        cells: impl IntoIterator<Item = &'b Cell>,
    ) -> LayoutResult<gds21::GdsLibrary> {
        self.backtrace.push(ErrorContext::Library);
        let mut gdslib = gds21::GdsLibrary::new(name);

        // In all cases the GDSII "user units" are set to 1um.
        gdslib.units = match self.units {
            SiPrefix::Micro => gds21::GdsUnits::new(1.0, 1e-6),
            SiPrefix::Nano => gds21::GdsUnits::new(1e-3, 1e-9),
            SiPrefix::Pico => gds21::GdsUnits::new(1e-6, 1e-12),
            units => {
                return self.fail(format!("Invalid unit prefix for library: {units:?}"));
            }
        };

        for cell in cells {
            let strukt = self.export_cell(cell)?;
            gdslib.structs.push(strukt);
        }
        self.backtrace.pop();
        Ok(gdslib)
    }

    pub fn export_cell(&mut self, cell: &Cell) -> LayoutResult<gds21::GdsStruct> {
        self.backtrace.push(ErrorContext::Cell(cell.name().clone()));
        let mut strukt = gds21::GdsStruct::new(cell.name().as_str());

        self.backtrace.push(ErrorContext::Geometry);
        for elem in cell.elems() {
            strukt.elems.push(self.export_element(elem)?);
        }
        self.backtrace.pop();

        self.backtrace.push(ErrorContext::Annotations);
        for label in cell.labels() {
            strukt.elems.push(self.export_annotation(label)?);
        }
        self.backtrace.pop();

        self.backtrace.pop();
        Ok(strukt)
    }

    pub fn export_layerspec(&self, spec: &LayerSpec) -> LayoutResult<gds21::GdsLayerSpec> {
        let GdsLayerSpec(layer, xtype) = self.unwrap(
            self.layers.to_gds_spec(spec),
            format!("No GDS layer for {spec:?}"),
        )?;
        Ok(gds21::GdsLayerSpec { layer, xtype })
    }

    pub fn export_element(&mut self, elem: &Element) -> LayoutResult<gds21::GdsElement> {
        let layerspec = self.export_layerspec(&elem.layer)?;
        self.export_shape(&elem.inner, &layerspec)
    }

    pub fn export_shape(
        &mut self,
        shape: &Shape,
        layerspec: &gds21::GdsLayerSpec,
    ) -> LayoutResult<gds21::GdsElement> {
        let xy = match shape {
            Shape::Rect(r) => {
                let x0 = r.p0.x.try_into()?;
                let y0 = r.p0.y.try_into()?;
                let x1 = r.p1.x.try_into()?;
                let y1 = r.p1.y.try_into()?;
                gds21::GdsPoint::vec(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)])
            }
            Shape::Polygon(poly) => {
                let first = self.unwrap(poly.points.first(), "Polygon has no points")?;
                let mut xy = poly
                    .points
                    .iter()
                    .map(|p| self.export_point(p))
                    .collect::<LayoutResult<Vec<_>>>()?;
                // Add the origin a second time, to "close" the polygon
                xy.push(self.export_point(first)?);
                xy
            }
        };
        Ok(gds21::GdsBoundary {
            layer: layerspec.layer,
            datatype: layerspec.xtype,
            xy,
            ..Default::default()
        }
        .into())
    }

    pub fn export_annotation(&mut self, text_elem: &TextElement) -> LayoutResult<gds21::GdsElement> {
        let layerspec = self.export_layerspec(&text_elem.layer)?;
        // GDS readers cannot take a zero-length string record.
        let string = if text_elem.string.is_empty() {
            EMPTY_TEXT.to_string()
        } else {
            text_elem.string.to_string()
        };
        Ok(gds21::GdsTextElem {
            string,
            layer: layerspec.layer,
            texttype: layerspec.xtype,
            xy: self.export_point(&text_elem.loc)?,
            ..Default::default()
        }
        .into())
    }

    pub fn export_point(&self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = pt.x.try_into()?;
        let y = pt.y.try_into()?;
        Ok(gds21::GdsPoint::new(x, y))
    }
}

impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.backtrace.clone(),
        }
    }
}

/// Converts the structs of a [`gds21::GdsLibrary`] back into [`Cell`]s.
///
/// Every `(layer, datatype)` pair must be known to the layer table.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct GdsImporter<'a> {
    backtrace: Vec<ErrorContext>,
    #[derivative(Debug = "ignore")]
    layers: &'a Layers,
    units: SiPrefix,
}

impl<'a> GdsImporter<'a> {
    pub fn new(layers: &'a Layers, units: SiPrefix) -> Self {
        Self {
            backtrace: Vec::new(),
            layers,
            units,
        }
    }

    /// Imports every struct of `gdslib`, in library order.
    pub fn import_lib(&mut self, gdslib: &gds21::GdsLibrary) -> Result<Vec<Cell>> {
        self.backtrace.push(ErrorContext::Library);
        self.check_units(&gdslib.units)?;
        let cells = gdslib
            .structs
            .iter()
            .map(|strukt| self.import_cell(strukt))
            .collect::<Result<Vec<_>>>()?;
        self.backtrace.pop();
        Ok(cells)
    }

    /// Imports the struct named `name` from `gdslib`.
    pub fn import_named(&mut self, gdslib: &gds21::GdsLibrary, name: &str) -> Result<Cell> {
        self.backtrace.push(ErrorContext::Library);
        self.check_units(&gdslib.units)?;
        let strukt = gdslib
            .structs
            .iter()
            .find(|s| s.name.as_str() == name)
            .ok_or_else(|| ErrorSource::CellNotFound(ArcStr::from(name)))?;
        let cell = self.import_cell(strukt)?;
        self.backtrace.pop();
        Ok(cell)
    }

    fn check_units(&mut self, units: &gds21::GdsUnits) -> LayoutResult<()> {
        self.backtrace.push(ErrorContext::Units);
        // Peel out the GDS "database unit", the one of its numbers that really matters
        let gdsunit = units.db_unit();
        let rv = if (gdsunit - 1e-9).abs() < 1e-12 {
            SiPrefix::Nano
        } else if (gdsunit - 1e-6).abs() < 1e-9 {
            SiPrefix::Micro
        } else {
            return self.fail(format!("Unsupported GDSII Units {gdsunit:10.3e}"));
        };
        if rv != self.units {
            return self.fail(format!(
                "Units do not match PDK units: {rv:?} != {:?}",
                self.units
            ));
        }
        self.backtrace.pop();
        Ok(())
    }

    fn import_cell(&mut self, strukt: &gds21::GdsStruct) -> Result<Cell> {
        let name = ArcStr::from(strukt.name.as_str());
        self.backtrace.push(ErrorContext::Cell(name.clone()));

        let mut shapes = ShapeSet::new();
        for elem in strukt.elems.iter() {
            use gds21::GdsElement::*;
            match elem {
                GdsBoundary(x) => shapes.push(self.import_boundary(x)?),
                GdsTextElem(x) => shapes.add_label(self.import_text_elem(x)?),
                other => {
                    self.backtrace.push(ErrorContext::Unknown);
                    return Err(self
                        .err(format!("Unsupported element in flat cell: {other:?}"))
                        .into());
                }
            }
        }

        self.backtrace.pop();
        Ok(Cell::new(name, shapes))
    }

    fn import_boundary(&mut self, x: &gds21::GdsBoundary) -> Result<Element> {
        self.backtrace.push(ErrorContext::Geometry);
        let mut pts = x
            .xy
            .iter()
            .map(|p| self.import_point(p))
            .collect::<Vec<_>>();
        let closed = pts.len() >= 4 && pts.first() == pts.last();
        self.assert(closed, "GDS Boundary must start and end at the same point")?;
        // Pop the redundant last entry
        pts.pop();

        let poly = Polygon { points: pts };
        let inner = match poly.as_rect() {
            Some(rect) => Shape::Rect(rect),
            None => Shape::Polygon(poly),
        };
        let layer = self.import_element_layer(x.layer, x.datatype)?;
        self.backtrace.pop();
        Ok(Element::new(layer, inner))
    }

    fn import_text_elem(&mut self, x: &gds21::GdsTextElem) -> Result<TextElement> {
        self.backtrace.push(ErrorContext::Annotations);
        let loc = self.import_point(&x.xy);
        let layer = self.import_element_layer(x.layer, x.texttype)?;
        self.backtrace.pop();
        Ok(TextElement::new(
            x.string.trim_end_matches(EMPTY_TEXT),
            loc,
            layer,
        ))
    }

    fn import_point(&self, pt: &gds21::GdsPoint) -> Point {
        Point::new(pt.x.into(), pt.y.into())
    }

    fn import_element_layer(&self, layer: i16, xtype: i16) -> Result<LayerSpec> {
        let spec = GdsLayerSpec(layer, xtype);
        self.layers.get_from_spec(spec).cloned().ok_or_else(|| {
            ErrorSource::LayerNotFound(format!("GDS layer {layer}/{xtype} ({:?})", self.backtrace))
                .into()
        })
    }
}

impl ErrorHelper for GdsImporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Import {
            message: msg.into(),
            stack: self.backtrace.clone(),
        }
    }
}
