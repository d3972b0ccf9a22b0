use crate::array::{Array, Precision};
use crate::mesh::{DecodeError, ElementKind, ElementRecord, Polygon};
use crate::Error;

use ndarray::{Array2, ArrayView2};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
/// Unstructured grid of planar cells, ready to be written to a `.vtu` file
pub struct PolygonMesh {
    /// `(points, 3)`
    points: Array2<f64>,
    connectivity: Vec<i64>,
    /// end of each cell in `connectivity`
    offsets: Vec<i64>,
    types: Vec<u8>,
}

impl PolygonMesh {
    /// One cell per polygon. Points are laid out ring by ring, nothing is shared
    /// between cells.
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let num_points = polygons.iter().map(|p| p.ring().len()).sum();

        let mut points = Array2::zeros((num_points, 3));
        let mut connectivity = Vec::with_capacity(num_points);
        let mut offsets = Vec::with_capacity(polygons.len());
        let mut types = Vec::with_capacity(polygons.len());

        let mut rows = points.rows_mut().into_iter();
        let mut next = 0i64;

        for polygon in polygons {
            for (vertex, mut row) in polygon.ring().iter().zip(rows.by_ref()) {
                row[0] = vertex[0];
                row[1] = vertex[1];
                row[2] = vertex[2];
                connectivity.push(next);
                next += 1;
            }

            offsets.push(next);
            types.push(cell_type_of_ring(polygon.ring().len()));
        }

        Self {
            points,
            connectivity,
            offsets,
            types,
        }
    }

    /// One cell per decoded element, sharing the mesh node table.
    ///
    /// Two column node tables are placed at `z = 0`.
    pub fn from_records(nodes: ArrayView2<f64>, records: &[ElementRecord]) -> Result<Self, Error> {
        let columns = nodes.ncols();
        if columns != 2 && columns != 3 {
            return Err(DecodeError::NodeDimension { columns }.into());
        }

        let mut points = Array2::zeros((nodes.nrows(), 3));
        points
            .slice_mut(ndarray::s![.., ..columns])
            .assign(&nodes);

        let mut connectivity = Vec::new();
        let mut offsets = Vec::with_capacity(records.len());
        let mut types = Vec::with_capacity(records.len());

        for (element, record) in records.iter().enumerate() {
            record.check_bounds(element, nodes.nrows())?;

            connectivity.extend(record.nodes().iter().map(|&node| node as i64));
            offsets.push(connectivity.len() as i64);
            types.push(record.kind().vtk_cell_type());
        }

        Ok(Self {
            points,
            connectivity,
            offsets,
            types,
        })
    }

    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }

    pub fn num_cells(&self) -> usize {
        self.types.len()
    }

    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn connectivity(&self) -> &[i64] {
        &self.connectivity
    }

    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    pub fn types(&self) -> &[u8] {
        &self.types
    }
}

/// triangles and quads get their own cell types, anything else is a general polygon
fn cell_type_of_ring(len: usize) -> u8 {
    match len {
        3 => ElementKind::Triangle.vtk_cell_type(),
        4 => ElementKind::Quadrilateral.vtk_cell_type(),
        _ => ElementKind::Polygon.vtk_cell_type(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Named per-cell arrays, one value per polygon
pub struct CellData {
    arrays: Vec<(String, Vec<f64>)>,
}

impl CellData {
    pub fn new() -> Self {
        Self::default()
    }

    /// add an array, builder style
    pub fn with<N: Into<String>>(mut self, name: N, values: Vec<f64>) -> Self {
        self.push(name, values);
        self
    }

    pub fn push<N: Into<String>>(&mut self, name: N, values: Vec<f64>) {
        self.arrays.push((name.into(), values));
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.arrays
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn check_lengths(&self, num_cells: usize) -> Result<(), Error> {
        for (name, values) in self.iter() {
            if values.len() != num_cells {
                return Err(Error::CellDataLength {
                    name: name.to_string(),
                    expected: num_cells,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }
}

/// Write a mesh and its cell data as a VTK XML `UnstructuredGrid` to a `Writer`
pub fn write_polygons<W: Write>(
    writer: W,
    mesh: &PolygonMesh,
    cell_data: &CellData,
    encoding: Encoding,
) -> Result<(), Error> {
    cell_data.check_lengths(mesh.num_cells())?;

    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let vtk_file = BytesStart::new("VTKFile").with_attributes([
        ("type", "UnstructuredGrid"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(vtk_file))?;
    writer.write_event(Event::Start(BytesStart::new("UnstructuredGrid")))?;

    let num_points = mesh.num_points().to_string();
    let num_cells = mesh.num_cells().to_string();
    let piece = BytesStart::new("Piece").with_attributes([
        ("NumberOfPoints", num_points.as_str()),
        ("NumberOfCells", num_cells.as_str()),
    ]);
    writer.write_event(Event::Start(piece))?;

    writer.write_event(Event::Start(BytesStart::new("Points")))?;
    write_inline_dataarray(&mut writer, &mesh.points, "Points", encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Points")))?;

    writer.write_event(Event::Start(BytesStart::new("Cells")))?;
    write_inline_dataarray(&mut writer, &mesh.connectivity, "connectivity", encoding)?;
    write_inline_dataarray(&mut writer, &mesh.offsets, "offsets", encoding)?;
    write_inline_dataarray(&mut writer, &mesh.types, "types", encoding)?;
    writer.write_event(Event::End(BytesEnd::new("Cells")))?;

    writer.write_event(Event::Start(BytesStart::new("CellData")))?;
    for (name, values) in cell_data.iter() {
        write_inline_dataarray(&mut writer, &values, name, encoding)?;
    }
    writer.write_event(Event::End(BytesEnd::new("CellData")))?;

    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("UnstructuredGrid")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    tracing::debug!(
        points = mesh.num_points(),
        cells = mesh.num_cells(),
        arrays = cell_data.len(),
        "wrote unstructured grid"
    );

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// the encoding to use when writing an inline dataarray
pub enum Encoding {
    Ascii,
    Base64,
}

impl Encoding {
    fn to_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

pub fn write_inline_array_header<W: Write>(
    writer: &mut Writer<W>,
    format: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", precision.as_str()),
        ("NumberOfComponents", components.as_str()),
        ("Name", name),
        ("format", format.to_str()),
    ]);

    writer.write_event(Event::Start(header))?;

    Ok(())
}

pub fn close_inline_array_header<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}

/// write a single (inline) array of data (such as ponded depth)
/// to the vtk file.
pub fn write_inline_dataarray<W: Write, A: Array>(
    writer: &mut Writer<W>,
    data: &A,
    name: &str,
    encoding: Encoding,
) -> Result<(), Error> {
    match encoding {
        Encoding::Ascii => {
            data.write_ascii(writer, name)?;
        }
        Encoding::Base64 => {
            data.write_base64(writer, name)?;
        }
    };

    Ok(())
}
