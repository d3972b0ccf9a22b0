#![doc = include_str!("../README.md")]

pub mod array;
pub mod balance;
pub mod color;
pub mod field;
pub mod mesh;
pub mod parse;
pub mod pick;
pub mod prelude;
pub mod timeseries;
pub mod write_vtk;

pub use array::{Array, Numeric, Precision};

pub use mesh::{
    decode_mixed_elements, mesh_polygons, DecodeError, ElementKind, ElementRecord, MeshArrays,
    Polygon,
};

pub use parse::{read_parameter_file, ParameterList, TabularFunction};

pub use balance::{WaterBalance, WaterBalanceOptions};
pub use timeseries::{read_table, DelimitedTable, ReadOptions};

pub use write_vtk::{write_inline_dataarray, write_polygons, CellData, Encoding, PolygonMesh};

pub use ndarray;

pub use quick_xml::reader::Reader;
pub use quick_xml::writer::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not decode mesh connectivity: {0}")]
    Decode(#[from] mesh::DecodeError),
    #[error("Error while parsing ATS xml: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Error while reading a delimited file: {0}")]
    Table(#[from] timeseries::TableError),
    #[error("Error while computing the water balance: {0}")]
    Balance(#[from] balance::BalanceError),
    #[error(transparent)]
    Field(#[from] field::FieldError),
    #[error(transparent)]
    Color(#[from] color::ColorError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("cell data array `{name}` has {found} values for {expected} cells")]
    CellDataLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[cfg(feature = "hdf5")]
    #[error("Could not read HDF5 file: {0}")]
    File(#[from] mesh::file::FileError),
}
