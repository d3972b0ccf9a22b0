//! Common traits and types that are useful for working with `ats_vis`

pub use crate::array::{Array, Numeric, Precision};
pub use crate::balance::{WaterBalance, WaterBalanceOptions};
pub use crate::color::{ColorLimits, LimitOptions, Normalization};
pub use crate::mesh::{ElementKind, ElementRecord, MeshArrays, Point, Polygon};
pub use crate::parse::{ParameterList, TabularFunction};
pub use crate::pick::{PickRegistry, Toggle};
pub use crate::timeseries::{DelimitedTable, ReadOptions};
pub use crate::write_vtk::{CellData, Encoding, PolygonMesh};
pub use crate::Error;

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
