//! Mixed element meshes: decoding connectivity into planar polygons.
//!
//! ATS visualization meshes store their topology as a node coordinate table
//! and a single flat, type tagged connectivity buffer. [`mesh_polygons`] turns
//! those two arrays into one [`Polygon`] per element, in element map order.

mod decode;
mod element;
mod error;
#[cfg(feature = "hdf5")]
pub mod file;
mod polygon;

pub use decode::{decode_mixed_elements, mesh_polygons, polygons_from_records, referenced_nodes};
pub use element::{ElementKind, ElementRecord, MAX_ELEMENT_NODES};
pub use error::DecodeError;
pub use polygon::{centroids, total_bounds, Bounds, Point, Polygon};

use ndarray::Array2;

#[derive(Debug, Clone, PartialEq)]
/// The raw arrays describing a mesh, fully read into memory.
///
/// This is what gets pulled out of a mesh file before any decoding happens. The
/// file itself is never held on to.
pub struct MeshArrays {
    /// node coordinates, one row per node
    pub nodes: Array2<f64>,
    /// flat, type tagged connectivity buffer
    pub mixed_elements: Vec<i64>,
    /// number of elements, the length of the element map
    pub num_elems: usize,
}

impl MeshArrays {
    pub fn new(nodes: Array2<f64>, mixed_elements: Vec<i64>, num_elems: usize) -> Self {
        Self {
            nodes,
            mixed_elements,
            num_elems,
        }
    }

    /// decode the connectivity buffer into its element records
    pub fn elements(&self) -> Result<Vec<ElementRecord>, DecodeError> {
        decode_mixed_elements(&self.mixed_elements, self.num_elems)
    }

    /// decode the mesh into one polygon per element
    pub fn polygons(&self) -> Result<Vec<Polygon>, DecodeError> {
        mesh_polygons(self.nodes.view(), &self.mixed_elements, self.num_elems)
    }
}
