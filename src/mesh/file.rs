//! HDF5 access for ATS mesh and visualization files
//!
//! Every function here opens its file, reads what it needs into memory, and
//! lets the handle drop before returning. Nothing hands out open handles.

use super::{MeshArrays, Polygon};

use hdf5::File;
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// group holding the mesh datasets of an ATS mesh file
const MESH_GROUP: &str = "0/Mesh";

/// dataset name suffix ATS appends to cell centered variables
const CELL_SUFFIX: &str = ".cell.0";

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
    #[error("variable `{name}` is not present in {path}")]
    MissingVariable { name: String, path: PathBuf },
    #[error("cycle {cycle} of `{name}` has {found} values, earlier cycles have {expected}")]
    RaggedSeries {
        name: String,
        cycle: u64,
        expected: usize,
        found: usize,
    },
    #[error("variable `{name}` has no datasets")]
    EmptyVariable { name: String },
}

/// Read the node table, connectivity buffer, and element count of a mesh file.
///
/// The file is closed again before this function returns, on success or failure.
pub fn read_mesh_arrays<P: AsRef<Path>>(path: P) -> Result<MeshArrays, FileError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mesh = file.group(MESH_GROUP)?;

    let nodes: Array2<f64> = mesh.dataset("Nodes")?.read_2d::<f64>()?;
    // stored as an (n, 1) column, flatten it
    let mixed_elements: Vec<i64> = mesh.dataset("MixedElements")?.read_raw::<i64>()?;
    let num_elems = mesh
        .dataset("ElementMap")?
        .shape()
        .first()
        .copied()
        .unwrap_or(0);

    tracing::debug!(
        path = %path.display(),
        nodes = nodes.nrows(),
        elements = num_elems,
        "read mesh arrays"
    );

    Ok(MeshArrays::new(nodes, mixed_elements, num_elems))
}

/// Read a mesh file and decode it into one polygon per element
pub fn read_mesh_polygons<P: AsRef<Path>>(path: P) -> Result<Vec<Polygon>, crate::Error> {
    let arrays = read_mesh_arrays(path)?;
    let polygons = arrays.polygons()?;
    Ok(polygons)
}

#[derive(Debug, Clone, PartialEq)]
/// An ATS visualization data file (`ats_vis_data.h5`, `ats_vis_surface_data.h5`, ...).
///
/// Each variable is a group of datasets keyed by cycle number. The file is only
/// opened for the duration of each call.
pub struct VisFile {
    path: PathBuf,
}

impl VisFile {
    /// locate the visualization file of `domain` in `directory`. With no domain the
    /// subsurface file `ats_vis_data.h5` is used.
    pub fn new<P: AsRef<Path>>(directory: P, domain: Option<&str>) -> Self {
        let filename = match domain {
            Some(domain) => format!("ats_vis_{domain}_data.h5"),
            None => "ats_vis_data.h5".to_string(),
        };

        Self::from_path(directory.as_ref().join(filename))
    }

    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// names of every variable group in the file
    pub fn variable_names(&self) -> Result<Vec<String>, FileError> {
        let file = File::open(&self.path)?;
        Ok(file.member_names()?)
    }

    /// resolve `name` to a group in the file, trying the `.cell.0` suffix if the
    /// bare name is not present
    fn group(&self, file: &File, name: &str) -> Result<hdf5::Group, FileError> {
        if file.link_exists(name) {
            return Ok(file.group(name)?);
        }

        let suffixed = format!("{name}{CELL_SUFFIX}");
        if file.link_exists(&suffixed) {
            return Ok(file.group(&suffixed)?);
        }

        Err(FileError::MissingVariable {
            name: name.to_string(),
            path: self.path.clone(),
        })
    }

    /// cycle numbers stored for a variable, in ascending order
    pub fn cycles(&self, name: &str) -> Result<Vec<u64>, FileError> {
        let file = File::open(&self.path)?;
        let group = self.group(&file, name)?;
        Ok(sorted_cycles(group.member_names()?))
    }

    /// values of a variable at a single cycle
    pub fn get(&self, name: &str, cycle: u64) -> Result<Vec<f64>, FileError> {
        let file = File::open(&self.path)?;
        let group = self.group(&file, name)?;
        Ok(group.dataset(&cycle.to_string())?.read_raw::<f64>()?)
    }

    /// every cycle of a variable as a `(cycles, cells)` array
    pub fn series(&self, name: &str) -> Result<Array2<f64>, FileError> {
        let file = File::open(&self.path)?;
        let group = self.group(&file, name)?;
        let cycles = sorted_cycles(group.member_names()?);

        let mut values = Vec::new();
        let mut width = None;

        for cycle in &cycles {
            let step = group.dataset(&cycle.to_string())?.read_raw::<f64>()?;

            match width {
                None => width = Some(step.len()),
                Some(expected) if expected != step.len() => {
                    return Err(FileError::RaggedSeries {
                        name: name.to_string(),
                        cycle: *cycle,
                        expected,
                        found: step.len(),
                    })
                }
                Some(_) => (),
            }

            values.extend(step);
        }

        let width = width.ok_or_else(|| FileError::EmptyVariable {
            name: name.to_string(),
        })?;

        Array2::from_shape_vec((cycles.len(), width), values).map_err(|_| {
            FileError::EmptyVariable {
                name: name.to_string(),
            }
        })
    }

    /// total surface area: the sum of the first `surface-cell_volume` dataset
    pub fn surface_area(&self) -> Result<f64, FileError> {
        let name = "surface-cell_volume";
        let file = File::open(&self.path)?;
        let group = self.group(&file, name)?;

        let first = group
            .member_names()?
            .into_iter()
            .next()
            .ok_or_else(|| FileError::EmptyVariable {
                name: name.to_string(),
            })?;

        let volumes = group.dataset(&first)?.read_raw::<f64>()?;
        Ok(volumes.iter().sum())
    }
}

/// dataset names that parse as cycle numbers, sorted numerically
fn sorted_cycles(names: Vec<String>) -> Vec<u64> {
    let mut cycles: Vec<u64> = names.iter().filter_map(|n| n.parse().ok()).collect();
    cycles.sort_unstable();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_sort_numerically() {
        let names = vec!["100".into(), "20".into(), "0".into(), "attrs".into()];
        assert_eq!(sorted_cycles(names), vec![0, 20, 100]);
    }

    #[test]
    fn domain_file_names() {
        let surface = VisFile::new("run", Some("surface"));
        assert_eq!(surface.path(), Path::new("run/ats_vis_surface_data.h5"));

        let subsurface = VisFile::new("run", None);
        assert_eq!(subsurface.path(), Path::new("run/ats_vis_data.h5"));
    }
}
