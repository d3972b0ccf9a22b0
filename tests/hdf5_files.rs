#![cfg(feature = "hdf5")]

use ats_vis::balance::{self, WaterBalanceOptions};
use ats_vis::mesh::file::{read_mesh_arrays, read_mesh_polygons, VisFile};

use ndarray::{arr2, Array2};
use std::path::{Path, PathBuf};

fn run_directory(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ats-vis-h5-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// unit square split into a triangle (tag 4) and a padded polygon (tag 3)
fn write_mesh(path: &Path) {
    let file = hdf5::File::create(path).unwrap();
    let mesh = file.create_group("0").unwrap().create_group("Mesh").unwrap();

    let nodes = arr2(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
    mesh.new_dataset_builder().with_data(&nodes).create("Nodes").unwrap();

    let mixed: Vec<i64> = vec![4, 0, 1, 2, 3, 9, 0, 2, 3, 0, 0];
    let mixed = Array2::from_shape_vec((mixed.len(), 1), mixed).unwrap();
    mesh.new_dataset_builder().with_data(&mixed).create("MixedElements").unwrap();

    let element_map = arr2(&[[0i64], [1]]);
    mesh.new_dataset_builder().with_data(&element_map).create("ElementMap").unwrap();
}

fn write_surface_vis(path: &Path) {
    let file = hdf5::File::create(path).unwrap();

    let volume = file.create_group("surface-cell_volume.cell.0").unwrap();
    volume.new_dataset_builder().with_data(&[4.0, 6.0][..]).create("0").unwrap();

    let depth = file.create_group("surface-ponded_depth.cell.0").unwrap();
    depth.new_dataset_builder().with_data(&[0.5, 0.25][..]).create("10").unwrap();
    depth.new_dataset_builder().with_data(&[0.0, 0.1][..]).create("2").unwrap();
}

#[test]
fn mesh_file_round_trip() {
    let dir = run_directory("mesh");
    let path = dir.join("visdump_surface_mesh.h5");
    write_mesh(&path);

    let arrays = read_mesh_arrays(&path).unwrap();
    assert_eq!(arrays.nodes.dim(), (4, 3));
    assert_eq!(arrays.mixed_elements.len(), 11);
    assert_eq!(arrays.num_elems, 2);

    let polygons = read_mesh_polygons(&path).unwrap();
    assert_eq!(polygons.len(), 2);
    assert_eq!(polygons[0].len(), 3);
    assert_eq!(polygons[1].ring(), &[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);

    // the reads left no handle open, so the file can be truncated again
    hdf5::File::create(&path).unwrap();

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn vis_file_variables() {
    let dir = run_directory("vis");
    let vis = VisFile::new(&dir, Some("surface"));
    write_surface_vis(vis.path());

    assert_eq!(vis.cycles("surface-ponded_depth").unwrap(), vec![2, 10]);
    assert_eq!(vis.get("surface-ponded_depth", 10).unwrap(), vec![0.5, 0.25]);

    let series = vis.series("surface-ponded_depth").unwrap();
    assert_eq!(series, arr2(&[[0.0, 0.1], [0.5, 0.25]]));

    assert_eq!(vis.surface_area().unwrap(), 10.0);
    assert!(vis.get("saturation_liquid", 0).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn water_balance_area_from_vis_file() {
    let dir = run_directory("balance");
    write_surface_vis(VisFile::new(&dir, Some("surface")).path());

    let contents = "\"time [d]\",\"rain precipitation [m d^-1]\",\"snow melt [m d^-1]\",\"evapotranspiration [m d^-1]\",\"runoff generation [mol d^-1]\",\"surface water content [mol]\",\"subsurface water content [mol]\",\"snow water content [mol]\",\"snow precipitation [m d^-1]\"\n\
        0,0,0,0,0,0,555000,0,0\n";
    std::fs::write(dir.join(balance::WATER_BALANCE_FILE), contents).unwrap();

    let wb = balance::load(&dir, &WaterBalanceOptions::default()).unwrap();
    assert_eq!(wb.surface_area, 10.0);
    assert_eq!(wb.water.to_vec(), vec![1.0]);

    std::fs::remove_dir_all(&dir).unwrap();
}
