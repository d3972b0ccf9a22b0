use ats_vis::balance::{self, BalanceError, WaterBalanceOptions};
use ats_vis::parse::{rainfall, read_parameter_file, tracer_source};
use ats_vis::timeseries::{count_comment_lines, read_header, ReadOptions};

use std::path::PathBuf;

const INPUT: &str = r#"<ParameterList name="main">
  <ParameterList name="state">
    <ParameterList name="surface-water_source">
      <ParameterList name="function-tabular">
        <Parameter name="x values" type="Array(double)" value="{0, 7200}"/>
        <Parameter name="y values" type="Array(double)" value="{2e-6}"/>
      </ParameterList>
    </ParameterList>
  </ParameterList>
  <ParameterList name="PKs">
    <ParameterList name="transport">
      <ParameterList name="source terms">
        <ParameterList name="function-tabular">
          <Parameter name="x values" type="Array(double)" value="{3600, 10800}"/>
          <Parameter name="y values" type="Array(double)" value="{0.5}"/>
        </ParameterList>
      </ParameterList>
    </ParameterList>
  </ParameterList>
</ParameterList>
"#;

const WATER_BALANCE: &str = "# ATS observation\n\
# surface area normalized below\n\
\"time [d]\",\"rain precipitation [m d^-1]\",\"snow melt [m d^-1]\",\"evapotranspiration [m d^-1]\",\"runoff generation [mol d^-1]\",\"surface water content [mol]\",\"subsurface water content [mol]\",\"snow water content [mol]\",\"snow precipitation [m d^-1]\",\"canopy water content [mol]\",\"canopy interception [m d^-1]\",\"canopy drainage [m d^-1]\",\"canopy evaporation [m d^-1]\"\n\
0.0,0.01,0.0,0.0,0.0,0.0,555000.0,0.0,0.0,0.0,0.0,0.0,0.0\n\
1.0,0.01,0.0,0.0,5550.0,0.0,555000.0,0.0,0.0,1110.0,0.001,0.0,0.0\n";

/// a fresh directory under the system temp dir, unique to this test
fn run_directory(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ats-vis-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn sources_from_input_file() {
    let dir = run_directory("sources");
    let path = dir.join("input.xml");
    std::fs::write(&path, INPUT).unwrap();

    let root = read_parameter_file(&path).unwrap();
    assert_eq!(root.name, "main");

    let hours = [0.0, 1.0, 2.0, 2.5, 3.0, 4.0];

    let rain = rainfall(&root, &hours, 1.0).unwrap();
    assert_eq!(rain.to_vec(), vec![2e-6, 2e-6, 2e-6, 0.0, 0.0, 0.0]);

    let tracer = tracer_source(&root, &hours, 2.0).unwrap();
    assert_eq!(tracer.to_vec(), vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_input_file() {
    let err = read_parameter_file(&run_directory("missing").join("nope.xml")).unwrap_err();
    assert!(matches!(err, ats_vis::Error::Io(_)));
}

#[test]
fn water_balance_from_directory() {
    let dir = run_directory("balance");
    std::fs::write(dir.join(balance::WATER_BALANCE_FILE), WATER_BALANCE).unwrap();

    let contents = WATER_BALANCE.as_bytes();
    assert_eq!(count_comment_lines(contents).unwrap(), 2);
    let (line, header) = read_header(contents, &ReadOptions::default()).unwrap();
    assert_eq!(line, 3);
    assert_eq!(header.len(), 13);

    let options = WaterBalanceOptions {
        surface_area: Some(10.0),
        ..Default::default()
    };
    let wb = balance::load(&dir, &options).unwrap();

    assert_eq!(wb.len(), 2);
    // 555000 mol over 10 m^2
    assert_eq!(wb.water.to_vec(), vec![1.0, 1.0]);
    assert!(close(wb.runoff[1], 0.01));

    let canopy = wb.canopy.as_ref().unwrap();
    assert!(close(canopy.water[1], 0.002));
    assert_eq!(canopy.interception.to_vec(), vec![0.0, 0.001]);

    // rain 0.01 / d balanced by runoff on the second day
    let error = wb.surface_error();
    assert!(close(error[0], 0.01));
    assert!(close(error[1], 0.01));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn surface_area_required_without_hdf5() {
    let dir = run_directory("no-area");
    let err = balance::load(&dir, &WaterBalanceOptions::default()).unwrap_err();
    assert!(matches!(err, BalanceError::MissingSurfaceArea(_)));
    std::fs::remove_dir_all(&dir).unwrap();
}
