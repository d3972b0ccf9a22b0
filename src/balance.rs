//! water and snow mass balance of an ATS run
//!
//! Reads the `water_balance.dat` observation file and reduces it to the
//! cumulative fluxes and balance errors used when debugging a simulation.
//! Every quantity is converted to meters of water over the surface area.

use crate::field::nan_max;
use crate::timeseries::{read_table, DelimitedTable, ReadOptions, TableError};

use ndarray::{s, Array1, ArrayView1};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// molar density of liquid water, mol / m^3
pub const MOLAR_DENSITY_WATER: f64 = 55500.0;

/// name of the observation file inside a run directory
pub const WATER_BALANCE_FILE: &str = "water_balance.dat";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// first day of year of each month, followed by the end of the year
const MONTH_STARTS: [u32; 13] = [1, 32, 61, 92, 122, 153, 183, 214, 245, 275, 306, 336, 366];

mod columns {
    pub(super) const TIME: [&str; 2] = ["time [d]", "time"];
    pub(super) const RAIN: &str = "rain precipitation [m d^-1]";
    pub(super) const SNOW_MELT: &str = "snow melt [m d^-1]";
    pub(super) const EVAPOTRANSPIRATION: &str = "evapotranspiration [m d^-1]";
    pub(super) const RUNOFF: &str = "runoff generation [mol d^-1]";
    pub(super) const SURFACE_WATER: &str = "surface water content [mol]";
    pub(super) const SUBSURFACE_WATER: &str = "subsurface water content [mol]";
    pub(super) const SNOW_WATER: &str = "snow water content [mol]";
    pub(super) const SNOW_PRECIPITATION: &str = "snow precipitation [m d^-1]";
    pub(super) const CANOPY_WATER: &str = "canopy water content [mol]";
    pub(super) const CANOPY_INTERCEPTION: &str = "canopy interception [m d^-1]";
    pub(super) const CANOPY_DRAINAGE: &str = "canopy drainage [m d^-1]";
    pub(super) const CANOPY_EVAPORATION: &str = "canopy evaporation [m d^-1]";
    pub(super) const SNOW_EVAPORATION: &str = "snow evaporation [m d^-1]";
}

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("no surface area given and no surface visualization file could be read in {0}")]
    MissingSurfaceArea(PathBuf),
    #[error("surface area must be positive, got {0}")]
    InvalidSurfaceArea(f64),
    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    File(#[from] crate::mesh::file::FileError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterBalanceOptions {
    /// total surface area in m^2. When `None` it is read from
    /// `ats_vis_surface_data.h5` (requires the `hdf5` feature)
    pub surface_area: Option<f64>,
    pub delimiter: char,
}

impl Default for WaterBalanceOptions {
    fn default() -> Self {
        Self {
            surface_area: None,
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// canopy storage and fluxes, only written by runs with a canopy model
pub struct Canopy {
    /// m
    pub water: Array1<f64>,
    /// m / d
    pub interception: Array1<f64>,
    /// m / d
    pub drainage: Array1<f64>,
    /// m / d
    pub evaporation: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
/// Water balance time series of a single run.
///
/// Fluxes are in m / d and storages in m, both per unit surface area.
pub struct WaterBalance {
    /// days
    pub time: Array1<f64>,
    pub rain: Array1<f64>,
    pub snow_melt: Array1<f64>,
    pub evapotranspiration: Array1<f64>,
    pub runoff: Array1<f64>,
    /// surface plus subsurface water
    pub water: Array1<f64>,
    pub snow: Array1<f64>,
    pub snow_precipitation: Array1<f64>,
    pub canopy: Option<Canopy>,
    pub snow_evaporation: Option<Array1<f64>>,
    pub surface_area: f64,
}

impl WaterBalance {
    /// Convert the columns of an observation table. Molar quantities are divided
    /// by the molar density of water and the surface area.
    pub fn from_table(table: &DelimitedTable, surface_area: f64) -> Result<Self, BalanceError> {
        if surface_area.is_nan() || surface_area <= 0.0 {
            return Err(BalanceError::InvalidSurfaceArea(surface_area));
        }

        let to_meters = |values: ArrayView1<f64>| values.mapv(|v| v / MOLAR_DENSITY_WATER / surface_area);
        let column = |name: &str| table.column(name).map(|c| c.to_owned());

        let water = &table.column(columns::SURFACE_WATER)?
            + &table.column(columns::SUBSURFACE_WATER)?;

        let canopy_columns = [
            columns::CANOPY_WATER,
            columns::CANOPY_INTERCEPTION,
            columns::CANOPY_DRAINAGE,
            columns::CANOPY_EVAPORATION,
        ];
        let canopy = if canopy_columns.iter().all(|name| table.has_column(name)) {
            Some(Canopy {
                water: to_meters(table.column(columns::CANOPY_WATER)?),
                interception: column(columns::CANOPY_INTERCEPTION)?,
                drainage: column(columns::CANOPY_DRAINAGE)?,
                evaporation: column(columns::CANOPY_EVAPORATION)?,
            })
        } else {
            let missing: Vec<&str> = canopy_columns
                .iter()
                .copied()
                .filter(|name| !table.has_column(name))
                .collect();
            tracing::warn!(?missing, "incomplete canopy columns in water balance, skipping canopy");
            None
        };

        let snow_evaporation = if table.has_column(columns::SNOW_EVAPORATION) {
            Some(column(columns::SNOW_EVAPORATION)?)
        } else {
            tracing::warn!("no snow evaporation column in water balance");
            None
        };

        Ok(Self {
            time: table.column_any(&columns::TIME)?.to_owned(),
            rain: column(columns::RAIN)?,
            snow_melt: column(columns::SNOW_MELT)?,
            evapotranspiration: column(columns::EVAPOTRANSPIRATION)?,
            runoff: to_meters(table.column(columns::RUNOFF)?),
            water: to_meters(water.view()),
            snow: to_meters(table.column(columns::SNOW_WATER)?),
            snow_precipitation: column(columns::SNOW_PRECIPITATION)?,
            canopy,
            snow_evaporation,
            surface_area,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// `P + SM - ET - Q` at every observation
    pub fn net_flux(&self) -> Array1<f64> {
        &self.rain + &self.snow_melt - &self.evapotranspiration - &self.runoff
    }

    /// cumulative net flux minus the change in stored water
    pub fn surface_error(&self) -> Array1<f64> {
        cumulative_sum(self.net_flux().view()) - change_from_start(self.water.view())
    }

    /// first differences of [`surface_error`](Self::surface_error)
    pub fn delta_error(&self) -> Array1<f64> {
        differences(self.surface_error().view())
    }

    pub fn max_surface_error(&self) -> Option<f64> {
        nan_max(&self.surface_error())
    }

    /// snow net input minus the change in snow storage
    pub fn snow_error(&self) -> Array1<f64> {
        let mut net = &self.snow_precipitation - &self.snow_melt;
        if let Some(evaporation) = &self.snow_evaporation {
            net -= evaporation;
        }

        cumulative_sum(net.view()) - change_from_start(self.snow.view())
    }

    pub fn max_snow_error(&self) -> Option<f64> {
        nan_max(&self.snow_error())
    }

    /// all water stored in the domain: surface, subsurface, snow, and canopy
    pub fn total_water(&self) -> Array1<f64> {
        let mut total = &self.water + &self.snow;
        if let Some(canopy) = &self.canopy {
            total += &canopy.water;
        }
        total
    }
}

/// Read `water_balance.dat` from a run directory
pub fn load<P: AsRef<Path>>(
    directory: P,
    options: &WaterBalanceOptions,
) -> Result<WaterBalance, BalanceError> {
    let directory = directory.as_ref();
    let surface_area = match options.surface_area {
        Some(area) => area,
        None => surface_area_from_vis(directory)?,
    };

    let path = directory.join(WATER_BALANCE_FILE);
    let reader = BufReader::new(std::fs::File::open(&path)?);
    let read_options = ReadOptions {
        delimiter: options.delimiter,
        ..ReadOptions::default()
    };
    let table = read_table(reader, &read_options)?;

    tracing::debug!(
        path = %path.display(),
        rows = table.nrows(),
        surface_area,
        "loaded water balance"
    );

    WaterBalance::from_table(&table, surface_area)
}

#[cfg(feature = "hdf5")]
fn surface_area_from_vis(directory: &Path) -> Result<f64, BalanceError> {
    let vis = crate::mesh::file::VisFile::new(directory, Some("surface"));
    Ok(vis.surface_area()?)
}

#[cfg(not(feature = "hdf5"))]
fn surface_area_from_vis(directory: &Path) -> Result<f64, BalanceError> {
    Err(BalanceError::MissingSurfaceArea(directory.to_path_buf()))
}

/// running total of `values`
pub fn cumulative_sum(values: ArrayView1<f64>) -> Array1<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

fn change_from_start(values: ArrayView1<f64>) -> Array1<f64> {
    match values.get(0) {
        Some(&start) => values.mapv(|v| v - start),
        None => Array1::zeros(0),
    }
}

fn differences(values: ArrayView1<f64>) -> Array1<f64> {
    if values.len() < 2 {
        return Array1::zeros(0);
    }
    &values.slice(s![1..]) - &values.slice(s![..-1])
}

/// Label a time in days with its day of year, `"300 (Oct 26)"`.
///
/// Days wrap every 365 days.
pub fn day_of_year_label(day: f64) -> String {
    let day_of_year = day.rem_euclid(365.0) + 1.0;
    let month = MONTH_STARTS
        .iter()
        .position(|&start| f64::from(start) > day_of_year)
        .map_or(MONTHS.len() - 1, |i| i.saturating_sub(1));

    let day_of_month = (day_of_year - f64::from(MONTH_STARTS[month])).floor() as i64;

    format!("{} ({} {})", day.trunc() as i64, MONTHS[month], day_of_month)
}

/// Tick positions and labels for a water year (October through September),
/// every other month.
pub fn water_year_ticks() -> Vec<(u32, String)> {
    let first = MONTH_STARTS[9];
    let last = first + 365;

    (0..2)
        .flat_map(|year| {
            let months = MONTHS.iter().map(Some).chain(std::iter::once(None));
            MONTH_STARTS
                .iter()
                .zip(months)
                .map(move |(start, month)| (start + 365 * year, month))
        })
        .skip(1)
        .step_by(2)
        .filter(|(day, _)| (first..=last).contains(day))
        .filter_map(|(day, month)| Some((day, format!("{} ({day})", month?))))
        .collect()
}
