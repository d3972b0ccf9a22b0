//! color scaling for per-cell fields
//!
//! Everything a plot needs to map a field onto a colormap without doing the
//! drawing: limits, normalization, colorbar ticks, and the default colormap of
//! each ATS variable.

use crate::field::{nan_max, nan_min};

use ndarray::{ArrayBase, Data, Dimension};
use num_traits::Float;

/// lower limit substituted for a zero minimum on a log scale
pub const LOG_FLOOR: f64 = 1e-8;

/// limits used on a log scale when a field has no positive values
pub const EMPTY_LOG_LIMITS: (f64, f64) = (1e-10, 1e-5);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ColorError {
    #[error("cannot derive color limits, every value is NaN")]
    NoData,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Explicit limits override the ones derived from the data
pub struct LimitOptions {
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub log: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLimits {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorLimits {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Limits of a field.
    ///
    /// Missing limits are the floor of the smallest and the ceiling of the largest
    /// non-NaN value. On a log scale a zero minimum becomes [`LOG_FLOOR`] and a
    /// zero maximum becomes ten times the minimum. An inverted range is widened to
    /// `[vmin, 2 * vmin]`.
    pub fn from_data<S, D>(data: &ArrayBase<S, D>, options: &LimitOptions) -> Result<Self, ColorError>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let mut vmin = match options.vmin {
            Some(vmin) => vmin,
            None => nan_min(data).ok_or(ColorError::NoData)?.floor(),
        };
        let mut vmax = match options.vmax {
            Some(vmax) => vmax,
            None => nan_max(data).ok_or(ColorError::NoData)?.ceil(),
        };

        if options.log {
            if vmin == 0.0 {
                vmin = LOG_FLOOR;
            }
            if vmax == 0.0 {
                vmax = vmin * 10.0;
            }
        }

        if vmax < vmin {
            vmax = vmin * 2.0;
        }

        Ok(Self { vmin, vmax })
    }

    /// smallest and largest positive value, for log scaled line plots
    pub fn positive<S, D>(data: &ArrayBase<S, D>) -> Self
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let positive = data.iter().copied().filter(|v| *v > 0.0);
        let (vmin, vmax) = positive.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or(EMPTY_LOG_LIMITS);

        Self { vmin, vmax }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Map values onto `[0, 1]` between two limits. Values outside the limits map
/// outside the interval.
pub enum Normalization {
    Linear(ColorLimits),
    Log(ColorLimits),
}

impl Normalization {
    pub fn new(limits: ColorLimits, log: bool) -> Self {
        if log {
            Self::Log(limits)
        } else {
            Self::Linear(limits)
        }
    }

    pub fn limits(&self) -> ColorLimits {
        match self {
            Self::Linear(limits) | Self::Log(limits) => *limits,
        }
    }

    /// NaN for values a log scale cannot place. A degenerate range maps to 0.
    pub fn normalize<T: Float>(&self, value: T) -> f64 {
        let value = value.to_f64().unwrap_or(f64::NAN);

        match self {
            Self::Linear(ColorLimits { vmin, vmax }) => {
                if vmin == vmax {
                    0.0
                } else {
                    (value - vmin) / (vmax - vmin)
                }
            }
            Self::Log(ColorLimits { vmin, vmax }) => {
                if value <= 0.0 || *vmin <= 0.0 {
                    return f64::NAN;
                }
                if vmin == vmax {
                    return 0.0;
                }
                (value.log10() - vmin.log10()) / (vmax.log10() - vmin.log10())
            }
        }
    }
}

/// Colorbar tick positions.
///
/// On a log scale these are the powers of ten between the limits, every other
/// power when there are more than five and an odd count. On a linear scale,
/// five evenly spaced values.
pub fn colorbar_ticks(limits: ColorLimits, log: bool) -> Vec<f64> {
    let ColorLimits { vmin, vmax } = limits;

    if log {
        let low = vmin.log10().trunc() as i32;
        let high = vmax.log10().trunc() as i32;
        let range_size = high - low + 1;
        let step = if range_size > 5 && range_size % 2 == 1 { 2 } else { 1 };

        (low..=high).step_by(step).map(|i| 10f64.powi(i)).collect()
    } else {
        linspace(vmin, vmax, 5)
    }
}

fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            values[num - 1] = stop;
            values
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Jet,
    Terrain,
    /// colorcet linear `CET_L17`
    CetL17,
    Seismic,
    /// colorcet rainbow `CET_R4`
    CetR4,
}

impl Colormap {
    /// matplotlib / colorcet name of the colormap
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jet => "jet",
            Self::Terrain => "terrain",
            Self::CetL17 => "CET_L17",
            Self::Seismic => "seismic",
            Self::CetR4 => "CET_R4",
        }
    }
}

/// default colormap of a variable, `jet` for anything without one
pub fn colormap_for(variable: &str) -> Colormap {
    match variable {
        "elevation" => Colormap::Terrain,
        "ponded_depth" => Colormap::CetL17,
        "surface_subsurface_flux" => Colormap::Seismic,
        "pressure" | "pres_elev" => Colormap::CetR4,
        _ => Colormap::Jet,
    }
}

/// whether an axis with this maximum should use scientific notation
pub fn use_scientific(max: f64) -> bool {
    max >= 1000.0 || max < 0.01
}

/// Round a positive maximum up at its leading digit, `0.23 -> 0.3`, `370 -> 400`
pub fn source_axis_max(max: f64) -> Option<f64> {
    if !(max.is_finite() && max > 0.0) {
        return None;
    }

    let magnitude = 10f64.powf(max.log10().floor());
    Some((max / magnitude).ceil() * magnitude)
}

#[derive(Debug, Clone, PartialEq)]
/// Inverted secondary axis for source terms drawn from the top of a plot
pub struct SourceAxis {
    /// rounded data maximum
    pub max: f64,
    /// lower end of the inverted axis
    pub limit: f64,
    pub ticks: Vec<f64>,
    pub scientific: bool,
}

impl SourceAxis {
    /// `yscale` is the fraction of the plot height the sources may fill
    pub fn new(data_max: f64, yscale: f64) -> Option<Self> {
        let max = source_axis_max(data_max)?;

        Some(Self {
            max,
            limit: max / yscale,
            ticks: (0..5).map(|i| i as f64 * max / 2.0).collect(),
            scientific: max >= 1000.0,
        })
    }
}
