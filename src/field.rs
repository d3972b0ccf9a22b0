//! per-cell field helpers
//!
//! Subsurface variables are stored column by column: every surface cell owns
//! `num_layers` consecutive cells, top to bottom. A `(steps, cells)` series can
//! therefore be viewed as `(steps, surface cells, layers)`.

use ndarray::{s, Array, Array1, ArrayBase, ArrayView1, ArrayView2, Data, Dimension};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FieldError {
    #[error("{num_cells} cells do not divide evenly into columns of {num_surface} surface cells")]
    UnevenLayers { num_cells: usize, num_surface: usize },
    #[error("step {step} is out of range for a series with {num_steps} steps")]
    StepOutOfRange { step: usize, num_steps: usize },
    #[error("layer {layer} is out of range for a mesh with {num_layers} layers")]
    LayerOutOfRange { layer: usize, num_layers: usize },
    #[error("fields have different lengths: {left} and {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// number of cells below each surface cell
pub fn num_layers(num_cells: usize, num_surface: usize) -> Result<usize, FieldError> {
    if num_surface == 0 || num_cells % num_surface != 0 {
        return Err(FieldError::UnevenLayers {
            num_cells,
            num_surface,
        });
    }

    Ok(num_cells / num_surface)
}

/// Values of one layer at one step, one per surface cell.
///
/// `series` is `(steps, cells)`. The result is element `[step, :, layer]` of the
/// series viewed as `(steps, num_surface, num_layers)`.
pub fn layer_slice(
    series: ArrayView2<f64>,
    num_surface: usize,
    step: usize,
    layer: usize,
) -> Result<Array1<f64>, FieldError> {
    let (num_steps, num_cells) = series.dim();
    let layers = num_layers(num_cells, num_surface)?;

    if step >= num_steps {
        return Err(FieldError::StepOutOfRange { step, num_steps });
    }
    if layer >= layers {
        return Err(FieldError::LayerOutOfRange {
            layer,
            num_layers: layers,
        });
    }

    let stride = layers as isize;
    Ok(series.row(step).slice(s![layer..;stride]).to_owned())
}

/// element-wise product of two surface fields
pub fn product(left: ArrayView1<f64>, right: ArrayView1<f64>) -> Result<Array1<f64>, FieldError> {
    if left.len() != right.len() {
        return Err(FieldError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    Ok(&left * &right)
}

/// replace every value `<= 0` with NaN
pub fn mask_nonpositive<S, D>(data: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.mapv(|v| if v <= 0.0 { f64::NAN } else { v })
}

/// raise every value `<= floor` to `floor`
pub fn clamp_below<S, D>(data: &ArrayBase<S, D>, floor: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.mapv(|v| if v <= floor { floor } else { v })
}

/// smallest value ignoring NaN, `None` when every value is NaN
pub fn nan_min<S, D>(data: &ArrayBase<S, D>) -> Option<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |min: Option<f64>, v| Some(min.map_or(v, |m| m.min(v))))
}

/// largest value ignoring NaN, `None` when every value is NaN
pub fn nan_max<S, D>(data: &ArrayBase<S, D>) -> Option<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
}
