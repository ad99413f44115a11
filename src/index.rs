//! Bin grids of detector layers.
//!
//! Each layer is divided into a uniform rectangular grid over two axes of its
//! working frame. The grid is fixed once per run from the layer's geometry and
//! the requested cell sizes, and is read-only thereafter.

use serde::Deserialize;
use thiserror::Error;

use geometry::{Point2, Rectangle};
use units::todo::FrameCoordinate;

use crate::{BinIndex, LayerId};
use crate::error::ConfigError;

/// How a layer's working frame is defined
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum BinningMode {
    /// Axis 1: local transverse position (mm). Axis 2: pseudorapidity.
    #[serde(rename = "eta-x")]
    EtaX,
    /// Axis 1: local transverse position (mm). Axis 2: z (mm).
    #[serde(rename = "planar")]
    Planar,
}

impl std::fmt::Display for BinningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningMode::EtaX   => write!(f, "eta-x"),
            BinningMode::Planar => write!(f, "planar"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisId { First, Second }

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisId::First  => write!(f, "axis 1"),
            AxisId::Second => write!(f, "axis 2"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TilingError {
    #[error("requested step must be positive and finite, got {0}")]
    NonPositiveStep(f64),
    #[error("span must be positive and finite, got [{0}, {1}]")]
    BadSpan(f64, f64),
}

/// An axis with `nbins` equal-sized bins covering `[min, min + nbins * step)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    nbins: usize,
    min: FrameCoordinate,
    step: FrameCoordinate,
}

impl Axis {

    /// Tile `[min, max]` with bins no wider than `requested_step`.
    ///
    /// If the span is not an exact multiple of the requested step, one more
    /// bin is added and the step shrunk so that the bins exactly cover the
    /// span: no gap, no overhang.
    pub fn tiling(min: FrameCoordinate, max: FrameCoordinate, requested_step: FrameCoordinate) -> Result<Self, TilingError> {
        if !(requested_step > 0.0 && requested_step.is_finite()) {
            return Err(TilingError::NonPositiveStep(requested_step))
        }
        let span = max - min;
        if !(span > 0.0 && span.is_finite()) {
            return Err(TilingError::BadSpan(min, max))
        }
        let steps = span / requested_step;
        let mut nbins = steps.trunc();
        if steps.fract() != 0.0 { nbins += 1.0 }
        let step = span / nbins;
        Ok(Self { nbins: nbins as usize, min, step })
    }

    pub fn nbins(&self) -> usize { self.nbins }
    pub fn min  (&self) -> FrameCoordinate { self.min }
    pub fn step (&self) -> FrameCoordinate { self.step }
    pub fn max  (&self) -> FrameCoordinate { self.min + self.nbins as f64 * self.step }

    /// Index of the bin containing `x`. Not range-checked: see `BinIndex`.
    /// NaN lands in bin -1.
    pub fn index(&self, x: FrameCoordinate) -> BinIndex {
        if x.is_nan() { return -1 }
        ((x - self.min) / self.step).floor() as BinIndex
    }

    /// `index` constrained to the axis
    pub fn checked_index(&self, x: FrameCoordinate) -> Option<usize> {
        let i = self.index(x);
        (0..self.nbins as BinIndex).contains(&i).then_some(i as usize)
    }

    pub fn centre(&self, i: usize) -> FrameCoordinate {
        self.min + (i as f64 + 0.5) * self.step
    }
}

/// Immutable description of one layer's bin grid
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryIndex {
    layer: LayerId,
    mode: BinningMode,
    axes: [Axis; 2],
}

impl GeometryIndex {

    pub fn new(layer: LayerId, mode: BinningMode, axis1: Axis, axis2: Axis) -> Self {
        Self { layer, mode, axes: [axis1, axis2] }
    }

    /// Build the grid from the span and requested step size on each axis
    pub fn from_spans(
        layer: LayerId,
        mode: BinningMode,
        (min1, max1, step1): (FrameCoordinate, FrameCoordinate, FrameCoordinate),
        (min2, max2, step2): (FrameCoordinate, FrameCoordinate, FrameCoordinate),
    ) -> Result<Self, ConfigError> {
        let tile = |axis, min, max, step| Axis::tiling(min, max, step)
            .map_err(|source| ConfigError::Tiling { layer, axis, source });
        let axis1 = tile(AxisId::First , min1, max1, step1)?;
        let axis2 = tile(AxisId::Second, min2, max2, step2)?;
        Ok(Self::new(layer, mode, axis1, axis2))
    }

    pub fn layer(&self) -> LayerId     { self.layer }
    pub fn mode (&self) -> BinningMode { self.mode  }

    pub fn axis(&self, axis: AxisId) -> &Axis {
        match axis {
            AxisId::First  => &self.axes[0],
            AxisId::Second => &self.axes[1],
        }
    }

    pub fn bin_index (&self, axis: AxisId, x: FrameCoordinate) -> BinIndex { self.axis(axis).index(x) }
    pub fn bin_centre(&self, axis: AxisId, i: usize) -> FrameCoordinate { self.axis(axis).centre(i) }
    pub fn bin_count (&self, axis: AxisId) -> usize { self.axis(axis).nbins() }
    pub fn bin_width (&self, axis: AxisId) -> FrameCoordinate { self.axis(axis).step() }

    /// Total number of cells in the grid
    pub fn n_cells(&self) -> usize { self.axes[0].nbins() * self.axes[1].nbins() }

    /// Unchecked bin indices of `p` on both axes
    pub fn bins_of(&self, p: Point2) -> (BinIndex, BinIndex) {
        (self.axes[0].index(p.x), self.axes[1].index(p.y))
    }

    /// Convert signed bin indices into grid indices, if they lie on the grid
    pub fn on_grid(&self, (i, j): (BinIndex, BinIndex)) -> Option<(usize, usize)> {
        let in_range = |k: BinIndex, axis: &Axis| (0..axis.nbins() as BinIndex).contains(&k);
        (in_range(i, &self.axes[0]) && in_range(j, &self.axes[1])).then_some((i as usize, j as usize))
    }

    /// The rectangle covered by cell `(i, j)`
    pub fn cell(&self, i: usize, j: usize) -> Rectangle {
        let [a, b] = &self.axes;
        Rectangle::centred(Point2::new(a.centre(i), b.centre(j)), a.step(), b.step())
    }

    /// Position of cell `(i, j)` in a flat, axis-1-major array of all cells
    pub fn flat_index(&self, i: usize, j: usize) -> usize { i * self.axes[1].nbins() + j }
}
