//! Configuration errors.
//!
//! These indicate a setup defect rather than a data defect: the run cannot
//! proceed without fixing them. Anomalies in the data themselves (hits outside
//! the grid, non-finite contributions, conservation mismatches) are never
//! errors; they are reported through the log.

use std::path::PathBuf;
use thiserror::Error;

use crate::LayerId;
use crate::index::{AxisId, BinningMode, TilingError};
use crate::calibrate::CalibrationAlgorithm;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("layer {layer}, {axis}: {source}")]
    Tiling { layer: LayerId, axis: AxisId, #[source] source: TilingError },

    #[error("layer {layer}: {mode} binning needs `{field}`")]
    MissingCellSize { layer: LayerId, mode: BinningMode, field: &'static str },

    #[error("layer {0} configured more than once")]
    DuplicateLayer(LayerId),

    #[error("invalid calibration algorithm #{0}")]
    UnknownCalibrationCode(i64),

    #[error("unknown calibration algorithm `{0}`")]
    UnknownCalibrationName(String),

    #[error("{algorithm} calibration needs a finite `{parameter}`")]
    MissingCalibrationParameter { algorithm: CalibrationAlgorithm, parameter: &'static str },

    #[error("zero suppression threshold must be finite, got {0}")]
    BadZeroSuppression(f64),

    #[error("mean light yield must be finite and non-negative, got {0}")]
    BadLightYield(f64),

    #[error("energy conservation tolerance must be positive, got {0}")]
    BadTolerance(f64),

    #[error("couldn't read config file `{path}`")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("couldn't parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
