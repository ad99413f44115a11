pub use crate::types::{LayerId, HitId, EventId, BinIndex};
pub use crate::error::ConfigError;
pub use crate::index::{Axis, AxisId, BinningMode, GeometryIndex};
pub use crate::deposit::{DepositRecord, StepHit};
pub use crate::cell::{Cell, CellKey, CellContainer};
pub use crate::binner::CellBinner;
pub use crate::tower::{Tower, TowerKey, TowerContainer};
pub use crate::calibrate::{CalibrationAlgorithm, TowerCalibrator};
pub use crate::conservation::{ConservationChecker, ConservationReport};
pub use crate::pipeline::{Event, EventOutput, Pipeline};

pub use geometry::{Point2, Point3};
pub use units::todo::{Energy, Adc, LightYield, Weight};
