//! Audit of energy conservation between raw deposits and binned cells.

use log::{debug, warn};

use units::todo::Energy;

use crate::{DepositRecord, EventId};
use crate::cell::CellContainer;
use crate::error::ConfigError;

/// Relative tolerance absorbing rounding in path-length apportionment
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConservationReport {
    pub ok: bool,
    pub raw_total: Energy,
    pub cell_total: Energy,
    /// `cell_total - raw_total`
    pub delta: Energy,
}

impl ConservationReport {
    /// `|delta| / |raw_total|`
    pub fn relative_delta(&self) -> f64 {
        if self.delta == 0.0 { 0.0 } else { (self.delta / self.raw_total).abs() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConservationChecker {
    tolerance: f64,
}

impl Default for ConservationChecker {
    fn default() -> Self { Self { tolerance: DEFAULT_TOLERANCE } }
}

impl ConservationChecker {

    pub fn new(tolerance: f64) -> Result<Self, ConfigError> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(ConfigError::BadTolerance(tolerance))
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 { self.tolerance }

    /// Compare the sum of `raw` deposited energies with the energy in `cells`.
    ///
    /// A mismatch is not an error, but it is logged: persistent mismatches
    /// point to a defect in the geometry or the binning.
    pub fn check(&self, event: EventId, raw: impl IntoIterator<Item = Energy>, cells: &CellContainer) -> ConservationReport {
        let raw_total: Energy = raw.into_iter().sum();
        let cell_total = cells.total_edep();
        let delta = cell_total - raw_total;
        let mut report = ConservationReport { ok: true, raw_total, cell_total, delta };
        report.ok = report.relative_delta() <= self.tolerance;
        if report.ok {
            debug!("event {event}: energy conserved, {cell_total} GeV in {} cells", cells.len());
        } else {
            warn!("event {event}: energy not conserved: deposits {raw_total} GeV, cells {cell_total} GeV, \
                   delta {delta:e} (relative {:e}, tolerance {:e})",
                  report.relative_delta(), self.tolerance);
        }
        report
    }

    pub fn check_deposits(&self, event: EventId, deposits: &[DepositRecord], cells: &CellContainer) -> ConservationReport {
        self.check(event, deposits.iter().map(|d| d.edep), cells)
    }
}
