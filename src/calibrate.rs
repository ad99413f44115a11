//! Conversion of raw tower signals into calibrated energies.

use std::str::FromStr;

use log::debug;
use serde::Deserialize;

use units::todo::{Adc, Energy, EnergyPerAdc};

use crate::error::ConfigError;
use crate::tower::{Tower, TowerContainer};

/// How raw tower signals are turned into energies.
///
/// In configuration files this may be given by name (`"passthrough"`,
/// `"linear"`) or by its historical integer code (0, 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AlgorithmSpec")]
pub enum CalibrationAlgorithm {
    /// Raw signal is already an energy: only zero suppression is applied
    Passthrough,
    /// `(raw - pedestal) * gain`, then zero suppression
    LinearPedestalGain,
}

impl CalibrationAlgorithm {
    pub fn code(self) -> i64 {
        match self {
            Self::Passthrough        => 0,
            Self::LinearPedestalGain => 1,
        }
    }
}

impl std::fmt::Display for CalibrationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passthrough        => write!(f, "passthrough"),
            Self::LinearPedestalGain => write!(f, "linear"),
        }
    }
}

impl TryFrom<i64> for CalibrationAlgorithm {
    type Error = ConfigError;
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Passthrough),
            1 => Ok(Self::LinearPedestalGain),
            _ => Err(ConfigError::UnknownCalibrationCode(code)),
        }
    }
}

impl FromStr for CalibrationAlgorithm {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passthrough" => Ok(Self::Passthrough),
            "linear"      => Ok(Self::LinearPedestalGain),
            _ => Err(ConfigError::UnknownCalibrationName(s.into())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AlgorithmSpec {
    Code(i64),
    Name(String),
}

impl TryFrom<AlgorithmSpec> for CalibrationAlgorithm {
    type Error = ConfigError;
    fn try_from(spec: AlgorithmSpec) -> Result<Self, Self::Error> {
        match spec {
            AlgorithmSpec::Code(code) => code.try_into(),
            AlgorithmSpec::Name(name) => name.parse(),
        }
    }
}

/// Calibration parameters, fixed for the whole run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerCalibrator {
    algorithm: CalibrationAlgorithm,
    pedestal: Adc,
    gain: EnergyPerAdc,
    /// GeV. Only towers with calibrated energy strictly above this are kept.
    zero_suppression: Energy,
}

impl TowerCalibrator {

    pub fn passthrough(zero_suppression: Energy) -> Result<Self, ConfigError> {
        Self::new(CalibrationAlgorithm::Passthrough, None, None, zero_suppression)
    }

    pub fn linear(pedestal: Adc, gain: EnergyPerAdc, zero_suppression: Energy) -> Result<Self, ConfigError> {
        Self::new(CalibrationAlgorithm::LinearPedestalGain, Some(pedestal), Some(gain), zero_suppression)
    }

    /// Pedestal and gain are ignored by `Passthrough` but required, and must
    /// be finite, for `LinearPedestalGain`.
    pub fn new(
        algorithm: CalibrationAlgorithm,
        pedestal: Option<Adc>,
        gain: Option<EnergyPerAdc>,
        zero_suppression: Energy,
    ) -> Result<Self, ConfigError> {
        if !zero_suppression.is_finite() {
            return Err(ConfigError::BadZeroSuppression(zero_suppression))
        }
        let require = |value: Option<f64>, parameter: &'static str| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ConfigError::MissingCalibrationParameter { algorithm, parameter }),
        };
        let (pedestal, gain) = match algorithm {
            CalibrationAlgorithm::Passthrough        => (0.0, 1.0),
            CalibrationAlgorithm::LinearPedestalGain => (require(pedestal, "pedestal_adc")?,
                                                         require(gain    , "gev_per_adc")?),
        };
        Ok(Self { algorithm, pedestal, gain, zero_suppression })
    }

    pub fn algorithm       (&self) -> CalibrationAlgorithm { self.algorithm }
    pub fn zero_suppression(&self) -> Energy               { self.zero_suppression }

    pub fn calibrated_energy(&self, raw: Adc) -> Energy {
        match self.algorithm {
            CalibrationAlgorithm::Passthrough        => raw,
            CalibrationAlgorithm::LinearPedestalGain => (raw - self.pedestal) * self.gain,
        }
    }

    /// Calibrated energy, if it survives zero suppression
    pub fn calibrate_energy(&self, raw: Adc) -> Option<Energy> {
        let energy = self.calibrated_energy(raw);
        (energy > self.zero_suppression).then_some(energy)
    }

    pub fn calibrate(&self, raw: &TowerContainer) -> TowerContainer {
        let calibrated: TowerContainer = raw.iter()
            .filter_map(|&Tower { key, energy }| {
                self.calibrate_energy(energy).map(|energy| Tower { key, energy })
            })
            .collect();
        debug!("{} calibration: {} -> {} towers, {} -> {} GeV",
               self.algorithm, raw.len(), calibrated.len(), raw.total_energy(), calibrated.total_energy());
        calibrated
    }
}
