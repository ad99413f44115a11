//! Configuration file parser for cell reconstruction

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

use geometry::Point3;
use units::{Length, mm_};
use units::todo::{Adc, Energy, EnergyPerAdc, LightYield, Pseudorapidity};

use crate::LayerId;
use crate::calibrate::{CalibrationAlgorithm, TowerCalibrator};
use crate::conservation::{ConservationChecker, DEFAULT_TOLERANCE};
use crate::digitize::{Digitizer, DEFAULT_MEAN_LIGHT_YIELD};
use crate::error::ConfigError;
use crate::frame::{Block, Frame};
use crate::index::{BinningMode, GeometryIndex};

fn deserialize_uom_opt<'d, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse::<T>())
        .transpose()
        .map_err(de::Error::custom)
}

fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    String::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

fn deserialize_uom_3d<'d, D, T>(deserializer: D) -> Result<(T, T, T), D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let (x, y, z) = <(String, String, String)>::deserialize(deserializer)?;
    tr_tup_res((x.parse(), y.parse(), z.parse()))
        .map_err(de::Error::custom)
}

/// Transpose 3-tuple of `Result`
///
/// `Ok` if all elements `Ok`; if any element is an `Err` return the first one.
fn tr_tup_res<O, E>((x,y,z): (Result<O, E>, Result<O, E>, Result<O, E>)) -> Result<(O, O, O), E> {
    Ok((x?, y?, z?))
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {

    /// One `[[layer]]` table per detector layer
    #[serde(rename = "layer")]
    pub layers: Vec<LayerConfig>,

    pub calibration: CalibrationConfig,

    /// Absent: raw tower energies go straight to calibration
    pub digitization: Option<DigitizationConfig>,

    /// Absent: no conservation audit
    pub conservation: Option<ConservationConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    pub id: LayerId,

    pub binning: BinningMode,

    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub center: (Length, Length, Length),

    /// Full extent of the block along its local x, radial direction and z
    #[serde(deserialize_with = "deserialize_uom_3d")]
    pub size: (Length, Length, Length),

    /// Requested cell size along the local x
    #[serde(deserialize_with = "deserialize_uom")]
    pub x_step: Length,

    /// Requested cell size in pseudorapidity (`eta-x` binning)
    #[serde(default)]
    pub eta_step: Option<Pseudorapidity>,

    /// Requested cell size along z (`planar` binning)
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_opt")]
    pub z_step: Option<Length>,
}

impl LayerConfig {

    pub fn block(&self) -> Block {
        let (x, y, z) = self.center;
        Block::new(Point3::new(x, y, z), self.size)
    }

    pub fn frame(&self) -> Frame { Frame::new(&self.block(), self.binning) }

    pub fn geometry_index(&self) -> Result<GeometryIndex, ConfigError> {
        let missing = |field: &'static str| ConfigError::MissingCellSize { layer: self.id, mode: self.binning, field };
        let second_step = match self.binning {
            BinningMode::EtaX   => self.eta_step.ok_or_else(|| missing("eta_step"))?,
            BinningMode::Planar => self.z_step  .map(mm_).ok_or_else(|| missing("z_step"))?,
        };
        self.block().geometry_index(self.id, self.binning, mm_(self.x_step), second_step)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    pub algorithm: CalibrationAlgorithm,

    #[serde(default)]
    pub pedestal_adc: Option<Adc>,

    #[serde(default)]
    pub gev_per_adc: Option<EnergyPerAdc>,

    /// GeV
    #[serde(default)]
    pub zero_suppression: Energy,
}

impl CalibrationConfig {
    pub fn calibrator(&self) -> Result<TowerCalibrator, ConfigError> {
        TowerCalibrator::new(self.algorithm, self.pedestal_adc, self.gev_per_adc, self.zero_suppression)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DigitizationConfig {
    /// Photons per MeV
    #[serde(default = "default_mean_light_yield")]
    pub mean_light_yield: LightYield,

    #[serde(default)]
    pub photon_statistics: bool,

    #[serde(default)]
    pub seed: u64,
}

impl DigitizationConfig {
    pub fn digitizer(&self) -> Result<Digitizer, ConfigError> {
        Digitizer::new(self.mean_light_yield, self.photon_statistics, self.seed)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConservationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl ConservationConfig {
    pub fn checker(&self) -> Result<ConservationChecker, ConfigError> { ConservationChecker::new(self.tolerance) }
}

fn default_mean_light_yield() -> LightYield { DEFAULT_MEAN_LIGHT_YIELD }
fn default_tolerance() -> f64 { DEFAULT_TOLERANCE }

pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(text)?)
}

pub fn read_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.into(), source })?;
    parse_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use units::{mm, cm, m};
    use crate::index::AxisId;

    // ----- Test the example on-disk config file ----------------------------------------
    #[test]
    fn test_config_file() {
        let config = read_config_file("cellreco-config.toml").unwrap();
        assert_eq!(config.layers.len(), 2);
        let (eta, planar) = (&config.layers[0], &config.layers[1]);
        assert_eq!(eta   .binning, BinningMode::EtaX);
        assert_eq!(planar.binning, BinningMode::Planar);
        assert!(eta   .geometry_index().is_ok());
        assert!(planar.geometry_index().is_ok());
        assert_eq!(config.calibration.algorithm, CalibrationAlgorithm::LinearPedestalGain);
        assert!(config.calibration.calibrator().is_ok());
        assert!(config.digitization.is_some());
        assert_eq!(config.conservation, Some(ConservationConfig { tolerance: 1e-6 }));
    }

    // ----- Some helpers to make the tests more concise ---------------------------------
    //  ---  Parse string as TOML  -------------------------
    fn parse<'d, D: Deserialize<'d>>(input: &'d str) -> D {
        toml::from_str(input).unwrap()
    }
    //  ---  Macro for concise assertions about values of parsed fields -------------------
    macro_rules! check {
        ($type:ident($text:expr).$field:ident = $expected:expr) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            assert_eq!(config.$field, $expected);
        };
        ($type:ident($text:expr) fields: $($field:ident = $expected:expr);+$(;)?) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            $(assert_eq!(config.$field, $expected);)*
        }
    }

    const ETA_LAYER: &str = r#"
        id       = 3
        binning  = "eta-x"
        center   = ["0 mm", "1 m", "0 mm"]
        size     = ["200 mm", "4 cm", "600 mm"]
        x_step   = "10 mm"
        eta_step = 0.05
    "#;

    // ----- Test deserializing of individual aspects of the Config type ----------------
    #[test]
    fn layer_fields() {
        check!{LayerConfig(ETA_LAYER) fields:
               id       = 3;
               binning  = BinningMode::EtaX;
               center   = (mm(0.0), m(1.0), mm(0.0));
               size     = (mm(200.0), cm(4.0), mm(600.0));
               x_step   = mm(10.0);
               eta_step = Some(0.05);
               z_step   = None;
        }
    }

    #[test]
    fn layer_geometry() {
        let layer: LayerConfig = parse(ETA_LAYER);
        let g = layer.geometry_index().unwrap();
        assert_eq!(g.layer(), 3);
        assert_eq!(g.mode(), BinningMode::EtaX);
        assert_eq!(g.bin_count(AxisId::First), 20);
    }

    #[test]
    fn planar_layer_needs_z_step() {
        let layer: LayerConfig = parse(r#"
            id      = 1
            binning = "planar"
            center  = ["0 mm", "1 m", "0 mm"]
            size    = ["200 mm", "4 cm", "600 mm"]
            x_step  = "10 mm"
        "#);
        let err = layer.geometry_index().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCellSize { layer: 1, field: "z_step", .. }));
    }

    #[test]
    fn calibration_by_name_or_code() {
        check!(CalibrationConfig(r#"algorithm = "linear""#).algorithm = CalibrationAlgorithm::LinearPedestalGain);
        check!(CalibrationConfig(r#"algorithm = 1       "#).algorithm = CalibrationAlgorithm::LinearPedestalGain);
        check!{CalibrationConfig(r#"algorithm = 0"#) fields:
               algorithm        = CalibrationAlgorithm::Passthrough;
               pedestal_adc     = None;
               gev_per_adc      = None;
               zero_suppression = 0.0;
        }
    }

    #[test]
    fn unknown_calibration_algorithm_is_rejected() {
        assert!(toml::from_str::<CalibrationConfig>(r#"algorithm = 2"#).is_err());
        assert!(toml::from_str::<CalibrationConfig>(r#"algorithm = "gain""#).is_err());
    }

    #[test]
    fn linear_calibration_without_gain_is_rejected() {
        let c: CalibrationConfig = parse(r#"
            algorithm    = "linear"
            pedestal_adc = 10.0
        "#);
        assert!(matches!(c.calibrator(), Err(ConfigError::MissingCalibrationParameter { parameter: "gev_per_adc", .. })));
    }

    #[test]
    fn digitization_defaults() {
        check!{DigitizationConfig("") fields:
               mean_light_yield  = 200.0;
               photon_statistics = false;
               seed              = 0;
        }
        check!(ConservationConfig("").tolerance = 1e-6);
    }

    // ----- Make sure that unknown fields are not accepted -----------------------------
    #[test]
    fn config_reject_unknown_field() {
        assert!(matches!(parse_config("unknown_field = 666"), Err(ConfigError::Parse(_))));
        assert!(toml::from_str::<LayerConfig>(&format!("{ETA_LAYER}\nphi_step = 1.0")).is_err());
    }

    #[test]
    fn lengths_need_units_as_strings() {
        let bad = ETA_LAYER.replace(r#""10 mm""#, "10");
        assert!(toml::from_str::<LayerConfig>(&bad).is_err());
        let bad = ETA_LAYER.replace(r#""10 mm""#, r#""10 parsecs""#);
        assert!(toml::from_str::<LayerConfig>(&bad).is_err());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(read_config_file("no/such/file.toml"), Err(ConfigError::Read { .. })));
    }
}
