//! Per-event processing: projection, binning, conservation audit, tower
//! building, digitization and calibration.
//!
//! All run-wide state (layer geometries and frames, calibration and
//! digitization parameters) is read-only once the `Pipeline` is built, so a
//! single `Pipeline` can be shared by any number of threads. The only mutable
//! state is the per-event cell accumulator inside `CellBinner`, of which each
//! worker owns its own.

use std::collections::BTreeMap;

use log::{info, warn};
use rayon::prelude::*;

use crate::{EventId, LayerId};
use crate::binner::{BinningStats, CellBinner};
use crate::calibrate::TowerCalibrator;
use crate::cell::CellContainer;
use crate::config::Config;
use crate::conservation::{ConservationChecker, ConservationReport};
use crate::deposit::{DepositRecord, StepHit};
use crate::digitize::Digitizer;
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::index::{AxisId, GeometryIndex};
use crate::tower::TowerContainer;

/// All the simulated steps of one event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub hits: Vec<StepHit>,
}

/// Everything produced for one event, stage by stage
#[derive(Clone, Debug, PartialEq)]
pub struct EventOutput {
    pub id: EventId,
    pub cells: CellContainer,
    pub raw_towers: TowerContainer,
    /// Present if digitization is enabled
    pub digitized: Option<TowerContainer>,
    pub calibrated: TowerContainer,
    /// Present if the conservation audit is enabled
    pub conservation: Option<ConservationReport>,
    pub stats: BinningStats,
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    frames: BTreeMap<LayerId, Frame>,
    /// Prototype from which each worker's binner is cloned
    binner: CellBinner,
    digitizer: Option<Digitizer>,
    calibrator: TowerCalibrator,
    checker: Option<ConservationChecker>,
}

impl Pipeline {

    pub fn new(
        layers: impl IntoIterator<Item = (GeometryIndex, Frame)>,
        digitizer: Option<Digitizer>,
        calibrator: TowerCalibrator,
        checker: Option<ConservationChecker>,
    ) -> Result<Self, ConfigError> {
        let (geometries, frames): (Vec<_>, BTreeMap<_, _>) = layers.into_iter()
            .map(|(g, f)| { let layer = g.layer(); (g, (layer, f)) })
            .unzip();
        let binner = CellBinner::new(geometries)?;
        Ok(Self { frames, binner, digitizer, calibrator, checker })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let layers = config.layers.iter()
            .map(|layer| -> Result<_, ConfigError> { Ok((layer.geometry_index()?, layer.frame())) })
            .collect::<Result<Vec<_>, _>>()?;
        let digitizer  = config.digitization.as_ref().map(|d| d.digitizer()).transpose()?;
        let checker    = config.conservation.as_ref().map(|c| c.checker()  ).transpose()?;
        let calibrator = config.calibration.calibrator()?;
        let pipeline = Self::new(layers, digitizer, calibrator, checker)?;
        pipeline.log_setup();
        Ok(pipeline)
    }

    fn log_setup(&self) {
        for g in self.binner.layers() {
            let (a, b) = (g.axis(AxisId::First), g.axis(AxisId::Second));
            info!("layer {} ({}): {} x {} cells, steps {:.6} x {:.6}, axis 2 in [{:.6}, {:.6}]",
                  g.layer(), g.mode(), a.nbins(), b.nbins(), a.step(), b.step(), b.min(), b.max());
        }
        info!("calibration: {}, zero suppression {} GeV",
              self.calibrator.algorithm(), self.calibrator.zero_suppression());
        match &self.digitizer {
            Some(d) => info!("digitization: {} photons/MeV, photon statistics {}",
                             d.mean_light_yield(), if d.photon_statistics() { "on" } else { "off" }),
            None    => info!("digitization: off"),
        }
        match &self.checker {
            Some(c) => info!("energy conservation audit: tolerance {:e}", c.tolerance()),
            None    => info!("energy conservation audit: off"),
        }
    }

    /// A binner suitable for use with `process_with`
    pub fn fresh_binner(&self) -> CellBinner { self.binner.clone() }

    pub fn geometry(&self, layer: LayerId) -> Option<&GeometryIndex> { self.binner.geometry(layer) }

    /// Express the hits in their layers' working frames. Hits in unknown
    /// layers are dropped and counted.
    pub fn project(&self, hits: &[StepHit]) -> (Vec<DepositRecord>, usize) {
        let mut unknown = 0;
        let deposits = hits.iter()
            .filter_map(|hit| {
                let frame = self.frames.get(&hit.layer);
                if frame.is_none() { unknown += 1 }
                frame.map(|f| hit.project(f))
            })
            .collect();
        (deposits, unknown)
    }

    /// Process one event, accumulating cells in `binner`
    pub fn process_with(&self, binner: &mut CellBinner, event: &Event) -> EventOutput {
        let (deposits, unknown) = self.project(&event.hits);
        if unknown > 0 {
            warn!("event {}: {unknown} hits in layers without geometry were ignored", event.id);
        }
        let cells = binner.bin_event(&deposits);
        let mut stats = binner.stats();
        stats.deposits      += unknown;
        stats.unknown_layer += unknown;

        // Audit against all hits, including those which could not be binned
        let conservation = self.checker.map(|checker| {
            checker.check(event.id, event.hits.iter().map(|h| h.edep), &cells)
        });

        let raw_towers = TowerContainer::from_cells(&cells);
        let digitized = self.digitizer.map(|digitizer| {
            digitizer.digitize(&raw_towers, &mut digitizer.event_rng(event.id))
        });
        let calibrated = self.calibrator.calibrate(digitized.as_ref().unwrap_or(&raw_towers));

        EventOutput { id: event.id, cells, raw_towers, digitized, calibrated, conservation, stats }
    }

    pub fn process_event(&self, event: &Event) -> EventOutput {
        self.process_with(&mut self.fresh_binner(), event)
    }

    /// Process events one after the other, reusing a single binner
    pub fn process_events_sequentially(&self, events: &[Event]) -> Vec<EventOutput> {
        let mut binner = self.fresh_binner();
        events.iter()
            .map(|event| self.process_with(&mut binner, event))
            .collect()
    }

    /// Process events in parallel, in the current rayon thread pool. Each
    /// worker gets its own binner. Output is in input order.
    pub fn process_events(&self, events: &[Event]) -> Vec<EventOutput> {
        events.par_iter()
            .map_init(|| self.fresh_binner(),
                      |binner, event| self.process_with(binner, event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use float_eq::assert_float_eq;
    use geometry::Point3;
    use units::mm;
    use crate::calibrate::CalibrationAlgorithm;
    use crate::config::parse_config;

    const CONFIG: &str = r#"
        [[layer]]
        id      = 0
        binning = "planar"
        center  = ["0 mm", "1000 mm", "0 mm"]
        size    = ["100 mm", "20 mm", "100 mm"]
        x_step  = "10 mm"
        z_step  = "10 mm"

        [calibration]
        algorithm        = "passthrough"
        zero_suppression = 0.01

        [conservation]
    "#;

    fn pipeline() -> Pipeline { Pipeline::from_config(&parse_config(CONFIG).unwrap()).unwrap() }

    fn hit(layer: LayerId, hit_id: u64, a: (f64, f64, f64), b: (f64, f64, f64), edep: f64) -> StepHit {
        let p = |(x, y, z)| Point3::new(mm(x), mm(y), mm(z));
        StepHit { layer, hit_id, entry: p(a), exit: p(b), edep, light_yield: None }
    }

    /// Local x of the block above the beam is minus the detector x
    fn event(id: EventId) -> Event {
        Event { id, hits: vec![
            // Crosses four cells along local x, within z cell 5
            hit(0, 1, ( 12.0, 1000.0, 3.0), (-17.0, 1000.0, 4.0), 0.4),
            // Single cell
            hit(0, 2, (-33.0, 1000.0, -41.0), (-34.0, 1001.0, -42.0), 0.005),
        ]}
    }

    #[test]
    fn event_passes_through_all_stages() {
        let out = pipeline().process_event(&event(9));
        assert_eq!(out.id, 9);
        assert_eq!(out.stats.deposits, 2);
        assert_eq!(out.cells.len(), 5);
        assert_eq!(out.raw_towers.len(), out.cells.len());
        assert_float_eq!(out.cells.total_edep(), 0.405, rmax <= 1e-12);
        let report = out.conservation.unwrap();
        assert!(report.ok);
        assert!(out.digitized.is_none());
        // The single-cell hit is below the zero suppression threshold
        assert_eq!(out.calibrated.len(), 4);
        assert_float_eq!(out.calibrated.total_energy(), 0.4, rmax <= 1e-12);
    }

    #[test]
    fn unknown_layers_are_counted_and_break_conservation() {
        let mut e = event(1);
        e.hits.push(hit(7, 3, (0.0, 1000.0, 0.0), (1.0, 1000.0, 0.0), 1.0));
        let out = pipeline().process_event(&e);
        assert_eq!(out.stats.unknown_layer, 1);
        assert_eq!(out.stats.deposits, 3);
        assert_eq!(out.cells.len(), 5);
        assert!(!out.conservation.unwrap().ok);
    }

    #[test]
    fn out_of_acceptance_hits_are_skipped() {
        let e = Event { id: 0, hits: vec![hit(0, 1, (0.0, 1000.0, 49.0), (0.0, 1000.0, 51.0), 1.0)] };
        let out = pipeline().process_event(&e);
        assert_eq!(out.stats.out_of_acceptance, 1);
        assert!(out.cells.is_empty());
        assert!(out.calibrated.is_empty());
    }

    #[test]
    fn parallel_matches_sequential() {
        let p = pipeline();
        let events: Vec<_> = (0..50).map(event).collect();
        let sequential = p.process_events_sequentially(&events);
        let parallel   = p.process_events(&events);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn digitized_towers_feed_calibration() {
        let linear = CONFIG.replace(r#""passthrough""#, "1\npedestal_adc = 0.0\ngev_per_adc = 5e-6");
        let config = format!("{linear}\n[digitization]\nmean_light_yield = 200.0\n");
        let p = Pipeline::from_config(&parse_config(&config).unwrap()).unwrap();
        let out = p.process_event(&event(3));
        assert_eq!(p.calibrator.algorithm(), CalibrationAlgorithm::LinearPedestalGain);
        let digitized = out.digitized.unwrap();
        assert_eq!(digitized.len(), 5);
        // One photon is worth 5 keV: calibration recovers the deposit to within truncation
        assert_float_eq!(out.calibrated.total_energy(), 0.4, abs <= 4.0 * 5e-6);
    }

    #[test]
    fn duplicate_layers_are_rejected() {
        let twice = CONFIG.replacen("[calibration]", r#"
            [[layer]]
            id      = 0
            binning = "eta-x"
            center  = ["0 mm", "1000 mm", "0 mm"]
            size    = ["100 mm", "20 mm", "100 mm"]
            x_step  = "10 mm"
            eta_step = 0.01

            [calibration]"#, 1);
        let result = Pipeline::from_config(&parse_config(&twice).unwrap());
        assert!(matches!(result, Err(ConfigError::DuplicateLayer(0))));
    }
}
