//! Distribute the energy of deposits over the cells crossed by their paths.
//!
//! Each deposit's path is the straight segment from its entry to its exit
//! point in the layer's working frame. Every cell which the segment crosses
//! receives a share of the deposit's energy (and light yield) proportional to
//! the length of the segment lying inside it.

use std::collections::BTreeMap;

use itertools::iproduct;
use log::{debug, warn};

use geometry::{chord_length, weighting_path_length};
use units::todo::Weight;

use crate::{LayerId, DepositRecord};
use crate::cell::{Cell, CellContainer, CellKey};
use crate::error::ConfigError;
use crate::index::GeometryIndex;

/// A cell reached by a single deposit, with its raw (unnormalized) weight
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiredCell {
    pub bin1: usize,
    pub bin2: usize,
    pub chord: f64,
}

/// Counts gathered while binning one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinningStats {
    pub deposits: usize,
    pub out_of_acceptance: usize,
    pub unknown_layer: usize,
    pub non_finite: usize,
}

impl std::ops::AddAssign for BinningStats {
    fn add_assign(&mut self, other: Self) {
        self.deposits          += other.deposits;
        self.out_of_acceptance += other.out_of_acceptance;
        self.unknown_layer     += other.unknown_layer;
        self.non_finite        += other.non_finite;
    }
}

/// Per-run cell binner.
///
/// Owns the (read-only) bin grids of all layers and a scratch accumulator,
/// indexed by flat bin index, which is reused across events. The scratch is
/// cleared at the start of every event, so one `CellBinner` must never be
/// shared between concurrently processed events: give each worker its own.
#[derive(Clone, Debug)]
pub struct CellBinner {
    layers: BTreeMap<LayerId, GeometryIndex>,
    scratch: Vec<Option<Cell>>,
    fired: Vec<FiredCell>,
    stats: BinningStats,
}

impl CellBinner {

    pub fn new(geometries: impl IntoIterator<Item = GeometryIndex>) -> Result<Self, ConfigError> {
        let mut layers = BTreeMap::new();
        for g in geometries {
            let layer = g.layer();
            if layers.insert(layer, g).is_some() {
                return Err(ConfigError::DuplicateLayer(layer))
            }
        }
        let largest = layers.values().map(GeometryIndex::n_cells).max().unwrap_or(0);
        Ok(Self {
            layers,
            scratch: vec![None; largest],
            fired: vec![],
            stats: BinningStats::default(),
        })
    }

    pub fn geometry(&self, layer: LayerId) -> Option<&GeometryIndex> { self.layers.get(&layer) }

    pub fn layers(&self) -> impl Iterator<Item = &GeometryIndex> { self.layers.values() }

    /// Statistics of the most recently binned event
    pub fn stats(&self) -> BinningStats { self.stats }

    /// Bin all deposits of one event, returning the cells with non-zero energy
    pub fn bin_event(&mut self, deposits: &[DepositRecord]) -> CellContainer {
        self.scratch.iter_mut().for_each(|slot| *slot = None);
        let mut stats = BinningStats { deposits: deposits.len(), ..Default::default() };
        let mut cells = CellContainer::new();

        for (&layer, geometry) in &self.layers {
            let n_cells = geometry.n_cells();
            let scratch = &mut self.scratch[..n_cells];
            let mut in_layer = 0;
            for deposit in deposits.iter().filter(|d| d.layer == layer) {
                in_layer += 1;
                if !fire_cells(geometry, deposit, &mut self.fired) {
                    stats.out_of_acceptance += 1;
                    continue
                }
                let path = weighting_path_length(deposit.entry, deposit.exit);
                let light_yield = deposit.light_yield.unwrap_or(0.0);
                for &FiredCell { bin1, bin2, chord } in &self.fired {
                    let weight: Weight = chord / path;
                    let edep = deposit.edep * weight;
                    if !edep.is_finite() {
                        stats.non_finite += 1;
                        warn!("layer {layer} cell ({bin1}, {bin2}): non-finite contribution {edep} \
                               from hit {} (edep {}, chord {chord}, path {path})",
                              deposit.hit_id, deposit.edep);
                    }
                    scratch[geometry.flat_index(bin1, bin2)]
                        .get_or_insert_with(|| Cell::new(CellKey::new(layer, bin1, bin2)))
                        .add_edep(deposit.hit_id, edep, light_yield * weight);
                }
            }
            let before = cells.len();
            for cell in scratch.iter_mut().filter_map(Option::take) {
                if cell.edep() != 0.0 { cells.insert(cell); }
            }
            if in_layer > 0 {
                debug!("layer {layer}: {} cells from {in_layer} deposits", cells.len() - before);
            }
        }

        stats.unknown_layer = deposits.iter()
            .filter(|d| !self.layers.contains_key(&d.layer))
            .count();
        if stats.unknown_layer > 0 {
            warn!("{} deposits in layers without geometry were ignored", stats.unknown_layer);
        }
        if stats.out_of_acceptance > 0 {
            debug!("{} deposits out of acceptance", stats.out_of_acceptance);
        }
        self.stats = stats;
        cells
    }
}

/// Find the cells reached by `deposit`, placing them in `fired`.
///
/// Using an output parameter rather than a return value, in order to reuse
/// the same buffer for every deposit.
///
/// Returns `false` (and leaves `fired` empty) if either end of the path lies
/// outside the grid.
pub fn fire_cells(geometry: &GeometryIndex, deposit: &DepositRecord, fired: &mut Vec<FiredCell>) -> bool {
    fired.clear();
    let DepositRecord { entry, exit, .. } = *deposit;
    let Some((i0, j0)) = geometry.on_grid(geometry.bins_of(entry)) else { return false };
    let Some((i1, j1)) = geometry.on_grid(geometry.bins_of(exit )) else { return false };

    // Whole path in one cell: weight 1 whatever the path length, including
    // the zero-length sentinel
    if (i0, j0) == (i1, j1) {
        fired.push(FiredCell { bin1: i0, bin2: j0, chord: weighting_path_length(entry, exit) });
        return true
    }

    let (ilo, ihi) = if i0 <= i1 { (i0, i1) } else { (i1, i0) };
    let (jlo, jhi) = if j0 <= j1 { (j0, j1) } else { (j1, j0) };
    for (i, j) in iproduct!(ilo..=ihi, jlo..=jhi) {
        if let Some(chord) = chord_length(entry, exit, &geometry.cell(i, j)) {
            fired.push(FiredCell { bin1: i, bin2: j, chord });
        }
    }
    true
}
