use std::collections::BTreeMap;

use units::todo::{Energy, LightYield};

use crate::{HitId, LayerId};

/// Identifies a cell: `bin1` along the layer's first axis, `bin2` along its second
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub layer: LayerId,
    pub bin1: usize,
    pub bin2: usize,
}

impl CellKey {
    pub fn new(layer: LayerId, bin1: usize, bin2: usize) -> Self { Self { layer, bin1, bin2 } }
}

/// Energy accumulated in one cell during one event, together with the
/// contribution of each hit which reached it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    key: CellKey,
    edep: Energy,
    light_yield: LightYield,
    contributions: BTreeMap<HitId, Energy>,
}

impl Cell {

    pub fn new(key: CellKey) -> Self {
        Self { key, edep: 0.0, light_yield: 0.0, contributions: BTreeMap::new() }
    }

    pub fn add_edep(&mut self, hit_id: HitId, edep: Energy, light_yield: LightYield) {
        self.edep        += edep;
        self.light_yield += light_yield;
        *self.contributions.entry(hit_id).or_insert(0.0) += edep;
    }

    pub fn key        (&self) -> CellKey    { self.key }
    pub fn edep       (&self) -> Energy     { self.edep }
    pub fn light_yield(&self) -> LightYield { self.light_yield }

    /// Energy contributed by each hit
    pub fn contributions(&self) -> &BTreeMap<HitId, Energy> { &self.contributions }
}

/// All cells of one event, across layers, ordered by key
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellContainer {
    cells: BTreeMap<CellKey, Cell>,
}

impl CellContainer {

    pub fn new() -> Self { Self::default() }

    /// Take ownership of `cell`, returning any cell previously stored under its key
    pub fn insert(&mut self, cell: Cell) -> Option<Cell> { self.cells.insert(cell.key(), cell) }

    pub fn get(&self, key: &CellKey) -> Option<&Cell> { self.cells.get(key) }

    pub fn len     (&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool  { self.cells.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> { self.cells.values() }

    /// Cells belonging to `layer`
    pub fn layer(&self, layer: LayerId) -> impl Iterator<Item = &Cell> {
        let first = CellKey::new(layer, 0, 0);
        self.cells.range(first..)
            .take_while(move |(k, _)| k.layer == layer)
            .map(|(_, c)| c)
    }

    pub fn total_edep(&self) -> Energy { self.iter().map(Cell::edep).sum() }
}

impl IntoIterator for CellContainer {
    type Item = Cell;
    type IntoIter = std::collections::btree_map::IntoValues<CellKey, Cell>;
    fn into_iter(self) -> Self::IntoIter { self.cells.into_values() }
}
