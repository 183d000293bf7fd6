//! Per-cell wave state and the lattice topology that connects cells.

use waveform_core::{CellCoord, InfluenceSource};

/// Signed offsets of the eight neighbor positions, in the fixed order
/// top-left, up, top-right, left, right, bottom-left, down, bottom-right.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

pub(crate) fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Scalar wave state of a single lattice position.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    collapse: f32,
    influences: Vec<(InfluenceSource, f32)>,
}

impl Cell {
    /// Creates a fresh cell carrying its zero-valued own term.
    fn new() -> Self {
        Self {
            collapse: 0.0,
            influences: vec![(InfluenceSource::Own, 0.0)],
        }
    }

    pub(crate) fn collapse(&self) -> f32 {
        self.collapse
    }

    pub(crate) fn set_collapse(&mut self, value: f32) {
        self.collapse = clamp01(value);
    }

    /// Replaces any existing entry for the source with the provided value.
    pub(crate) fn add_influence(&mut self, source: InfluenceSource, value: f32) {
        self.remove_influence(source);
        self.influences.push((source, value));
    }

    /// Removes all entries matching the source; no-op when absent.
    pub(crate) fn remove_influence(&mut self, source: InfluenceSource) {
        self.influences.retain(|(existing, _)| *existing != source);
    }

    /// Drops every entry, then restores the zero-valued own term so the
    /// divisor never omits the self contribution.
    pub(crate) fn clear_influences(&mut self) {
        self.influences.clear();
        self.influences.push((InfluenceSource::Own, 0.0));
    }

    pub(crate) fn influence_count(&self) -> usize {
        self.influences.len()
    }

    pub(crate) fn influence_value(&self, source: InfluenceSource) -> Option<f32> {
        self.influences
            .iter()
            .find(|(existing, _)| *existing == source)
            .map(|(_, value)| *value)
    }

    /// Influence-weighted average pulling the cell this tick.
    ///
    /// The divisor counts every live neighbor and every influence entry, so
    /// an isolated, influence-free cell resolves to exactly zero.
    pub(crate) fn target(&self, neighbor_sum: f32, neighbor_count: u32) -> f32 {
        let divisor = neighbor_count as f32 + self.influences.len() as f32;
        if divisor <= 0.0 {
            return 0.0;
        }
        let sum: f32 = self
            .influences
            .iter()
            .map(|(_, value)| value)
            .sum::<f32>()
            + neighbor_sum;
        clamp01(sum / divisor)
    }

    /// Moves the preview value toward the target by the eased blend factor.
    pub(crate) fn blend_toward(&mut self, target: f32, eased_t: f32) {
        self.collapse = clamp01(lerp(self.collapse, clamp01(target), eased_t));
    }
}

/// Rectangular lattice of cells with precomputed neighbor topology.
///
/// Cells are stored in the canonical x-major order `index = x * height + y`,
/// matching the flattened wire format.
#[derive(Clone, Debug)]
pub(crate) struct Lattice {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    neighbors: Vec<NeighborTopology>,
}

#[derive(Clone, Debug)]
struct NeighborTopology {
    indices: [Option<usize>; 8],
    count: u32,
}

impl Lattice {
    /// Builds a lattice of the provided dimensions. Both must be nonzero.
    pub(crate) fn build(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize;
        let mut cells = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            cells.push(Cell::new());
        }

        let mut neighbors = Vec::with_capacity(capacity);
        for x in 0..width {
            for y in 0..height {
                let mut indices = [None; 8];
                let mut count = 0;
                for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                    let nx = i64::from(x) + dx;
                    let ny = i64::from(y) + dy;
                    if let Some(index) = index_signed(width, height, nx, ny) {
                        indices[slot] = Some(index);
                        count += 1;
                    }
                }
                neighbors.push(NeighborTopology { indices, count });
            }
        }

        Self {
            width,
            height,
            cells,
            neighbors,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        index_signed(
            self.width,
            self.height,
            i64::from(cell.x()),
            i64::from(cell.y()),
        )
    }

    pub(crate) fn index_signed(&self, x: i64, y: i64) -> Option<usize> {
        index_signed(self.width, self.height, x, y)
    }

    pub(crate) fn coord_of(&self, index: usize) -> CellCoord {
        let height = self.height as usize;
        CellCoord::new((index / height) as u32, (index % height) as u32)
    }

    pub(crate) fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    pub(crate) fn neighbor_count(&self, index: usize) -> u32 {
        self.neighbors[index].count
    }

    /// Sum of the live neighbors' current collapse values.
    pub(crate) fn neighbor_sum(&self, index: usize) -> f32 {
        self.neighbors[index]
            .indices
            .iter()
            .flatten()
            .map(|&neighbor| self.cells[neighbor].collapse())
            .sum()
    }

    /// Strips the source's entries from every cell of the lattice.
    pub(crate) fn remove_influence_everywhere(&mut self, source: InfluenceSource) {
        for cell in &mut self.cells {
            cell.remove_influence(source);
        }
    }
}

fn index_signed(width: u32, height: u32, x: i64, y: i64) -> Option<usize> {
    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return None;
    }
    Some(x as usize * height as usize + y as usize)
}
