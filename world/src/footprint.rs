//! Influence footprint enumeration for line and radial casts.
//!
//! Both enumerators yield `(cell index, decay factor)` pairs in canonical
//! order; the shared applier multiplies by the observer's force, filters
//! against the epsilon threshold, and writes the influence entries.

use waveform_system_falloff::{line_decay_factor, radial_decay_factor};

use crate::cells::Lattice;
use crate::slots::SlotState;

/// Influence magnitudes at or below this threshold are dropped entirely.
pub(crate) const INFLUENCE_EPSILON: f32 = 0.001;

/// Enumerates the cells a line cast from the slot reaches.
///
/// A zero range resolves to the in-bounds remaining distance from the slot's
/// origin toward the grid edge; diagonals take the lesser of the two axis
/// remainders. The walk stops early if a step leaves the lattice.
pub(crate) fn line_footprint(lattice: &Lattice, slot: &SlotState) -> Vec<(usize, f32)> {
    let (dx, dy) = slot.direction.delta();
    if dx == 0 && dy == 0 {
        return Vec::new();
    }

    let (start_x, start_y) = slot.origin();
    let width = i64::from(lattice.width());
    let height = i64::from(lattice.height());

    let mut range = i64::from(slot.range);
    if range == 0 {
        let remaining_x = if dx > 0 { width - (start_x + 1) } else { start_x };
        let remaining_y = if dy > 0 { height - (start_y + 1) } else { start_y };
        range = if dx != 0 && dy != 0 {
            remaining_x.min(remaining_y)
        } else if dx != 0 {
            remaining_x
        } else {
            remaining_y
        };
    }

    let mut touched = Vec::new();
    let mut current_x = start_x;
    let mut current_y = start_y;
    for _ in 0..range {
        current_x += dx;
        current_y += dy;
        match lattice.index_signed(current_x, current_y) {
            Some(index) => touched.push(index),
            None => break,
        }
    }

    let total = touched.len() as u32;
    touched
        .into_iter()
        .enumerate()
        .map(|(path_index, cell_index)| {
            (
                cell_index,
                line_decay_factor(slot.decay, path_index as u32, total),
            )
        })
        .collect()
}

/// Enumerates every cell within the slot's radial field.
///
/// Distances are Euclidean over lattice units between the slot's projected
/// origin and each cell. A zero range covers the whole lattice at full
/// normalized proximity.
pub(crate) fn radial_footprint(lattice: &Lattice, slot: &SlotState) -> Vec<(usize, f32)> {
    let (origin_x, origin_y) = slot.origin();
    let range = slot.range;

    let mut touched = Vec::new();
    for index in 0..lattice.len() {
        let cell = lattice.coord_of(index);
        let dx = (i64::from(cell.x()) - origin_x) as f32;
        let dy = (i64::from(cell.y()) - origin_y) as f32;
        let distance = (dx * dx + dy * dy).sqrt();

        let normalized = if range == 0 {
            0.0
        } else if distance <= range as f32 {
            distance / range as f32
        } else {
            continue;
        };

        touched.push((index, radial_decay_factor(slot.decay, normalized)));
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::{line_footprint, radial_footprint};
    use crate::cells::Lattice;
    use crate::slots::build_ring;
    use waveform_core::{DecayKind, Direction, RingCoord};

    fn slot_at(width: u32, height: u32, ring: RingCoord) -> crate::slots::SlotState {
        build_ring(width, height)
            .into_iter()
            .find(|slot| slot.ring == ring)
            .expect("ring position should exist")
    }

    #[test]
    fn unbounded_left_edge_cast_spans_the_row() {
        let lattice = Lattice::build(3, 3);
        let slot = slot_at(3, 3, RingCoord::new(0, 1));
        assert_eq!(slot.direction, Direction::Right);

        let footprint = line_footprint(&lattice, &slot);
        let cells: Vec<_> = footprint
            .iter()
            .map(|&(index, _)| lattice.coord_of(index))
            .collect();
        assert_eq!(cells.len(), 3);
        for (x, cell) in cells.iter().enumerate() {
            assert_eq!(cell.x(), x as u32);
            assert_eq!(cell.y(), 0);
        }
        for &(_, factor) in &footprint {
            assert!((factor - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn unbounded_diagonal_takes_the_lesser_remainder() {
        let lattice = Lattice::build(4, 2);
        let slot = slot_at(4, 2, RingCoord::new(0, 0));
        assert_eq!(slot.direction, Direction::UpRight);

        let footprint = line_footprint(&lattice, &slot);
        assert_eq!(footprint.len(), 2, "height limits the diagonal");
        assert_eq!(lattice.coord_of(footprint[0].0).x(), 0);
        assert_eq!(lattice.coord_of(footprint[1].0).y(), 1);
    }

    #[test]
    fn bounded_cast_stops_at_the_grid_edge() {
        let lattice = Lattice::build(3, 3);
        let mut slot = slot_at(3, 3, RingCoord::new(0, 2));
        slot.range = 9;
        let footprint = line_footprint(&lattice, &slot);
        assert_eq!(footprint.len(), 3, "walk truncates at the far edge");
    }

    #[test]
    fn spread_decay_ramps_across_the_span() {
        let lattice = Lattice::build(5, 1);
        let mut slot = slot_at(5, 1, RingCoord::new(0, 1));
        slot.decay = DecayKind::Spread;
        let footprint = line_footprint(&lattice, &slot);
        assert_eq!(footprint.len(), 5);
        assert!((footprint[0].1 - 1.0).abs() < 1e-6);
        assert!(footprint[4].1.abs() < 1e-6);
    }

    #[test]
    fn radial_zero_range_covers_everything_at_full_proximity() {
        let lattice = Lattice::build(3, 3);
        let slot = slot_at(3, 3, RingCoord::new(0, 1));
        let footprint = radial_footprint(&lattice, &slot);
        assert_eq!(footprint.len(), 9);
        for &(_, factor) in &footprint {
            assert!((factor - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn radial_bounded_range_excludes_distant_cells() {
        let lattice = Lattice::build(3, 3);
        let mut slot = slot_at(3, 3, RingCoord::new(0, 1));
        slot.range = 2;
        slot.decay = DecayKind::Slow;
        let footprint = radial_footprint(&lattice, &slot);
        // Origin projects onto (-1, 0): cells within two units are
        // (0,0), (0,1) and (1,0).
        assert_eq!(footprint.len(), 3);
        let origin_cell = lattice
            .index(waveform_core::CellCoord::new(0, 0))
            .expect("cell");
        let (_, nearest) = footprint
            .iter()
            .find(|&&(index, _)| index == origin_cell)
            .expect("adjacent cell in range");
        assert!((nearest - 0.5).abs() < 1e-6, "distance 1 of range 2");
    }
}
