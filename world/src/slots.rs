//! Perimeter slot ring construction and per-slot observer state.

use waveform_core::{Corner, DecayKind, Direction, ObserverConfig, ObserverId, RingCoord, SlotId};

/// Fixed attachment point on the grid perimeter.
///
/// Decay and range are copies transferred from the observer at assignment
/// time; cycling later mutates only this slot's copies.
#[derive(Clone, Debug)]
pub(crate) struct SlotState {
    pub(crate) id: SlotId,
    pub(crate) ring: RingCoord,
    pub(crate) direction: Direction,
    pub(crate) corner: Corner,
    pub(crate) observer: Option<ObserverId>,
    pub(crate) decay: DecayKind,
    pub(crate) range: u32,
}

impl SlotState {
    fn new(id: SlotId, ring: RingCoord, direction: Direction, corner: Corner) -> Self {
        Self {
            id,
            ring,
            direction,
            corner,
            observer: None,
            decay: DecayKind::DoesNotDecay,
            range: 0,
        }
    }

    /// Attaches the observer, copying its decay and range onto the slot.
    pub(crate) fn assign(&mut self, observer: ObserverId, config: &ObserverConfig) {
        self.observer = Some(observer);
        self.decay = config.decay;
        self.range = config.range;
    }

    /// Detaches the current observer and clears the slot's range copy.
    pub(crate) fn detach(&mut self) -> Option<ObserverId> {
        let detached = self.observer.take();
        if detached.is_some() {
            self.range = 0;
        }
        detached
    }

    /// Lattice position the slot projects onto, one unit inward on both axes.
    ///
    /// Perimeter slots sit outside the lattice, so the result may be -1 or
    /// equal to the corresponding dimension.
    pub(crate) fn origin(&self) -> (i64, i64) {
        (i64::from(self.ring.x()) - 1, i64::from(self.ring.y()) - 1)
    }
}

/// Builds the perimeter ring for a lattice of the provided dimensions.
///
/// Ring coordinates span `[0, width + 1] x [0, height + 1]`. The bottom and
/// top rows are laid out first, column by column, then the left and right
/// columns row by row, matching the canonical slot identifier order.
pub(crate) fn build_ring(width: u32, height: u32) -> Vec<SlotState> {
    let expanded_w = width + 1;
    let expanded_h = height + 1;
    let mut slots = Vec::new();

    for x in 0..=expanded_w {
        let bottom_corner = match x {
            0 => Corner::BottomLeft,
            _ if x == expanded_w => Corner::BottomRight,
            _ => Corner::None,
        };
        push_slot(&mut slots, x, 0, expanded_w, expanded_h, bottom_corner);

        let top_corner = match x {
            0 => Corner::TopLeft,
            _ if x == expanded_w => Corner::TopRight,
            _ => Corner::None,
        };
        push_slot(&mut slots, x, expanded_h, expanded_w, expanded_h, top_corner);
    }

    for y in 1..=height {
        push_slot(&mut slots, 0, y, expanded_w, expanded_h, Corner::None);
        push_slot(&mut slots, expanded_w, y, expanded_w, expanded_h, Corner::None);
    }

    slots
}

fn push_slot(
    slots: &mut Vec<SlotState>,
    x: u32,
    y: u32,
    expanded_w: u32,
    expanded_h: u32,
    corner: Corner,
) {
    let id = SlotId::new(slots.len() as u32);
    let direction = classify_direction(x, y, expanded_w, expanded_h);
    slots.push(SlotState::new(id, RingCoord::new(x, y), direction, corner));
}

/// Inward line-cast direction for a ring position: edges aim across the
/// grid, corners aim along the inward diagonal.
fn classify_direction(x: u32, y: u32, expanded_w: u32, expanded_h: u32) -> Direction {
    if x == 0 && y == expanded_h {
        return Direction::DownRight;
    }
    if x == expanded_w && y == expanded_h {
        return Direction::DownLeft;
    }
    if x == expanded_w && y == 0 {
        return Direction::UpLeft;
    }
    if x == 0 && y == 0 {
        return Direction::UpRight;
    }

    if y == expanded_h {
        return Direction::Down;
    }
    if y == 0 {
        return Direction::Up;
    }
    if x == 0 {
        return Direction::Right;
    }
    if x == expanded_w {
        return Direction::Left;
    }

    Direction::None
}

#[cfg(test)]
mod tests {
    use super::build_ring;
    use waveform_core::{
        Corner, DecayKind, Direction, InfluenceKind, ObserverConfig, ObserverId, RingCoord,
    };

    fn config(decay: DecayKind, range: u32) -> ObserverConfig {
        ObserverConfig {
            kind: InfluenceKind::Line,
            force: 1.0,
            range,
            decay,
            can_rotate: false,
        }
    }

    #[test]
    fn ring_covers_the_expanded_perimeter() {
        let slots = build_ring(3, 3);
        // (width + 2) slots along bottom and top, height along left and right.
        assert_eq!(slots.len(), 16);
        let corners = slots
            .iter()
            .filter(|slot| slot.corner != Corner::None)
            .count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn left_edge_slots_cast_rightward() {
        let slots = build_ring(3, 3);
        let slot = slots
            .iter()
            .find(|slot| slot.ring == RingCoord::new(0, 1))
            .expect("left edge slot");
        assert_eq!(slot.direction, Direction::Right);
        assert_eq!(slot.corner, Corner::None);
        assert_eq!(slot.origin(), (-1, 0));
    }

    #[test]
    fn corners_cast_along_the_inward_diagonal() {
        let slots = build_ring(3, 3);
        let bottom_left = slots
            .iter()
            .find(|slot| slot.ring == RingCoord::new(0, 0))
            .expect("bottom-left corner");
        assert_eq!(bottom_left.direction, Direction::UpRight);
        assert_eq!(bottom_left.corner, Corner::BottomLeft);

        let top_right = slots
            .iter()
            .find(|slot| slot.ring == RingCoord::new(4, 4))
            .expect("top-right corner");
        assert_eq!(top_right.direction, Direction::DownLeft);
        assert_eq!(top_right.corner, Corner::TopRight);
    }

    #[test]
    fn assignment_copies_decay_and_range_onto_the_slot() {
        let mut slots = build_ring(2, 2);
        let slot = &mut slots[0];
        slot.assign(ObserverId::new(5), &config(DecayKind::Fast, 4));
        assert_eq!(slot.observer, Some(ObserverId::new(5)));
        assert_eq!(slot.decay, DecayKind::Fast);
        assert_eq!(slot.range, 4);

        let detached = slot.detach();
        assert_eq!(detached, Some(ObserverId::new(5)));
        assert_eq!(slot.observer, None);
        assert_eq!(slot.range, 0, "detach clears the range copy");
        assert_eq!(slot.decay, DecayKind::Fast, "decay copy survives detach");
    }

    #[test]
    fn slot_identifiers_follow_insertion_order() {
        let slots = build_ring(2, 2);
        for (index, slot) in slots.iter().enumerate() {
            assert_eq!(slot.id.get() as usize, index);
        }
    }
}
