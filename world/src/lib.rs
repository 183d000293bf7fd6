#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waveform.
//!
//! The world owns the cell lattice, the perimeter slot ring, and the
//! observer pool. All mutations flow through [`apply`], which executes a
//! [`Command`] and appends the [`Event`] values describing what happened.
//! Within one tick every cell's neighbor contribution is computed from the
//! previous tick's collapse values before any cell is written, so results
//! never depend on cell traversal order.

mod cells;
mod footprint;
mod slots;

use std::collections::BTreeMap;

use waveform_core::{
    CellError, Command, Event, GridError, InfluenceKind, InfluenceSource, ObserverConfig,
    ObserverId, PatternError, PlacementError, QuantizationError, RemovalError, SimulationError,
    SlotId, WELCOME_BANNER,
};

use crate::cells::Lattice;
use crate::slots::SlotState;

const DEFAULT_SMOOTHING_SPEED: f32 = 0.1;
const DEFAULT_EASING: waveform_core::Easing = waveform_core::Easing::EaseOut;
const DEFAULT_QUANTIZATION: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Represents the authoritative Waveform world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    lattice: Option<Lattice>,
    slots: Vec<SlotState>,
    observers: ObserverRegistry,
    smoothing: Smoothing,
    quantization: Vec<f32>,
}

impl World {
    /// Creates a new world with no lattice built yet.
    ///
    /// A [`Command::ConfigureGrid`] must succeed before ticking; until then
    /// simulation commands are rejected with a missing-topology reason.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            lattice: None,
            slots: Vec::new(),
            observers: ObserverRegistry::new(),
            smoothing: Smoothing {
                speed: DEFAULT_SMOOTHING_SPEED,
                easing: DEFAULT_EASING,
            },
            quantization: DEFAULT_QUANTIZATION.to_vec(),
        }
    }

    fn slot_index(&self, slot: SlotId) -> Option<usize> {
        let index = slot.get() as usize;
        if index < self.slots.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Recomputes one slot's influence footprint from scratch.
    ///
    /// Prior entries for the slot's observer are stripped from the whole
    /// lattice first, so reapplication after decay or range changes is
    /// idempotent.
    fn reapply_slot_footprint(&mut self, slot_index: usize, out_events: &mut Vec<Event>) {
        let slot = self.slots[slot_index].clone();
        let Some(observer) = slot.observer else {
            return;
        };
        let Some(config) = self.observers.config(observer).copied() else {
            return;
        };
        let Some(lattice) = self.lattice.as_mut() else {
            return;
        };

        let source = InfluenceSource::Observer(observer);
        lattice.remove_influence_everywhere(source);

        let pairs = match config.kind {
            InfluenceKind::Line => footprint::line_footprint(lattice, &slot),
            InfluenceKind::Radial => footprint::radial_footprint(lattice, &slot),
        };

        for (cell_index, factor) in pairs {
            let magnitude = factor * config.force;
            if magnitude.abs() <= footprint::INFLUENCE_EPSILON {
                continue;
            }
            let cell = lattice.coord_of(cell_index);
            lattice.cell_mut(cell_index).add_influence(source, magnitude);
            out_events.push(Event::InfluenceApplied { cell, magnitude });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { width, height } => {
            if width == 0 || height == 0 {
                out_events.push(Event::GridConfigurationRejected {
                    width,
                    height,
                    reason: GridError::InvalidDimension,
                });
                return;
            }

            // Teardown before rebuild: placed observers return to the pool
            // and every influence dies with the old lattice.
            for slot in &mut world.slots {
                if let Some(observer) = slot.detach() {
                    world.observers.detach(observer);
                }
            }
            world.slots = slots::build_ring(width, height);
            world.lattice = Some(Lattice::build(width, height));
            out_events.push(Event::GridConfigured { width, height });
        }
        Command::ConfigureSmoothing { speed, easing } => {
            world.smoothing = Smoothing { speed, easing };
            out_events.push(Event::SmoothingConfigured { speed, easing });
        }
        Command::ConfigureQuantization { targets } => {
            if targets.is_empty() {
                out_events.push(Event::QuantizationRejected {
                    reason: QuantizationError::Empty,
                });
                return;
            }
            if targets.windows(2).any(|pair| pair[0] > pair[1]) {
                out_events.push(Event::QuantizationRejected {
                    reason: QuantizationError::Unsorted,
                });
                return;
            }
            world.quantization = targets.clone();
            out_events.push(Event::QuantizationConfigured { targets });
        }
        Command::Tick { dt } => {
            let Some(lattice) = world.lattice.as_mut() else {
                out_events.push(Event::TickRejected {
                    reason: SimulationError::MissingTopology,
                });
                return;
            };

            let eased = world
                .smoothing
                .easing
                .apply(dt.as_secs_f32() * world.smoothing.speed);

            // Phase one reads, phase two writes; see the module docs.
            let targets = true_targets(lattice);
            for (index, target) in targets.into_iter().enumerate() {
                lattice.cell_mut(index).blend_toward(target, eased);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnObserver { config } => {
            let observer = world.observers.spawn(config);
            out_events.push(Event::ObserverSpawned { observer, config });
        }
        Command::PlaceObserver { observer, slot } => {
            let Some(config) = world.observers.config(observer).copied() else {
                out_events.push(Event::ObserverPlacementRejected {
                    observer,
                    slot,
                    reason: PlacementError::UnknownObserver,
                });
                return;
            };
            let Some(slot_index) = world.slot_index(slot) else {
                out_events.push(Event::ObserverPlacementRejected {
                    observer,
                    slot,
                    reason: PlacementError::UnknownSlot,
                });
                return;
            };
            if world.slots[slot_index].observer.is_some() {
                out_events.push(Event::ObserverPlacementRejected {
                    observer,
                    slot,
                    reason: PlacementError::SlotOccupied,
                });
                return;
            }
            if world.observers.slot_of(observer).is_some() {
                out_events.push(Event::ObserverPlacementRejected {
                    observer,
                    slot,
                    reason: PlacementError::AlreadyPlaced,
                });
                return;
            }

            world.slots[slot_index].assign(observer, &config);
            world.observers.attach(observer, slot);
            out_events.push(Event::ObserverPlaced { observer, slot });
            world.reapply_slot_footprint(slot_index, out_events);
        }
        Command::RemoveObserver { slot } => {
            let Some(slot_index) = world.slot_index(slot) else {
                out_events.push(Event::ObserverRemovalRejected {
                    slot,
                    reason: RemovalError::UnknownSlot,
                });
                return;
            };
            let Some(observer) = world.slots[slot_index].detach() else {
                out_events.push(Event::ObserverRemovalRejected {
                    slot,
                    reason: RemovalError::EmptySlot,
                });
                return;
            };

            // Influence removal is global by identity: a cast may have
            // touched cells far from the slot.
            if let Some(lattice) = world.lattice.as_mut() {
                lattice.remove_influence_everywhere(InfluenceSource::Observer(observer));
            }
            world.observers.detach(observer);
            out_events.push(Event::ObserverRemoved { observer, slot });
        }
        Command::CycleDecay { slot } => {
            let Some(slot_index) = world.slot_index(slot) else {
                return;
            };
            if world.slots[slot_index].observer.is_none() {
                return;
            }
            let decay = world.slots[slot_index].decay.next();
            world.slots[slot_index].decay = decay;
            out_events.push(Event::DecayCycled { slot, decay });
            world.reapply_slot_footprint(slot_index, out_events);
        }
        Command::CycleRange { slot } => {
            let Some(slot_index) = world.slot_index(slot) else {
                return;
            };
            if world.slots[slot_index].observer.is_none() {
                return;
            }
            let bound = world
                .lattice
                .as_ref()
                .map_or(0, |lattice| lattice.width().max(lattice.height()));
            let current = world.slots[slot_index].range;
            let range = if current >= bound { 0 } else { current + 1 };
            world.slots[slot_index].range = range;
            out_events.push(Event::RangeCycled { slot, range });
            world.reapply_slot_footprint(slot_index, out_events);
        }
        Command::NudgeCell { cell, value } => {
            let index = world
                .lattice
                .as_ref()
                .and_then(|lattice| lattice.index(cell));
            match (world.lattice.as_mut(), index) {
                (Some(lattice), Some(index)) => {
                    lattice
                        .cell_mut(index)
                        .add_influence(InfluenceSource::Own, value);
                    out_events.push(Event::CellNudged { cell, value });
                }
                _ => out_events.push(Event::NudgeRejected {
                    cell,
                    reason: CellError::OutOfBounds,
                }),
            }
        }
        Command::ClearCell { cell } => {
            let index = world
                .lattice
                .as_ref()
                .and_then(|lattice| lattice.index(cell));
            match (world.lattice.as_mut(), index) {
                (Some(lattice), Some(index)) => {
                    lattice.cell_mut(index).clear_influences();
                    out_events.push(Event::CellCleared { cell });
                }
                _ => out_events.push(Event::NudgeRejected {
                    cell,
                    reason: CellError::OutOfBounds,
                }),
            }
        }
        Command::RestorePattern { data } => {
            let Some(lattice) = world.lattice.as_mut() else {
                out_events.push(Event::PatternRejected {
                    reason: PatternError::DimensionMismatch,
                });
                return;
            };
            if data.width != lattice.width() || data.height != lattice.height() {
                out_events.push(Event::PatternRejected {
                    reason: PatternError::DimensionMismatch,
                });
                return;
            }
            if data.flattened_collapse_values.len() != data.expected_len() {
                out_events.push(Event::PatternRejected {
                    reason: PatternError::LengthMismatch,
                });
                return;
            }
            for (index, value) in data.flattened_collapse_values.iter().enumerate() {
                lattice.cell_mut(index).set_collapse(*value);
            }
            out_events.push(Event::PatternRestored);
        }
        Command::CollapseAll => {
            let Some(lattice) = world.lattice.as_mut() else {
                out_events.push(Event::TickRejected {
                    reason: SimulationError::MissingTopology,
                });
                return;
            };

            // The snap uses the true instantaneous target, never the
            // smoothed preview, and reads complete before any write.
            let targets = true_targets(lattice);
            for (index, target) in targets.into_iter().enumerate() {
                let snapped = snap_to_targets(target, &world.quantization);
                lattice.cell_mut(index).set_collapse(snapped);
            }
            out_events.push(Event::GridCollapsed);
        }
    }
}

/// Computes every cell's influence-weighted target from pre-write state.
fn true_targets(lattice: &Lattice) -> Vec<f32> {
    let mut targets = Vec::with_capacity(lattice.len());
    for index in 0..lattice.len() {
        let neighbor_sum = lattice.neighbor_sum(index);
        let neighbor_count = lattice.neighbor_count(index);
        targets.push(lattice.cell(index).target(neighbor_sum, neighbor_count));
    }
    targets
}

/// Snaps a value to the nearest quantization target, ties toward the larger.
fn snap_to_targets(value: f32, targets: &[f32]) -> f32 {
    let mut best = targets[0];
    let mut best_distance = (value - best).abs();
    for &candidate in &targets[1..] {
        let distance = (value - candidate).abs();
        // Ascending order: an equal distance prefers the later, larger value.
        if distance <= best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

#[derive(Clone, Copy, Debug)]
struct Smoothing {
    speed: f32,
    easing: waveform_core::Easing,
}

#[derive(Clone, Copy, Debug)]
struct ObserverState {
    config: ObserverConfig,
    slot: Option<SlotId>,
}

/// Registry that stores observers and manages identifier allocation.
#[derive(Debug)]
struct ObserverRegistry {
    entries: BTreeMap<ObserverId, ObserverState>,
    next_observer_id: ObserverId,
}

impl ObserverRegistry {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_observer_id: ObserverId::new(0),
        }
    }

    fn spawn(&mut self, config: ObserverConfig) -> ObserverId {
        let observer = self.next_observer_id;
        self.next_observer_id = ObserverId::new(observer.get().wrapping_add(1));
        let _ = self.entries.insert(observer, ObserverState { config, slot: None });
        observer
    }

    fn config(&self, observer: ObserverId) -> Option<&ObserverConfig> {
        self.entries.get(&observer).map(|state| &state.config)
    }

    fn slot_of(&self, observer: ObserverId) -> Option<SlotId> {
        self.entries.get(&observer).and_then(|state| state.slot)
    }

    fn attach(&mut self, observer: ObserverId, slot: SlotId) {
        if let Some(state) = self.entries.get_mut(&observer) {
            state.slot = Some(slot);
        }
    }

    fn detach(&mut self, observer: ObserverId) {
        if let Some(state) = self.entries.get_mut(&observer) {
            state.slot = None;
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use waveform_core::{
        CellCoord, CollapsedGridData, Corner, DecayKind, Direction, Easing, InfluenceSource,
        ObserverConfig, ObserverId, RingCoord, SlotId,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Dimensions of the built lattice, if any.
    #[must_use]
    pub fn dimensions(world: &World) -> Option<(u32, u32)> {
        world
            .lattice
            .as_ref()
            .map(|lattice| (lattice.width(), lattice.height()))
    }

    /// Current collapse value of the provided cell.
    #[must_use]
    pub fn collapse_at(world: &World, cell: CellCoord) -> Option<f32> {
        let lattice = world.lattice.as_ref()?;
        let index = lattice.index(cell)?;
        Some(lattice.cell(index).collapse())
    }

    /// Value of one influence entry on the provided cell, if present.
    #[must_use]
    pub fn influence_at(world: &World, cell: CellCoord, source: InfluenceSource) -> Option<f32> {
        let lattice = world.lattice.as_ref()?;
        let index = lattice.index(cell)?;
        lattice.cell(index).influence_value(source)
    }

    /// Active preview-blend tuning.
    #[must_use]
    pub fn smoothing(world: &World) -> (f32, Easing) {
        (world.smoothing.speed, world.smoothing.easing)
    }

    /// Active quantization targets used by finalization.
    #[must_use]
    pub fn quantization(world: &World) -> &[f32] {
        &world.quantization
    }

    /// Identifier of the slot at the provided ring position, if any.
    #[must_use]
    pub fn slot_at(world: &World, ring: RingCoord) -> Option<SlotId> {
        world
            .slots
            .iter()
            .find(|slot| slot.ring == ring)
            .map(|slot| slot.id)
    }

    /// Observers currently waiting in the unplaced pool, in identifier order.
    #[must_use]
    pub fn unplaced_observers(world: &World) -> Vec<ObserverId> {
        world
            .observers
            .entries
            .iter()
            .filter(|(_, state)| state.slot.is_none())
            .map(|(observer, _)| *observer)
            .collect()
    }

    /// Captures the lattice as a flattened snapshot in canonical order.
    #[must_use]
    pub fn collapsed_grid(world: &World) -> Option<CollapsedGridData> {
        let lattice = world.lattice.as_ref()?;
        let values = (0..lattice.len())
            .map(|index| lattice.cell(index).collapse())
            .collect();
        Some(CollapsedGridData {
            width: lattice.width(),
            height: lattice.height(),
            flattened_collapse_values: values,
            level_id: None,
            level_name: None,
        })
    }

    /// Captures a read-only view of every cell in canonical order.
    #[must_use]
    pub fn cell_view(world: &World) -> CellView {
        let snapshots = world
            .lattice
            .as_ref()
            .map(|lattice| {
                (0..lattice.len())
                    .map(|index| CellSnapshot {
                        cell: lattice.coord_of(index),
                        collapse: lattice.cell(index).collapse(),
                        influence_count: lattice.cell(index).influence_count(),
                        neighbor_count: lattice.neighbor_count(index),
                    })
                    .collect()
            })
            .unwrap_or_default();
        CellView { snapshots }
    }

    /// Captures a read-only view of the slot ring in identifier order.
    #[must_use]
    pub fn slot_view(world: &World) -> SlotView {
        let snapshots = world
            .slots
            .iter()
            .map(|slot| SlotSnapshot {
                id: slot.id,
                ring: slot.ring,
                direction: slot.direction,
                corner: slot.corner,
                observer: slot.observer,
                decay: slot.decay,
                range: slot.range,
            })
            .collect();
        SlotView { snapshots }
    }

    /// Captures a read-only view of every observer in identifier order.
    #[must_use]
    pub fn observer_view(world: &World) -> ObserverView {
        let snapshots = world
            .observers
            .entries
            .iter()
            .map(|(observer, state)| ObserverSnapshot {
                id: *observer,
                config: state.config,
                slot: state.slot,
            })
            .collect();
        ObserverView { snapshots }
    }

    /// Read-only snapshot describing all cells of the lattice.
    #[derive(Clone, Debug, Default)]
    pub struct CellView {
        snapshots: Vec<CellSnapshot>,
    }

    impl CellView {
        /// Iterator over the captured cell snapshots in canonical order.
        pub fn iter(&self) -> impl Iterator<Item = &CellSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<CellSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single cell's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CellSnapshot {
        /// Lattice position of the cell.
        pub cell: CellCoord,
        /// Current smoothed collapse value.
        pub collapse: f32,
        /// Number of influence entries currently held, self term included.
        pub influence_count: usize,
        /// Number of live neighbors, fixed at build time.
        pub neighbor_count: u32,
    }

    /// Read-only snapshot describing the perimeter slot ring.
    #[derive(Clone, Debug, Default)]
    pub struct SlotView {
        snapshots: Vec<SlotSnapshot>,
    }

    impl SlotView {
        /// Iterator over the captured slot snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<SlotSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single slot's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SlotSnapshot {
        /// Identifier of the slot.
        pub id: SlotId,
        /// Position within the expanded perimeter coordinate system.
        pub ring: RingCoord,
        /// Line-cast direction fixed by the ring position.
        pub direction: Direction,
        /// Corner classification fixed by the ring position.
        pub corner: Corner,
        /// Observer currently held by the slot, if any.
        pub observer: Option<ObserverId>,
        /// Decay kind currently active on the slot.
        pub decay: DecayKind,
        /// Range currently active on the slot.
        pub range: u32,
    }

    /// Read-only snapshot describing all observers known to the world.
    #[derive(Clone, Debug, Default)]
    pub struct ObserverView {
        snapshots: Vec<ObserverSnapshot>,
    }

    impl ObserverView {
        /// Iterator over the captured observer snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &ObserverSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<ObserverSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single observer's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ObserverSnapshot {
        /// Identifier allocated to the observer by the world.
        pub id: ObserverId,
        /// Parameters the observer was created with.
        pub config: ObserverConfig,
        /// Slot the observer currently occupies, if any.
        pub slot: Option<SlotId>,
    }
}
