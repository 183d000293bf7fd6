#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waveform engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waveform.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the world's cell lattice using the provided dimensions.
    ConfigureGrid {
        /// Number of cell columns laid out in the lattice.
        width: u32,
        /// Number of cell rows laid out in the lattice.
        height: u32,
    },
    /// Updates the preview-blend tuning used by the diffusion tick.
    ConfigureSmoothing {
        /// Blend speed multiplied by the tick delta time.
        speed: f32,
        /// Easing curve applied to the blend factor.
        easing: Easing,
    },
    /// Replaces the ascending quantization targets used by finalization.
    ConfigureQuantization {
        /// Allowed discrete collapse values, sorted ascending.
        targets: Vec<f32>,
    },
    /// Advances the simulation by one diffusion step.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Adds an observer to the unplaced pool, allocating its identifier.
    SpawnObserver {
        /// Parameters of the observer to create.
        config: ObserverConfig,
    },
    /// Requests assignment of an unplaced observer onto a slot.
    PlaceObserver {
        /// Identifier of the observer to place.
        observer: ObserverId,
        /// Slot that should receive the observer.
        slot: SlotId,
    },
    /// Requests removal of the observer currently held by a slot.
    RemoveObserver {
        /// Slot whose observer should return to the unplaced pool.
        slot: SlotId,
    },
    /// Advances the slot's decay kind to the next value, reapplying influence.
    CycleDecay {
        /// Slot whose decay kind should advance.
        slot: SlotId,
    },
    /// Advances the slot's range within the grid bounds, reapplying influence.
    CycleRange {
        /// Slot whose range should advance.
        slot: SlotId,
    },
    /// Replaces a cell's own influence term to bias it toward a value.
    NudgeCell {
        /// Cell whose own influence term should change.
        cell: CellCoord,
        /// New signed value for the cell's own term.
        value: f32,
    },
    /// Drops a cell's influence entries, restoring the zero-valued own term.
    ClearCell {
        /// Cell whose influence entries should reset.
        cell: CellCoord,
    },
    /// Paints collapse values from a flattened snapshot onto the lattice.
    RestorePattern {
        /// Snapshot whose values should be painted. Influences are untouched.
        data: CollapsedGridData,
    },
    /// Performs the one-shot discrete collapse over every cell.
    CollapseAll,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the lattice was rebuilt with the provided dimensions.
    GridConfigured {
        /// Number of cell columns in the new lattice.
        width: u32,
        /// Number of cell rows in the new lattice.
        height: u32,
    },
    /// Reports that a lattice configuration request was rejected.
    GridConfigurationRejected {
        /// Width provided in the rejected request.
        width: u32,
        /// Height provided in the rejected request.
        height: u32,
        /// Specific reason the configuration failed.
        reason: GridError,
    },
    /// Confirms that the preview-blend tuning changed.
    SmoothingConfigured {
        /// Blend speed that became active.
        speed: f32,
        /// Easing curve that became active.
        easing: Easing,
    },
    /// Confirms that the quantization targets changed.
    QuantizationConfigured {
        /// Targets that became active.
        targets: Vec<f32>,
    },
    /// Reports that a quantization request was rejected.
    QuantizationRejected {
        /// Specific reason the request failed.
        reason: QuantizationError,
    },
    /// Indicates that the simulation clock advanced by one diffusion step.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that a tick or finalization was refused before any lattice
    /// was built. Callers must treat this as fatal.
    TickRejected {
        /// Specific reason the tick failed.
        reason: SimulationError,
    },
    /// Confirms that an observer joined the unplaced pool.
    ObserverSpawned {
        /// Identifier allocated to the observer by the world.
        observer: ObserverId,
        /// Parameters the observer was created with.
        config: ObserverConfig,
    },
    /// Confirms that an observer was assigned onto a slot.
    ObserverPlaced {
        /// Identifier of the placed observer.
        observer: ObserverId,
        /// Slot that received the observer.
        slot: SlotId,
    },
    /// Reports that an observer placement request was rejected.
    ObserverPlacementRejected {
        /// Identifier of the observer in the rejected request.
        observer: ObserverId,
        /// Slot provided in the rejected request.
        slot: SlotId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an observer returned to the unplaced pool.
    ObserverRemoved {
        /// Identifier of the removed observer.
        observer: ObserverId,
        /// Slot the observer previously occupied.
        slot: SlotId,
    },
    /// Reports that an observer removal request was rejected.
    ObserverRemovalRejected {
        /// Slot provided in the rejected request.
        slot: SlotId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Confirms that a slot's decay kind advanced.
    DecayCycled {
        /// Slot whose decay kind changed.
        slot: SlotId,
        /// Decay kind that became active on the slot.
        decay: DecayKind,
    },
    /// Confirms that a slot's range advanced.
    RangeCycled {
        /// Slot whose range changed.
        slot: SlotId,
        /// Range that became active on the slot.
        range: u32,
    },
    /// Effect request emitted for each cell an influence footprint touched.
    InfluenceApplied {
        /// Cell that received the influence entry.
        cell: CellCoord,
        /// Signed influence magnitude after decay.
        magnitude: f32,
    },
    /// Confirms that a cell's own influence term changed.
    CellNudged {
        /// Cell whose own term changed.
        cell: CellCoord,
        /// Signed value now held by the cell's own term.
        value: f32,
    },
    /// Reports that a nudge or clear request was rejected.
    NudgeRejected {
        /// Cell provided in the rejected request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: CellError,
    },
    /// Confirms that a cell's influence entries were reset.
    CellCleared {
        /// Cell whose entries were reset.
        cell: CellCoord,
    },
    /// Confirms that a flattened snapshot was painted onto the lattice.
    PatternRestored,
    /// Reports that a snapshot paint request was rejected.
    PatternRejected {
        /// Specific reason the paint failed.
        reason: PatternError,
    },
    /// Confirms that every cell snapped to its discrete collapse target.
    GridCollapsed,
}

/// Unique identifier assigned to an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(u32);

impl ObserverId {
    /// Creates a new observer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a perimeter slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single lattice cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new lattice cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Position within the expanded perimeter coordinate system.
///
/// Slots sit one unit outside the inner lattice, so ring coordinates range
/// over `[0, width + 1] x [0, height + 1]` while the cell they project onto
/// is offset by minus one on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RingCoord {
    x: u32,
    y: u32,
}

impl RingCoord {
    /// Creates a new perimeter ring coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Column index within the expanded coordinate system.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Row index within the expanded coordinate system.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Line-cast direction attached to a perimeter slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// No direction; a line cast from such a slot is a no-op.
    None,
    /// Toward increasing row indices.
    Up,
    /// Toward decreasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
    /// Diagonal toward decreasing columns and increasing rows.
    UpLeft,
    /// Diagonal toward increasing columns and increasing rows.
    UpRight,
    /// Diagonal toward decreasing columns and decreasing rows.
    DownLeft,
    /// Diagonal toward increasing columns and decreasing rows.
    DownRight,
}

impl Direction {
    /// Unit step taken along the direction, as signed column and row deltas.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::None => (0, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::UpLeft => (-1, 1),
            Self::UpRight => (1, 1),
            Self::DownLeft => (-1, -1),
            Self::DownRight => (1, -1),
        }
    }
}

/// Corner classification of a perimeter slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// The slot sits on an edge rather than a corner.
    None,
    /// Upper-left corner of the perimeter ring.
    TopLeft,
    /// Upper-right corner of the perimeter ring.
    TopRight,
    /// Lower-left corner of the perimeter ring.
    BottomLeft,
    /// Lower-right corner of the perimeter ring.
    BottomRight,
}

/// Attenuation profile applied to an observer's force along its footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecayKind {
    /// Full force everywhere within the footprint.
    DoesNotDecay,
    /// Linear falloff across the full affected span. Line casts only.
    Spread,
    /// Gentlest fixed attenuation.
    VerySlow,
    /// Gentle fixed attenuation.
    Slow,
    /// Moderate fixed attenuation.
    Medium,
    /// Steep fixed attenuation.
    Fast,
    /// Steepest fixed attenuation.
    VeryFast,
}

impl DecayKind {
    /// Next decay kind in cycling order, wrapping after the steepest.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::DoesNotDecay => Self::Spread,
            Self::Spread => Self::VerySlow,
            Self::VerySlow => Self::Slow,
            Self::Slow => Self::Medium,
            Self::Medium => Self::Fast,
            Self::Fast => Self::VeryFast,
            Self::VeryFast => Self::DoesNotDecay,
        }
    }
}

/// Shape of the influence field an observer projects onto the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfluenceKind {
    /// Directional beam cast along the slot's direction.
    Line,
    /// Omnidirectional field attenuated by Euclidean distance.
    Radial,
}

/// Easing curve applied to the preview-blend factor each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    /// Unmodified blend factor.
    Linear,
    /// Quadratic ease-in: slow start, fast finish.
    EaseIn,
    /// Quadratic ease-out: fast start, slow finish.
    EaseOut,
    /// S-shaped curve, smooth at both ends.
    SmoothStep,
}

impl Easing {
    /// Applies the curve to a blend factor, clamping the input to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Stable identity of an influence contribution held by a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfluenceSource {
    /// The cell's own term, present from birth with value zero.
    Own,
    /// A contribution projected by a placed observer.
    Observer(ObserverId),
}

/// Parameters an observer is created with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverConfig {
    /// Shape of the projected influence field.
    pub kind: InfluenceKind,
    /// Signed magnitude of the projected influence.
    pub force: f32,
    /// Footprint reach in cells; zero extends to the grid edge.
    pub range: u32,
    /// Attenuation profile applied along the footprint.
    pub decay: DecayKind,
    /// Whether the presentation layer may rotate the observer's visual.
    #[serde(default)]
    pub can_rotate: bool,
}

/// Serialization snapshot of a grid's collapse values.
///
/// Values are flattened in the canonical x-major order
/// `index = x * height + y`; the same order is used when writing target
/// files, reading them back, and comparing grids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapsedGridData {
    /// Number of cell columns captured by the snapshot.
    pub width: u32,
    /// Number of cell rows captured by the snapshot.
    pub height: u32,
    /// Collapse values in canonical order, length `width * height`.
    pub flattened_collapse_values: Vec<f32>,
    /// Level identifier carried through unmodified for traceability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_id: Option<u32>,
    /// Level name carried through unmodified for traceability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
}

impl CollapsedGridData {
    /// Number of values a well-formed snapshot must hold.
    #[must_use]
    pub const fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Value stored for the provided cell, if the snapshot covers it.
    #[must_use]
    pub fn value_at(&self, cell: CellCoord) -> Option<f32> {
        if cell.x() >= self.width || cell.y() >= self.height {
            return None;
        }
        let index = cell.x() as usize * self.height as usize + cell.y() as usize;
        self.flattened_collapse_values.get(index).copied()
    }
}

/// Reasons a lattice configuration request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridError {
    /// Width or height of zero cannot form a lattice.
    InvalidDimension,
}

/// Reasons a quantization request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantizationError {
    /// The target list was empty.
    Empty,
    /// The target list was not sorted ascending.
    Unsorted,
}

/// Reasons a tick may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationError {
    /// No lattice has been built, so neighbor topology is missing.
    MissingTopology,
}

/// Reasons an observer placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The slot already holds an observer; evict it first.
    SlotOccupied,
    /// No slot with the provided identifier exists.
    UnknownSlot,
    /// No observer with the provided identifier exists.
    UnknownObserver,
    /// The observer already occupies another slot.
    AlreadyPlaced,
}

/// Reasons an observer removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// The slot holds no observer.
    EmptySlot,
    /// No slot with the provided identifier exists.
    UnknownSlot,
}

/// Reasons a cell nudge request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// The cell lies outside the lattice bounds.
    OutOfBounds,
}

/// Reasons a snapshot paint request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternError {
    /// The snapshot dimensions do not match the lattice dimensions.
    DimensionMismatch,
    /// The snapshot's value array length disagrees with its dimensions.
    LengthMismatch,
}
