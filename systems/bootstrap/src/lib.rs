#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Waveform level.
//!
//! A level descriptor arrives as a JSON blob from the persistence
//! collaborator; this system validates it and translates it into the
//! deterministic command batch that configures the lattice and spawns the
//! observer roster. Path resolution and file IO are not its concern.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};
use waveform_core::{CollapsedGridData, Command, ObserverConfig};
use waveform_world::{query, World};

const DEFAULT_DURATION_SECONDS: u32 = 30;

/// Everything a level needs: lattice dimensions, the observer roster, the
/// target pattern to grade against, and presentation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    /// Level identifier carried through for traceability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_id: Option<u32>,
    /// Human-readable level name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
    /// Number of cell columns in the level's lattice.
    pub grid_width: u32,
    /// Number of cell rows in the level's lattice.
    pub grid_height: u32,
    /// Play time in seconds before the collapse trigger fires. The core
    /// does not count down; the value is carried for the timer owner.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Observer roster offered to the player.
    #[serde(default)]
    pub observers: Vec<ObserverConfig>,
    /// Pattern the finalized grid is graded against, if the level has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<CollapsedGridData>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECONDS
}

/// Parses and validates a level descriptor from JSON text.
pub fn parse_level(text: &str) -> Result<LevelDescriptor, LevelError> {
    let descriptor: LevelDescriptor =
        serde_json::from_str(text).map_err(LevelError::InvalidJson)?;

    if descriptor.grid_width == 0 || descriptor.grid_height == 0 {
        return Err(LevelError::InvalidDimensions {
            width: descriptor.grid_width,
            height: descriptor.grid_height,
        });
    }
    if let Some(target) = &descriptor.target {
        let expected = target.expected_len();
        let actual = target.flattened_collapse_values.len();
        if actual != expected {
            return Err(LevelError::MalformedTarget { expected, actual });
        }
    }
    Ok(descriptor)
}

/// Produces data and commands required to start a level.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Deterministic command batch that prepares the world for the level:
    /// the lattice first, then the roster in declaration order.
    #[must_use]
    pub fn preparation_commands(&self, descriptor: &LevelDescriptor) -> Vec<Command> {
        let mut commands = Vec::with_capacity(1 + descriptor.observers.len());
        commands.push(Command::ConfigureGrid {
            width: descriptor.grid_width,
            height: descriptor.grid_height,
        });
        for config in &descriptor.observers {
            commands.push(Command::SpawnObserver { config: *config });
        }
        commands
    }

    /// Pattern the finalized grid should be graded against, if any.
    #[must_use]
    pub fn target_pattern<'level>(
        &self,
        descriptor: &'level LevelDescriptor,
    ) -> Option<&'level CollapsedGridData> {
        descriptor.target.as_ref()
    }
}

/// Errors that can occur while reading a level descriptor.
#[derive(Debug)]
pub enum LevelError {
    /// The blob was not valid JSON for the descriptor shape.
    InvalidJson(serde_json::Error),
    /// The descriptor declared an empty lattice dimension.
    InvalidDimensions {
        /// Width declared by the descriptor.
        width: u32,
        /// Height declared by the descriptor.
        height: u32,
    },
    /// The target pattern's value array disagrees with its dimensions.
    MalformedTarget {
        /// Length implied by the target's dimensions.
        expected: usize,
        /// Length actually present.
        actual: usize,
    },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(error) => write!(f, "could not parse level descriptor: {error}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "level grid {width}x{height} has an empty dimension")
            }
            Self::MalformedTarget { expected, actual } => write!(
                f,
                "level target holds {actual} values but its dimensions imply {expected}"
            ),
        }
    }
}

impl Error for LevelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(error) => Some(error),
            _ => None,
        }
    }
}
