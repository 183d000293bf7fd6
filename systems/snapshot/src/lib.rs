#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON wire format for collapsed grid snapshots.
//!
//! The only wire format in scope: an object with integer `width` and
//! `height`, a flat `flattenedCollapseValues` array of length
//! `width * height` in canonical x-major order, and optional `levelId` /
//! `levelName` metadata carried through unmodified. File IO stays with the
//! collaborator; this system only turns text blobs into validated snapshots
//! and back.

use std::{error::Error, fmt};

use waveform_core::CollapsedGridData;

/// Per-cell tolerance used by the approximate snapshot comparison.
pub const COMPARE_TOLERANCE: f32 = 1e-4;

/// Encodes a snapshot into its canonical JSON text form.
#[must_use]
pub fn encode(data: &CollapsedGridData) -> String {
    serde_json::to_string(data).expect("grid snapshot serialization never fails")
}

/// Decodes and validates a snapshot from JSON text.
///
/// Failures are recoverable by design: a caller skips drawing or scoring
/// the offending input rather than aborting the simulation loop.
pub fn decode(text: &str) -> Result<CollapsedGridData, SnapshotError> {
    let data: CollapsedGridData =
        serde_json::from_str(text).map_err(SnapshotError::InvalidJson)?;

    let expected = data.expected_len();
    let actual = data.flattened_collapse_values.len();
    if actual != expected {
        return Err(SnapshotError::LengthMismatch { expected, actual });
    }
    for (index, value) in data.flattened_collapse_values.iter().enumerate() {
        if !value.is_finite() || *value < 0.0 || *value > 1.0 {
            return Err(SnapshotError::ValueOutOfRange {
                index,
                value: *value,
            });
        }
    }
    Ok(data)
}

/// Element-wise approximate equality over two snapshots.
///
/// Distinct from the continuous similarity score: this is the exact-match
/// test, answering whether two grids are the same within [`COMPARE_TOLERANCE`].
#[must_use]
pub fn approx_eq(a: &CollapsedGridData, b: &CollapsedGridData) -> bool {
    if a.width != b.width || a.height != b.height {
        return false;
    }
    if a.flattened_collapse_values.len() != b.flattened_collapse_values.len() {
        return false;
    }
    a.flattened_collapse_values
        .iter()
        .zip(&b.flattened_collapse_values)
        .all(|(left, right)| (left - right).abs() <= COMPARE_TOLERANCE)
}

/// Errors that can occur while decoding a snapshot blob.
#[derive(Debug)]
pub enum SnapshotError {
    /// The blob was not valid JSON for the snapshot shape.
    InvalidJson(serde_json::Error),
    /// The value array length disagrees with the declared dimensions.
    LengthMismatch {
        /// Length implied by `width * height`.
        expected: usize,
        /// Length actually present in the blob.
        actual: usize,
    },
    /// A value fell outside the unit interval.
    ValueOutOfRange {
        /// Index of the offending value in canonical order.
        index: usize,
        /// The offending value.
        value: f32,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(error) => write!(f, "could not parse grid snapshot: {error}"),
            Self::LengthMismatch { expected, actual } => write!(
                f,
                "snapshot holds {actual} values but its dimensions imply {expected}"
            ),
            Self::ValueOutOfRange { index, value } => write!(
                f,
                "snapshot value {value} at index {index} lies outside [0, 1]"
            ),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(error) => Some(error),
            _ => None,
        }
    }
}
