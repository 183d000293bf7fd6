#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure scoring system that grades a finalized grid against a target pattern.
//!
//! Similarity is one minus the mean absolute difference between the two
//! flattened value arrays. Values live in `[0, 1]`, so the maximum per-cell
//! error is one and the score needs no further normalization: a perfect
//! match grades 1.0 and full inversion grades 0.0.

use std::{error::Error, fmt};

use waveform_core::CollapsedGridData;

/// Ascending similarity thresholds that bucket a score into stars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingThresholds {
    /// Minimum similarity worth a single star.
    pub one: f32,
    /// Minimum similarity worth two stars.
    pub two: f32,
    /// Minimum similarity worth three stars.
    pub three: f32,
}

impl RatingThresholds {
    /// Creates thresholds from explicit ascending bounds.
    #[must_use]
    pub const fn new(one: f32, two: f32, three: f32) -> Self {
        Self { one, two, three }
    }
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            one: 0.60,
            two: 0.80,
            three: 0.90,
        }
    }
}

/// Outcome of grading a grid against a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    /// Normalized closeness between the grids.
    pub similarity: f32,
    /// Star bucket the similarity falls into.
    pub stars: u8,
}

/// Errors that can occur while comparing two grid snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreError {
    /// The snapshots disagree on dimensions, or a value array does not
    /// match its own declared dimensions.
    DimensionMismatch,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch => {
                write!(f, "grid snapshots have incompatible dimensions")
            }
        }
    }
}

impl Error for ScoreError {}

/// Normalized closeness between two snapshots of equal dimensions.
pub fn compute_similarity(
    current: &CollapsedGridData,
    target: &CollapsedGridData,
) -> Result<f32, ScoreError> {
    if current.width != target.width || current.height != target.height {
        return Err(ScoreError::DimensionMismatch);
    }
    let expected = current.expected_len();
    if current.flattened_collapse_values.len() != expected
        || target.flattened_collapse_values.len() != expected
    {
        return Err(ScoreError::DimensionMismatch);
    }
    if expected == 0 {
        return Ok(1.0);
    }

    let total_error: f32 = current
        .flattened_collapse_values
        .iter()
        .zip(&target.flattened_collapse_values)
        .map(|(current_value, target_value)| (current_value - target_value).abs())
        .sum();
    let mean_error = total_error / expected as f32;
    Ok((1.0 - mean_error).clamp(0.0, 1.0))
}

/// Buckets a similarity score into stars using the provided thresholds.
#[must_use]
pub fn convert_similarity_to_stars(similarity: f32, thresholds: &RatingThresholds) -> u8 {
    if similarity >= thresholds.three {
        3
    } else if similarity >= thresholds.two {
        2
    } else if similarity >= thresholds.one {
        1
    } else {
        0
    }
}

/// Grades the current grid against the target, applying the unscoreable
/// policy: incompatible snapshots rate zero similarity and zero stars
/// instead of failing.
#[must_use]
pub fn evaluate(
    current: &CollapsedGridData,
    target: &CollapsedGridData,
    thresholds: &RatingThresholds,
) -> Evaluation {
    match compute_similarity(current, target) {
        Ok(similarity) => Evaluation {
            similarity,
            stars: convert_similarity_to_stars(similarity, thresholds),
        },
        Err(_) => Evaluation {
            similarity: 0.0,
            stars: 0,
        },
    }
}
