#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure falloff calculator shared by line and radial influence footprints.
//!
//! Both footprint algorithms differ only in how they enumerate cells; the
//! attenuation applied per cell comes from the two functions here, which are
//! deterministic, side-effect free, and independently testable.

use waveform_core::DecayKind;

/// Attenuation factor for a cell at `index` along a line cast of `total` cells.
///
/// `Spread` ramps linearly from full force at the origin-adjacent cell to
/// zero at the far end of the affected span. The remaining kinds subtract a
/// fixed rate per step and floor at zero.
#[must_use]
pub fn line_decay_factor(decay: DecayKind, index: u32, total: u32) -> f32 {
    match decay {
        DecayKind::DoesNotDecay => 1.0,
        DecayKind::Spread => {
            if total <= 1 {
                1.0
            } else {
                1.0 - index as f32 / (total - 1) as f32
            }
        }
        other => {
            let rate = line_decay_rate(other);
            (1.0 - index as f32 * rate).max(0.0)
        }
    }
}

/// Attenuation factor for a cell at `normalized_distance` from a radial source.
///
/// The distance is expected in `[0, 1]`; values beyond the range floor the
/// base term at zero. `Spread` has no radial interpretation and behaves as
/// the gentlest exponent.
#[must_use]
pub fn radial_decay_factor(decay: DecayKind, normalized_distance: f32) -> f32 {
    if matches!(decay, DecayKind::DoesNotDecay) {
        return 1.0;
    }
    let base = (1.0 - normalized_distance).max(0.0);
    base.powf(radial_decay_exponent(decay))
}

fn line_decay_rate(decay: DecayKind) -> f32 {
    match decay {
        DecayKind::DoesNotDecay | DecayKind::Spread => 0.0,
        DecayKind::VerySlow => 0.1,
        DecayKind::Slow => 0.2,
        DecayKind::Medium => 0.3,
        DecayKind::Fast => 0.4,
        DecayKind::VeryFast => 0.5,
    }
}

fn radial_decay_exponent(decay: DecayKind) -> f32 {
    match decay {
        DecayKind::DoesNotDecay => 0.0,
        DecayKind::Spread | DecayKind::VerySlow => 0.5,
        DecayKind::Slow => 1.0,
        DecayKind::Medium => 1.5,
        DecayKind::Fast => 2.0,
        DecayKind::VeryFast => 3.0,
    }
}
