use tracing::debug;

use super::state::{CharacterBody, MovementMode};
use super::{LayerFilter, SpatialQuery, SurfaceTag, Vec3};
use crate::game::constants::movement::GROUND_PROBE_MARGIN;

/// Result of a ground probe for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundSample {
    pub grounded: bool,
    /// True on the tick the body went from airborne (or wall-running) to grounded.
    pub landed: bool,
}

/// Length of the downward probe for a body of `height`.
#[inline]
pub fn probe_length(height: f32) -> f32 {
    height / 2.0 + GROUND_PROBE_MARGIN
}

/// Classify the body as grounded or airborne with a short downward cast.
///
/// The cast ignores layers but only counts surfaces tagged [`SurfaceTag::Ground`].
/// Landing ends any wall-run, refills the jump budget and forgets the last wall
/// before anything else runs this tick.
pub fn check_ground<Q: SpatialQuery + ?Sized>(
    body: &mut CharacterBody,
    query: &Q,
    position: Vec3,
    down: Vec3,
    height: f32,
) -> GroundSample {
    let grounded = query
        .cast(position, down, probe_length(height), LayerFilter::Any)
        .is_some_and(|hit| hit.tag == SurfaceTag::Ground);

    let was_grounded = body.grounded();

    if grounded {
        if !was_grounded {
            if let MovementMode::WallRunning { normal, timer, .. } = body.mode {
                debug!(?normal, timer, "wall-run ended by landing");
            }
            body.land();
            debug!(remaining_jumps = body.remaining_jumps, "landed");
        }
    } else if was_grounded {
        body.mode = MovementMode::Airborne;
    }

    GroundSample {
        grounded,
        landed: grounded && !was_grounded,
    }
}
