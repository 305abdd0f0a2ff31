use super::state::{CharacterBody, WallContact};
use super::{BodyTransform, LayerFilter, SpatialQuery, SurfaceHit, SurfaceTag};
use crate::game::constants::movement::MIN_NORMAL_LENGTH;

/// Result of the lateral wall probes for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSample {
    /// The retained contact, also stored in `CharacterBody::wall`.
    pub contact: Option<WallContact>,
    /// The retained contact differs from the last wall that was run on.
    pub newly_detected: bool,
}

impl WallSample {
    pub const NONE: WallSample = WallSample {
        contact: None,
        newly_detected: false,
    };
}

/// Build a contact from a hit, or `None` if its normal is degenerate.
fn contact_from_hit(hit: &SurfaceHit, up: super::Vec3) -> Option<WallContact> {
    let normal = hit.normal.try_normalize(MIN_NORMAL_LENGTH)?;
    Some(WallContact {
        normal,
        forward: normal.cross(&up),
    })
}

/// Probe both sides of the body for walls.
///
/// The right side is cast first and the left side second; when both hit,
/// the left result overwrites the right one. A contact only counts as newly
/// detected when its normal differs exactly from `previous_wall_normal`, so
/// the wall that was just left cannot be latched again before touching ground.
///
/// This does not stop an active wall-run; see [`super::wall_run::sync_with_wall`].
pub fn check_walls<Q: SpatialQuery + ?Sized>(
    body: &mut CharacterBody,
    query: &Q,
    transform: &BodyTransform,
    range: f32,
) -> WallSample {
    let filter = LayerFilter::Only(SurfaceTag::Wall);
    let right = query.cast(transform.position, transform.right, range, filter);
    let left = query.cast(transform.position, -transform.right, range, filter);

    let mut sample = WallSample::NONE;
    for hit in [right, left].iter().flatten() {
        if let Some(contact) = contact_from_hit(hit, transform.up) {
            sample = WallSample {
                contact: Some(contact),
                newly_detected: contact.normal != body.previous_wall_normal,
            };
        }
    }

    body.wall = sample.contact;
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::movement::test_support::{wall_hit, MockWorld};
    use crate::game::movement::Vec3;

    fn airborne_world() -> MockWorld {
        let mut world = MockWorld::on_ground();
        world.ground_distance = None;
        world
    }

    #[test]
    fn test_no_walls_reports_nothing() {
        let world = airborne_world();
        let mut body = CharacterBody::new();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert_eq!(sample, WallSample::NONE);
        assert!(body.wall.is_none());
    }

    #[test]
    fn test_right_wall_alone_is_detected() {
        let mut world = airborne_world();
        world.right_wall = Some(wall_hit(0.6, -Vec3::x()));
        let mut body = CharacterBody::new();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert!(sample.newly_detected);
        let contact = sample.contact.unwrap();
        assert_eq!(contact.normal, -Vec3::x());
        assert_eq!(body.wall, Some(contact));
    }

    #[test]
    fn test_left_wall_wins_when_both_sides_hit() {
        let mut world = airborne_world();
        world.right_wall = Some(wall_hit(0.6, -Vec3::x()));
        world.left_wall = Some(wall_hit(0.8, Vec3::x()));
        let mut body = CharacterBody::new();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert_eq!(sample.contact.unwrap().normal, Vec3::x());
    }

    #[test]
    fn test_left_wall_result_overrides_right_eligibility() {
        let mut world = airborne_world();
        world.right_wall = Some(wall_hit(0.6, -Vec3::x()));
        world.left_wall = Some(wall_hit(0.8, Vec3::x()));
        let mut body = CharacterBody::new();
        body.previous_wall_normal = Vec3::x();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert!(!sample.newly_detected);
        assert_eq!(sample.contact.unwrap().normal, Vec3::x());
    }

    #[test]
    fn test_walls_out_of_range_are_ignored() {
        let mut world = airborne_world();
        world.left_wall = Some(wall_hit(1.5, Vec3::x()));
        let mut body = CharacterBody::new();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert!(sample.contact.is_none());
    }

    #[test]
    fn test_same_normal_as_previous_is_not_new() {
        let mut world = airborne_world();
        world.left_wall = Some(wall_hit(0.7, Vec3::x()));
        let mut body = CharacterBody::new();
        body.previous_wall_normal = Vec3::x();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert!(sample.contact.is_some());
        assert!(!sample.newly_detected);
    }

    #[test]
    fn test_normal_is_normalized_and_forward_is_tangent() {
        let mut world = airborne_world();
        world.left_wall = Some(wall_hit(0.7, Vec3::new(3.0, 0.0, 0.0)));
        let mut body = CharacterBody::new();

        let contact = check_walls(&mut body, &world, &world.transform, 1.0)
            .contact
            .unwrap();

        assert!((contact.normal.norm() - 1.0).abs() < 1e-6);
        assert!(contact.forward.dot(&contact.normal).abs() < 1e-6);
        assert!(contact.forward.dot(&Vec3::y()).abs() < 1e-6);
        assert!((contact.forward.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal_is_treated_as_no_hit() {
        let mut world = airborne_world();
        world.left_wall = Some(wall_hit(0.7, Vec3::zeros()));
        let mut body = CharacterBody::new();

        let sample = check_walls(&mut body, &world, &world.transform, 1.0);

        assert_eq!(sample, WallSample::NONE);
    }
}
