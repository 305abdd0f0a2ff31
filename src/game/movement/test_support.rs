//! Scripted collaborators for movement unit tests.

use nalgebra::{Rotation3, Unit};

use super::{
    BodyTransform, CameraRig, CharacterRigidBody, LayerFilter, SpatialQuery, SurfaceHit,
    SurfaceTag, Vec3,
};

/// A world with at most one surface below and one on each side of the body.
///
/// Casts are routed by direction relative to the current transform, so the
/// mock keeps working after `rotate_yaw`.
#[derive(Debug, Clone)]
pub struct MockWorld {
    pub ground_distance: Option<f32>,
    pub ground_tag: SurfaceTag,
    pub right_wall: Option<SurfaceHit>,
    pub left_wall: Option<SurfaceHit>,
    pub velocity: Vec3,
    pub forces: Vec<Vec3>,
    pub angular_velocity: Vec3,
    pub transform: BodyTransform,
    pub yaw_degrees: f32,
}

impl MockWorld {
    pub fn on_ground() -> Self {
        Self {
            ground_distance: Some(1.0),
            ground_tag: SurfaceTag::Ground,
            right_wall: None,
            left_wall: None,
            velocity: Vec3::zeros(),
            forces: Vec::new(),
            angular_velocity: Vec3::zeros(),
            transform: BodyTransform::upright(Vec3::new(0.0, 1.0, 0.0)),
            yaw_degrees: 0.0,
        }
    }

    pub fn airborne() -> Self {
        Self {
            ground_distance: None,
            ..Self::on_ground()
        }
    }
}

fn passes(filter: LayerFilter, tag: SurfaceTag) -> bool {
    match filter {
        LayerFilter::Any => true,
        LayerFilter::Only(wanted) => wanted == tag,
    }
}

impl SpatialQuery for MockWorld {
    fn cast(
        &self,
        _origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerFilter,
    ) -> Option<SurfaceHit> {
        let t = &self.transform;
        let hit = if direction.dot(&-t.up) > 0.5 {
            self.ground_distance.map(|distance| SurfaceHit {
                distance,
                normal: t.up,
                tag: self.ground_tag,
            })
        } else if direction.dot(&t.right) > 0.5 {
            self.right_wall
        } else if direction.dot(&t.right) < -0.5 {
            self.left_wall
        } else {
            None
        }?;

        (hit.distance <= max_distance && passes(filter, hit.tag)).then_some(hit)
    }
}

impl CharacterRigidBody for MockWorld {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec3) {
        self.forces.push(force);
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    fn transform(&self) -> BodyTransform {
        self.transform
    }

    fn rotate_yaw(&mut self, degrees: f32) {
        let rotation =
            Rotation3::from_axis_angle(&Unit::new_normalize(self.transform.up), -degrees.to_radians());
        self.transform.forward = rotation * self.transform.forward;
        self.transform.right = rotation * self.transform.right;
        self.yaw_degrees += degrees;
    }
}

/// A wall hit as reported by a lateral probe.
pub fn wall_hit(distance: f32, normal: Vec3) -> SurfaceHit {
    SurfaceHit {
        distance,
        normal,
        tag: SurfaceTag::Wall,
    }
}

/// Records every pitch delta it receives.
#[derive(Debug, Default)]
pub struct MockCamera {
    pub deltas: Vec<f32>,
}

impl CameraRig for MockCamera {
    fn rotate_camera(&mut self, pitch_delta_degrees: f32) {
        self.deltas.push(pitch_delta_degrees);
    }
}
