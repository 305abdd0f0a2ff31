use nalgebra::UnitQuaternion;
use rapier3d::prelude::*;
use std::collections::HashMap;

use super::constants::physics as consts;
use super::movement::{
    BodyTransform, CharacterRigidBody, LayerFilter, SpatialQuery, SurfaceHit, SurfaceTag, Vec3,
};
use crate::config::BoxDef;

/// Collision group a tagged surface is inserted with.
fn group_for(tag: SurfaceTag) -> Group {
    match tag {
        SurfaceTag::Ground => consts::GROUP_GROUND,
        SurfaceTag::Wall => consts::GROUP_WALL,
        SurfaceTag::Untagged => consts::GROUP_UNTAGGED,
    }
}

/// Wrapper around a Rapier3D physics world holding static level geometry and
/// the dynamic character bodies driven by the movement controller.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Surface tag of every static collider, reported by ray casts
    pub surface_tags: HashMap<ColliderHandle, SurfaceTag>,
    /// Character bodies whose user forces are cleared after each step
    pub characters: HashMap<RigidBodyHandle, ColliderHandle>,
}

impl PhysicsWorld {
    /// Creates a new physics world with default gravity
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::DEFAULT_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            surface_tags: HashMap::new(),
            characters: HashMap::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds.
    ///
    /// Forces added to characters during the tick act for exactly this step.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for handle in self.characters.keys() {
            if let Some(body) = self.rigid_body_set.get_mut(*handle) {
                body.reset_forces(false);
            }
        }
    }

    /// Refresh the query pipeline after inserting geometry outside of `step`
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds a fixed cuboid tagged as ground
    pub fn add_ground(&mut self, def: &BoxDef) -> ColliderHandle {
        self.add_static_box(def, SurfaceTag::Ground)
    }

    /// Adds a fixed cuboid tagged as a runnable wall
    pub fn add_wall(&mut self, def: &BoxDef) -> ColliderHandle {
        self.add_static_box(def, SurfaceTag::Wall)
    }

    /// Adds a fixed cuboid with the given surface tag
    pub fn add_static_box(&mut self, def: &BoxDef, tag: SurfaceTag) -> ColliderHandle {
        let [hx, hy, hz] = def.half_extents;
        let [x, y, z] = def.translation;
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .translation(vector![x, y, z])
            .collision_groups(InteractionGroups::new(group_for(tag), Group::ALL))
            .build();
        let handle = self.collider_set.insert(collider);
        self.surface_tags.insert(handle, tag);
        handle
    }

    /// Adds a dynamic capsule character.
    ///
    /// Rotations are locked and gravity is left to the movement controller, so
    /// the body only moves by the velocity written each tick plus the forces
    /// accumulated for one step. The capsule has no friction against anything.
    pub fn add_character(&mut self, position: Vec3, height: f32, mass: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(position)
            .lock_rotations()
            .gravity_scale(0.0)
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        // Total height = 2*half_height + 2*radius
        let radius = consts::CHARACTER_RADIUS;
        let half_height = (height - 2.0 * radius).max(0.0) / 2.0;
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .mass(mass)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(InteractionGroups::new(
                consts::GROUP_CHARACTER,
                Group::ALL & !consts::GROUP_CHARACTER,
            ))
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        self.characters.insert(body_handle, collider_handle);
        body_handle
    }

    pub fn has_character(&self, handle: RigidBodyHandle) -> bool {
        self.characters.contains_key(&handle) && self.rigid_body_set.contains(handle)
    }

    /// Borrow a character as the movement controller's collaborator
    pub fn character_view(&mut self, body: RigidBodyHandle) -> Option<CharacterView<'_>> {
        if !self.has_character(body) {
            return None;
        }
        Some(CharacterView { world: self, body })
    }

    pub fn get_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|b| *b.translation())
    }

    pub fn get_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|b| *b.linvel())
    }

    /// Heading in degrees, positive toward +X from the -Z facing
    pub fn get_yaw_degrees(&self, handle: RigidBodyHandle) -> Option<f32> {
        let body = self.rigid_body_set.get(handle)?;
        let forward = body.rotation() * vector![0.0, 0.0, -1.0];
        Some(forward.x.atan2(-forward.z).to_degrees())
    }

    /// Casts a ray and returns the nearest tagged hit.
    /// `LayerFilter::Only` restricts the cast to colliders in that tag's group.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerFilter,
        exclude_body: Option<RigidBodyHandle>,
    ) -> Option<SurfaceHit> {
        let direction = direction.try_normalize(consts::EPSILON)?;
        let ray = Ray::new(point![origin.x, origin.y, origin.z], direction);

        let mut query_filter = QueryFilter::default().exclude_sensors();
        if let Some(body_handle) = exclude_body {
            query_filter = query_filter.exclude_rigid_body(body_handle);
        }
        if let LayerFilter::Only(tag) = filter {
            query_filter = query_filter.groups(InteractionGroups::new(Group::ALL, group_for(tag)));
        }

        let (collider, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true, // solid
            query_filter,
        )?;

        Some(SurfaceHit {
            distance: hit.time_of_impact,
            normal: hit.normal,
            tag: self
                .surface_tags
                .get(&collider)
                .copied()
                .unwrap_or(SurfaceTag::Untagged),
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// One character body seen through the movement collaborator traits.
///
/// Holds the whole world mutably so the same value can answer spatial queries
/// and take velocity writes within a tick.
pub struct CharacterView<'a> {
    world: &'a mut PhysicsWorld,
    body: RigidBodyHandle,
}

impl CharacterView<'_> {
    fn rigid_body(&self) -> Option<&RigidBody> {
        self.world.rigid_body_set.get(self.body)
    }

    fn rigid_body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.rigid_body_set.get_mut(self.body)
    }
}

impl SpatialQuery for CharacterView<'_> {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerFilter,
    ) -> Option<SurfaceHit> {
        self.world
            .cast_ray(origin, direction, max_distance, filter, Some(self.body))
    }
}

impl CharacterRigidBody for CharacterView<'_> {
    fn velocity(&self) -> Vec3 {
        self.rigid_body()
            .map(|b| *b.linvel())
            .unwrap_or_else(Vec3::zeros)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.rigid_body_mut() {
            body.set_linvel(velocity, true);
        }
    }

    fn add_force(&mut self, force: Vec3) {
        if let Some(body) = self.rigid_body_mut() {
            body.add_force(force, true);
        }
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        if let Some(body) = self.rigid_body_mut() {
            body.set_angvel(angular_velocity, true);
        }
    }

    fn transform(&self) -> BodyTransform {
        let Some(body) = self.rigid_body() else {
            return BodyTransform::upright(Vec3::zeros());
        };
        let rotation = body.rotation();
        BodyTransform {
            position: *body.translation(),
            forward: rotation * vector![0.0, 0.0, -1.0],
            right: rotation * Vec3::x(),
            up: rotation * Vec3::y(),
        }
    }

    fn rotate_yaw(&mut self, degrees: f32) {
        if degrees == 0.0 {
            return;
        }
        if let Some(body) = self.rigid_body_mut() {
            let turn = UnitQuaternion::from_axis_angle(&Vec3::y_axis(), -degrees.to_radians());
            let rotation = turn * body.rotation();
            body.set_rotation(rotation, true);
        }
    }
}
