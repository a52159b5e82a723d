//! Orbit placement: where a body sits relative to its star.
//!
//! Placement is geometric. The orbit vector is perpendicular to the orbit axis with length
//! `orbit_radius`, so a body's distance from its star never depends on time.

use engine_core::Transform;
use glam::{Quat, Vec3};

use crate::body::BodyConfiguration;

/// Offset from the star centre at time zero.
///
/// The initial phase is fixed by `orbit_axis` alone. A zero axis or zero radius gives `Vec3::ZERO`.
pub fn compute_orbit_vector(body: &BodyConfiguration) -> Vec3 {
    let axis = body.orbit_axis;
    let helper = if axis.x == 0.0 && axis.z == 0.0 {
        Vec3::X
    } else {
        Vec3::Y
    };
    helper.cross(axis).normalize_or_zero() * body.orbit_radius
}

/// World-space position at time zero.
pub fn world_position(body: &BodyConfiguration) -> Vec3 {
    body.star_position + compute_orbit_vector(body)
}

/// Transform at `time`: the body has travelled `velocity * time` radians around its orbit
/// axis and spins about the same axis, phase-shifted by `orbit_angle`.
pub fn orbit_transform(body: &BodyConfiguration, time: f32) -> Transform {
    let axis = body.orbit_axis.try_normalize().unwrap_or(Vec3::Y);
    let mut transform = Transform::from_position_rotation(
        world_position(body),
        Quat::from_axis_angle(axis, body.orbit_angle.to_radians()),
    );
    transform.rotate_around(body.star_position, axis, body.velocity * time);
    transform
}
