use crate::capture::RenderPoint;
use nalgebra_glm::Vec3;
use std::f32::consts::PI;

pub const MIN_RADIUS: f32 = 0.5;
pub const MAX_RADIUS: f32 = 50.0;

/// Keeps elevation angles away from the poles so the view basis never
/// degenerates (forward parallel to world up).
pub const ELEVATION_EPSILON: f32 = 0.01;

/// Camera on an orbit sphere around the scene origin. The aim angles are a
/// look-direction offset relative to the orbit azimuth, so dragging the orbit
/// carries the look direction with it.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub radius: f32,
    pub orbit_azimuth: f32,
    pub orbit_elevation: f32,
    pub aim_azimuth: f32,
    pub aim_elevation: f32,
}

/// The four vectors the ray-marching kernel needs.
#[derive(Debug, Clone, Copy)]
pub struct ShaderBasis {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            radius: 15.0,
            orbit_azimuth: 0.0,
            orbit_elevation: PI / 1.9,
            aim_azimuth: PI,
            aim_elevation: PI / 1.9,
        }
    }
}

fn spherical(elevation: f32, azimuth: f32) -> Vec3 {
    nalgebra_glm::vec3(
        elevation.sin() * azimuth.cos(),
        elevation.cos(),
        elevation.sin() * azimuth.sin(),
    )
}

pub(super) fn clamp_elevation(elevation: f32) -> f32 {
    elevation.clamp(ELEVATION_EPSILON, PI - ELEVATION_EPSILON)
}

impl CameraState {
    pub fn position(&self) -> Vec3 {
        self.radius * spherical(self.orbit_elevation, self.orbit_azimuth)
    }

    pub fn direction(&self) -> Vec3 {
        spherical(self.aim_elevation, self.aim_azimuth + self.orbit_azimuth)
    }

    pub fn shader_basis(&self) -> ShaderBasis {
        let world_up = nalgebra_glm::vec3(0.0, 1.0, 0.0);
        let forward = nalgebra_glm::normalize(&self.direction());
        let right = nalgebra_glm::normalize(&nalgebra_glm::cross(&forward, &world_up));
        let up = nalgebra_glm::normalize(&nalgebra_glm::cross(&right, &forward));
        ShaderBasis {
            position: self.position(),
            forward,
            right,
            up,
        }
    }

    /// Snapshot of the five scalars a capture keyframe needs.
    pub fn render_point(&self) -> RenderPoint {
        RenderPoint {
            zoom: self.radius,
            orbit_azimuth: self.orbit_azimuth,
            orbit_elevation: self.orbit_elevation,
            aim_azimuth: self.aim_azimuth,
            aim_elevation: self.aim_elevation,
        }
    }

    /// Overwrites the full camera pose. Only the frame orchestrator calls
    /// this, once per captured frame.
    pub fn apply_render_point(&mut self, point: RenderPoint) {
        self.radius = point.zoom;
        self.orbit_azimuth = point.orbit_azimuth;
        self.orbit_elevation = point.orbit_elevation;
        self.aim_azimuth = point.aim_azimuth;
        self.aim_elevation = point.aim_elevation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_pose_looks_back_at_the_origin() {
        let state = CameraState::default();
        let basis = state.shader_basis();

        // aim azimuth of PI relative to the orbit azimuth points the camera
        // inward, so forward roughly opposes the position vector
        let toward_origin = -nalgebra_glm::normalize(&basis.position);
        assert_relative_eq!(basis.forward.x, toward_origin.x, epsilon = 0.05);
        assert_relative_eq!(basis.forward.z, toward_origin.z, epsilon = 0.05);
    }

    #[test]
    fn basis_is_orthonormal() {
        let mut state = CameraState::default();
        state.orbit_azimuth = 1.3;
        state.orbit_elevation = 0.7;
        state.aim_azimuth = 2.9;
        state.aim_elevation = 2.1;

        let basis = state.shader_basis();
        assert_relative_eq!(nalgebra_glm::length(&basis.forward), 1.0, epsilon = 1e-5);
        assert_relative_eq!(nalgebra_glm::length(&basis.right), 1.0, epsilon = 1e-5);
        assert_relative_eq!(nalgebra_glm::length(&basis.up), 1.0, epsilon = 1e-5);
        assert_relative_eq!(nalgebra_glm::dot(&basis.forward, &basis.right), 0.0, epsilon = 1e-5);
        assert_relative_eq!(nalgebra_glm::dot(&basis.forward, &basis.up), 0.0, epsilon = 1e-5);
        assert_relative_eq!(nalgebra_glm::dot(&basis.right, &basis.up), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn basis_survives_clamped_pole_elevations() {
        let mut state = CameraState::default();
        state.aim_elevation = clamp_elevation(0.0);
        let basis = state.shader_basis();
        assert!(basis.right.iter().all(|c| c.is_finite()));
        assert!(nalgebra_glm::length(&basis.right) > 0.5);
    }

    #[test]
    fn render_point_round_trips() {
        let mut state = CameraState::default();
        state.radius = 3.25;
        state.orbit_azimuth = -4.0;
        let point = state.render_point();

        let mut other = CameraState::default();
        other.apply_render_point(point);
        assert_eq!(other.radius, 3.25);
        assert_eq!(other.orbit_azimuth, -4.0);
        assert_eq!(other.aim_azimuth, state.aim_azimuth);
    }

    #[test]
    fn position_sits_on_the_orbit_sphere() {
        let mut state = CameraState::default();
        state.radius = 7.0;
        assert_relative_eq!(nalgebra_glm::length(&state.position()), 7.0, epsilon = 1e-5);
    }
}
