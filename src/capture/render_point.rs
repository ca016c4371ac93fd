/// Immutable snapshot of the camera pose, used as a capture keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPoint {
    pub zoom: f32,
    pub orbit_azimuth: f32,
    pub orbit_elevation: f32,
    pub aim_azimuth: f32,
    pub aim_elevation: f32,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl RenderPoint {
    /// Field-wise linear blend. Azimuths are interpolated as raw values with
    /// no wraparound correction, so keyframes more than pi apart take the
    /// long way around the orbit sphere.
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            zoom: lerp(a.zoom, b.zoom, t),
            orbit_azimuth: lerp(a.orbit_azimuth, b.orbit_azimuth, t),
            orbit_elevation: lerp(a.orbit_elevation, b.orbit_elevation, t),
            aim_azimuth: lerp(a.aim_azimuth, b.aim_azimuth, t),
            aim_elevation: lerp(a.aim_elevation, b.aim_elevation, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(seed: f32) -> RenderPoint {
        RenderPoint {
            zoom: 10.0 + seed,
            orbit_azimuth: 0.5 * seed,
            orbit_elevation: 1.5 - 0.1 * seed,
            aim_azimuth: 3.0 + seed,
            aim_elevation: 1.6 + 0.05 * seed,
        }
    }

    #[test]
    fn endpoints_reproduce_the_inputs_exactly() {
        let a = point(0.0);
        let b = point(4.0);
        assert_eq!(RenderPoint::lerp(a, b, 0.0), a);
        assert_eq!(RenderPoint::lerp(a, b, 1.0), b);
    }

    #[test]
    fn self_interpolation_is_identity_for_any_t() {
        let p = point(2.5);
        for t in [0.0, 0.1, 0.33, 0.5, 0.99, 1.0] {
            let q = RenderPoint::lerp(p, p, t);
            assert_relative_eq!(q.zoom, p.zoom, epsilon = 1e-6);
            assert_relative_eq!(q.orbit_azimuth, p.orbit_azimuth, epsilon = 1e-6);
            assert_relative_eq!(q.aim_elevation, p.aim_elevation, epsilon = 1e-6);
        }
    }

    #[test]
    fn midpoint_is_the_average() {
        let a = point(0.0);
        let b = point(4.0);
        let m = RenderPoint::lerp(a, b, 0.5);
        assert_relative_eq!(m.zoom, (a.zoom + b.zoom) * 0.5, epsilon = 1e-6);
        assert_relative_eq!(
            m.orbit_azimuth,
            (a.orbit_azimuth + b.orbit_azimuth) * 0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn wide_azimuth_gaps_are_not_wrapped() {
        let mut a = point(0.0);
        let mut b = point(0.0);
        a.orbit_azimuth = 0.1;
        b.orbit_azimuth = 6.2; // nearly a full turn apart; shortest path would wrap
        let m = RenderPoint::lerp(a, b, 0.5);
        assert_relative_eq!(m.orbit_azimuth, 3.15, epsilon = 1e-5);
    }
}
