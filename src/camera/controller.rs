use super::state::{clamp_elevation, CameraState, MAX_RADIUS, MIN_RADIUS};

const ORBIT_SPEED: f32 = 0.0025;
const AIM_SPEED: f32 = 0.0025;

// Vertical orbit is deliberately slower than horizontal.
const ORBIT_ELEVATION_FACTOR: f32 = 0.25;

// winit reports wheel motion in lines, not the raw scroll counter the zoom
// constant was originally tuned against; one line approximates one notch.
const ZOOM_SPEED: f32 = 0.3;

/// Turns pointer input into orbit/aim camera motion.
///
/// Left drag orbits, right drag aims, middle drag mixes orbit elevation with
/// aim azimuth. The wheel zooms regardless of buttons.
pub struct CameraController {
    state: CameraState,
    left_pressed: bool,
    middle_pressed: bool,
    right_pressed: bool,
    last_cursor_pos: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            left_pressed: false,
            middle_pressed: false,
            right_pressed: false,
            last_cursor_pos: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    pub fn on_mouse_button(&mut self, button: winit::event::MouseButton, pressed: bool) {
        match button {
            winit::event::MouseButton::Left => self.left_pressed = pressed,
            winit::event::MouseButton::Middle => self.middle_pressed = pressed,
            winit::event::MouseButton::Right => self.right_pressed = pressed,
            _ => {}
        }
        if !pressed {
            self.last_cursor_pos = None;
        }
    }

    pub fn on_cursor_moved(&mut self, position: (f64, f64)) {
        if let Some(last) = self.last_cursor_pos {
            let delta_x = (position.0 - last.0) as f32;
            let delta_y = (position.1 - last.1) as f32;
            self.apply_drag(delta_x, delta_y);
        }
        self.last_cursor_pos = Some(position);
    }

    pub fn on_scroll_lines(&mut self, lines: f32) {
        self.zoom(lines);
    }

    fn zoom(&mut self, delta: f32) {
        self.state.radius =
            (self.state.radius - delta * ZOOM_SPEED).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    /// Core movement rule, separated from winit so it can be exercised with
    /// raw deltas.
    fn apply_drag(&mut self, delta_x: f32, delta_y: f32) {
        if delta_x == 0.0 && delta_y == 0.0 {
            return;
        }

        if self.left_pressed && !self.right_pressed {
            // Orbit around the scene center
            self.state.orbit_elevation = clamp_elevation(
                self.state.orbit_elevation - delta_y * ORBIT_SPEED * ORBIT_ELEVATION_FACTOR,
            );
            self.state.orbit_azimuth -= delta_x * ORBIT_SPEED;
        } else if self.right_pressed {
            // Aim without moving
            self.state.aim_azimuth += delta_x * AIM_SPEED;
            self.state.aim_elevation =
                clamp_elevation(self.state.aim_elevation - delta_y * AIM_SPEED);
        } else if self.middle_pressed {
            // Orbit vertically while aiming horizontally
            self.state.orbit_elevation = clamp_elevation(
                self.state.orbit_elevation - delta_y * ORBIT_SPEED * ORBIT_ELEVATION_FACTOR,
            );
            self.state.aim_azimuth += delta_x * AIM_SPEED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::state::ELEVATION_EPSILON;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;
    use winit::event::MouseButton;

    fn controller() -> CameraController {
        CameraController::new(CameraState::default())
    }

    fn drag(c: &mut CameraController, button: MouseButton, dx: f64, dy: f64) {
        c.on_mouse_button(button, true);
        c.on_cursor_moved((100.0, 100.0));
        c.on_cursor_moved((100.0 + dx, 100.0 + dy));
        c.on_mouse_button(button, false);
    }

    #[test]
    fn orbit_drag_moves_only_orbit_angles() {
        let mut c = controller();
        let before = c.state().clone();
        drag(&mut c, MouseButton::Left, 100.0, 0.0);

        assert_relative_eq!(
            c.state().orbit_azimuth,
            before.orbit_azimuth - 100.0 * ORBIT_SPEED,
            epsilon = 1e-6
        );
        assert_eq!(c.state().aim_azimuth, before.aim_azimuth);
        assert_eq!(c.state().aim_elevation, before.aim_elevation);
        assert_eq!(c.state().radius, before.radius);
    }

    #[test]
    fn aim_drag_moves_only_aim_angles() {
        let mut c = controller();
        let before = c.state().clone();
        drag(&mut c, MouseButton::Right, 40.0, -24.0);

        assert_relative_eq!(
            c.state().aim_azimuth,
            before.aim_azimuth + 40.0 * AIM_SPEED,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            c.state().aim_elevation,
            before.aim_elevation + 24.0 * AIM_SPEED,
            epsilon = 1e-6
        );
        assert_eq!(c.state().orbit_azimuth, before.orbit_azimuth);
        assert_eq!(c.state().orbit_elevation, before.orbit_elevation);
    }

    #[test]
    fn middle_drag_mixes_orbit_elevation_and_aim_azimuth() {
        let mut c = controller();
        let before = c.state().clone();
        drag(&mut c, MouseButton::Middle, 60.0, 20.0);

        assert_relative_eq!(
            c.state().aim_azimuth,
            before.aim_azimuth + 60.0 * AIM_SPEED,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            c.state().orbit_elevation,
            before.orbit_elevation - 20.0 * ORBIT_SPEED * ORBIT_ELEVATION_FACTOR,
            epsilon = 1e-6
        );
        // No horizontal orbit on the middle button
        assert_eq!(c.state().orbit_azimuth, before.orbit_azimuth);
    }

    #[test]
    fn right_button_wins_over_left() {
        let mut c = controller();
        let before = c.state().clone();
        c.on_mouse_button(MouseButton::Left, true);
        c.on_mouse_button(MouseButton::Right, true);
        c.on_cursor_moved((0.0, 0.0));
        c.on_cursor_moved((50.0, 0.0));

        assert_eq!(c.state().orbit_azimuth, before.orbit_azimuth);
        assert!(c.state().aim_azimuth > before.aim_azimuth);
    }

    #[test]
    fn zero_delta_changes_nothing() {
        let mut c = controller();
        c.on_mouse_button(MouseButton::Left, true);
        c.on_cursor_moved((10.0, 10.0));
        let before = c.state().clone();
        for _ in 0..100 {
            c.on_cursor_moved((10.0, 10.0));
        }
        assert_eq!(c.state().orbit_azimuth, before.orbit_azimuth);
        assert_eq!(c.state().orbit_elevation, before.orbit_elevation);
        assert_eq!(c.state().aim_azimuth, before.aim_azimuth);
        assert_eq!(c.state().aim_elevation, before.aim_elevation);
    }

    #[test]
    fn elevations_stay_clamped_under_arbitrary_drags() {
        let mut c = controller();
        c.on_mouse_button(MouseButton::Left, true);
        c.on_cursor_moved((0.0, 0.0));
        for i in 0..500 {
            let y = if i % 3 == 0 { 1e5 } else { -7e4 };
            c.on_cursor_moved((f64::from(i), y));
        }
        c.on_mouse_button(MouseButton::Left, false);
        c.on_mouse_button(MouseButton::Right, true);
        c.on_cursor_moved((0.0, 0.0));
        for i in 0..500 {
            c.on_cursor_moved((0.0, f64::from(i % 7) * -9e4));
        }

        let s = c.state();
        assert!(s.orbit_elevation >= ELEVATION_EPSILON);
        assert!(s.orbit_elevation <= PI - ELEVATION_EPSILON);
        assert!(s.aim_elevation >= ELEVATION_EPSILON);
        assert!(s.aim_elevation <= PI - ELEVATION_EPSILON);
    }

    #[test]
    fn radius_stays_clamped_under_extreme_scrolls() {
        let mut c = controller();
        c.on_scroll_lines(1e9);
        assert_eq!(c.state().radius, MIN_RADIUS);
        c.on_scroll_lines(-1e9);
        assert_eq!(c.state().radius, MAX_RADIUS);
        for i in 0..1000 {
            c.on_scroll_lines(if i % 2 == 0 { 5000.0 } else { -4999.0 });
            assert!(c.state().radius >= MIN_RADIUS && c.state().radius <= MAX_RADIUS);
        }
    }

    #[test]
    fn scroll_zooms_even_while_buttons_are_held() {
        let mut c = controller();
        c.on_mouse_button(MouseButton::Left, true);
        let before = c.state().radius;
        c.on_scroll_lines(2.0);
        assert!(c.state().radius < before);
    }

    #[test]
    fn releasing_a_button_forgets_the_anchor() {
        let mut c = controller();
        drag(&mut c, MouseButton::Left, 10.0, 0.0);
        let after_first = c.state().orbit_azimuth;

        // New drag far away must not produce a jump from the stale position.
        c.on_mouse_button(MouseButton::Left, true);
        c.on_cursor_moved((5000.0, 5000.0));
        assert_eq!(c.state().orbit_azimuth, after_first);
    }
}
