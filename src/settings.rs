use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const VERSION: &str = "v1.0";
pub const BUILD: &str = "b1";

pub const SETTINGS_FILE: &str = "sim-settings.json";
pub const DEFAULTS_FILE: &str = "sim-defaults.json";

/// All user-tunable parameters. Loaded from `sim-settings.json` next to the
/// binary; a read-only copy of the defaults is kept in `sim-defaults.json`.
/// Reloading replaces the active value wholesale, nothing holds onto an old
/// copy across an apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub build: String,

    // Window
    pub fullscreen: bool,
    pub vsync: bool,
    pub show_mouse: bool,
    pub target_framerate: f32,
    pub resolution_x: u32,
    pub resolution_y: u32,

    // Simulation
    pub fov: f32,
    pub simulation_step_size: f32,
    pub skybox_brightness: f32,

    // Accretion disk
    pub disk_inner_radius: f32,
    pub disk_outer_radius: f32,
    pub disk_thickness: f32,
    pub disk_max_temp: f32,
    pub disk_min_temp: f32,
    pub disk_max_velocity: f32,
    pub disk_min_velocity: f32,

    // Video capture
    pub video_render_mode: bool,
    pub video_frame_rate: f32,
    pub video_duration: f32,
    pub video_render_directory: String,
    pub video_store_width_scale: f32,
    pub video_store_height_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            build: BUILD.to_string(),

            fullscreen: false,
            vsync: true,
            show_mouse: true,
            target_framerate: 60.0,
            resolution_x: 1280,
            resolution_y: 720,

            fov: 60.0,
            simulation_step_size: 0.1,
            skybox_brightness: 0.5,

            disk_inner_radius: 3.5,
            disk_outer_radius: 15.0,
            disk_thickness: 0.2,
            disk_max_temp: 4900.0,
            disk_min_temp: 4300.0,
            disk_max_velocity: 0.1,
            disk_min_velocity: 0.01,

            video_render_mode: false,
            video_frame_rate: 24.0,
            video_duration: 10.0,
            video_render_directory: "RenderedFrames/Project01".to_string(),
            video_store_width_scale: 1.0,
            video_store_height_scale: 1.0,
        }
    }
}

impl Settings {
    /// Writes `settings` to `path` only if the file does not exist yet.
    /// Returns true when the file was created.
    pub fn create_if_missing(path: impl AsRef<Path>, settings: &Self) -> Result<bool, SimError> {
        if path.as_ref().exists() {
            return Ok(false);
        }
        settings.write(path)?;
        Ok(true)
    }

    /// Reads settings from `path`, writing (and returning) the defaults when
    /// the file is missing.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let defaults = Self::default();
        if Self::create_if_missing(&path, &defaults)? {
            return Ok(defaults);
        }
        Self::read(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| SimError::Settings {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| SimError::Settings {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        fs::write(path, text)?;
        Ok(())
    }

    /// A stale settings file is a warning, not an error; unknown fields fall
    /// back to defaults on deserialize anyway.
    pub fn warn_on_version_mismatch(&self) {
        if !self.matches_build() {
            log::warn!(
                "settings were written by {} {} but this is {VERSION} {BUILD}, \
                 unexpected behaviour may occur",
                self.version,
                self.build
            );
        }
    }

    pub fn matches_build(&self) -> bool {
        self.version == VERSION && self.build == BUILD
    }

    /// Frame rate the capture session actually runs at. A hand-edited zero,
    /// negative or NaN rate falls back to one frame per second instead of
    /// producing a degenerate simulated clock.
    pub fn capture_frame_rate(&self) -> f32 {
        if self.video_frame_rate > 0.0 {
            self.video_frame_rate
        } else {
            1.0
        }
    }

    /// Frame count of one capture session.
    pub fn total_video_frames(&self) -> u32 {
        (self.capture_frame_rate() * self.video_duration).round().max(1.0) as u32
    }

    /// On-disk frame size after applying the store scale factors.
    pub fn stored_frame_size(&self) -> (u32, u32) {
        let w = (self.resolution_x as f32 * self.video_store_width_scale).round() as u32;
        let h = (self.resolution_y as f32 * self.video_store_height_scale).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("blackhole-rs-test-{}-{name}", std::process::id()));
        p
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let defaults = Settings::default();
        let text = serde_json::to_string_pretty(&defaults).unwrap();
        let parsed: Settings = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.resolution_x, defaults.resolution_x);
        assert_eq!(parsed.video_render_directory, defaults.video_render_directory);
        assert_eq!(parsed.video_frame_rate, defaults.video_frame_rate);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let path = temp_path("create.json");
        let _ = std::fs::remove_file(&path);

        let loaded = Settings::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(loaded.resolution_y, 720);

        // Second load reads the existing file instead of rewriting it.
        let again = Settings::load_or_create(&path).unwrap();
        assert_eq!(again.target_framerate, loaded.target_framerate);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Settings =
            serde_json::from_str(r#"{ "resolution_x": 1920, "video_render_mode": true }"#).unwrap();
        assert_eq!(parsed.resolution_x, 1920);
        assert!(parsed.video_render_mode);
        assert_eq!(parsed.resolution_y, 720);
    }

    #[test]
    fn version_mismatch_is_detected() {
        let mut s = Settings::default();
        assert!(s.matches_build());
        s.version = "v0.9".to_string();
        assert!(!s.matches_build());
    }

    #[test]
    fn total_frames_rounds_rate_times_duration() {
        let mut s = Settings::default();
        s.video_frame_rate = 24.0;
        s.video_duration = 10.0;
        assert_eq!(s.total_video_frames(), 240);

        s.video_frame_rate = 29.97;
        s.video_duration = 2.0;
        assert_eq!(s.total_video_frames(), 60);
    }

    #[test]
    fn degenerate_frame_rates_fall_back_to_one_fps() {
        let mut s = Settings::default();
        s.video_duration = 10.0;

        s.video_frame_rate = 0.0;
        assert_eq!(s.capture_frame_rate(), 1.0);
        assert_eq!(s.total_video_frames(), 10);

        s.video_frame_rate = -24.0;
        assert_eq!(s.capture_frame_rate(), 1.0);

        s.video_frame_rate = f32::NAN;
        assert_eq!(s.capture_frame_rate(), 1.0);
    }

    #[test]
    fn stored_frame_size_scales_and_never_hits_zero() {
        let mut s = Settings::default();
        s.resolution_x = 1280;
        s.resolution_y = 720;
        s.video_store_width_scale = 0.5;
        s.video_store_height_scale = 0.5;
        assert_eq!(s.stored_frame_size(), (640, 360));

        s.video_store_width_scale = 0.0001;
        s.video_store_height_scale = 0.0001;
        assert_eq!(s.stored_frame_size(), (1, 1));
    }
}
