use super::RenderPoint;
use crate::error::SimError;
use crate::settings::{Settings, SETTINGS_FILE};
use std::fs;
use std::path::PathBuf;

/// Capture mode state. `RealTime` is the interactive default; the three
/// capture states only exist while `video_render_mode` is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    RealTime,
    AwaitingMarks,
    Capturing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkSlot {
    Start,
    End,
}

/// What the current tick should render.
#[derive(Debug, Clone, PartialEq)]
pub enum TickPlan {
    /// Live camera, wall-clock time, straight to the window.
    Live,
    /// One deterministic capture frame: pose the camera at `point`, simulate
    /// `simulated_time` seconds, render off-screen and persist to `path`.
    Capture {
        point: RenderPoint,
        simulated_time: f32,
        frame_index: u32,
        path: PathBuf,
    },
}

/// Drives the offline frame-capture session: holds the two keyframes, the
/// frame counter and the decoupled simulated clock, and decides per tick
/// whether to render live or to produce the next capture frame.
///
/// Only a settings reload moves the machine out of `Complete` or back out of
/// `Capturing`; marking is a one-way trigger.
pub struct FrameOrchestrator {
    state: RenderState,
    start_point: Option<RenderPoint>,
    end_point: Option<RenderPoint>,
    frame_index: u32,
    total_frames: u32,
    frame_rate: f32,
    duration: f32,
    simulated_time: f32,
    output_dir: PathBuf,
}

impl FrameOrchestrator {
    pub fn new() -> Self {
        Self {
            state: RenderState::RealTime,
            start_point: None,
            end_point: None,
            frame_index: 0,
            total_frames: 1,
            frame_rate: 24.0,
            duration: 0.0,
            simulated_time: 0.0,
            output_dir: PathBuf::new(),
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.state == RenderState::Capturing
    }

    /// Unconditional session reset. Clears both marks and all counters, then
    /// lands in `AwaitingMarks` or `RealTime` depending on the capture flag.
    /// The output directory is created up front; a destination that cannot be
    /// created is fatal for the session.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), SimError> {
        self.start_point = None;
        self.end_point = None;
        self.frame_index = 0;
        self.simulated_time = 0.0;
        self.total_frames = settings.total_video_frames();
        self.frame_rate = settings.capture_frame_rate();
        self.duration = settings.video_duration;
        self.output_dir = PathBuf::from(&settings.video_render_directory);

        if settings.video_render_mode {
            fs::create_dir_all(&self.output_dir).map_err(|source| SimError::RenderDirectory {
                path: self.output_dir.clone(),
                source,
            })?;
            self.state = RenderState::AwaitingMarks;
            log::info!(
                "capture session armed: {} frames into {}",
                self.total_frames,
                self.output_dir.display()
            );
        } else {
            self.state = RenderState::RealTime;
        }
        Ok(())
    }

    /// Stores a keyframe. The `AwaitingMarks -> Capturing` transition fires
    /// once, when both slots become set; re-marking later replaces the stored
    /// point but never changes state.
    pub fn mark(&mut self, slot: MarkSlot, point: RenderPoint) {
        match slot {
            MarkSlot::Start => self.start_point = Some(point),
            MarkSlot::End => self.end_point = Some(point),
        }

        if self.state == RenderState::AwaitingMarks
            && self.start_point.is_some()
            && self.end_point.is_some()
        {
            self.state = RenderState::Capturing;
            log::info!("both keyframes set, starting frame generation");
        }
    }

    /// Decides the work for this tick. While capturing this advances the
    /// simulated clock by exactly one frame step; the camera pose comes from
    /// interpolating the keyframes at t = (i+1)/n so the final frame lands
    /// exactly on the end keyframe.
    pub fn begin_frame(&mut self) -> TickPlan {
        if self.state != RenderState::Capturing {
            return TickPlan::Live;
        }

        // Guarded by the mark transition, so both points exist here.
        let (Some(start), Some(end)) = (self.start_point, self.end_point) else {
            return TickPlan::Live;
        };

        // One fixed step per frame, derived from the index so re-planning the
        // same frame (for example after a lost surface) cannot drift the clock.
        self.simulated_time = (self.frame_index + 1) as f32 / self.frame_rate;

        let t = (self.frame_index + 1) as f32 / self.total_frames as f32;
        TickPlan::Capture {
            point: RenderPoint::lerp(start, end, t),
            simulated_time: self.simulated_time,
            frame_index: self.frame_index,
            path: self.frame_path(self.frame_index),
        }
    }

    /// Called after the frame file for the current index has been written.
    pub fn frame_written(&mut self) {
        self.frame_index += 1;
        if self.state == RenderState::Capturing && self.frame_index >= self.total_frames {
            self.state = RenderState::Complete;
            log::info!(
                "capture complete, {} frames in {}",
                self.total_frames,
                self.output_dir.display()
            );
        }
    }

    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.output_dir.join(format!("frame_{index:05}.png"))
    }

    /// Overlay shown instead of the regular menu while capture mode is
    /// active. Returns `None` in `RealTime` so the menu takes over.
    pub fn overlay_lines(&self) -> Option<Vec<String>> {
        match self.state {
            RenderState::RealTime => None,

            RenderState::AwaitingMarks => Some(vec![
                "RENDERING MODE - WAITING FOR USER INPUT".to_string(),
                String::new(),
                "If you want to exit RENDER MODE, press [O] and set 'video_render_mode' to false"
                    .to_string(),
                "and then press [Enter] to apply the updated settings.".to_string(),
                String::new(),
                format!("START POINT SET: {}", self.start_point.is_some()),
                format!("END POINT SET: {}", self.end_point.is_some()),
                String::new(),
                "RENDERING WILL START AUTOMATICALLY ONCE BOTH POINTS ARE SET".to_string(),
                String::new(),
                "Press [1] to select current camera coordinates as START POINT".to_string(),
                "Press [2] to select current camera coordinates as END POINT".to_string(),
            ]),

            RenderState::Capturing => Some(vec![
                "RENDERING MODE - GENERATING IMAGES".to_string(),
                String::new(),
                format!("WRITING TO: {}", self.output_dir.display()),
                format!("FRAME: {} / {}", self.frame_index + 1, self.total_frames),
                format!("RENDER TIME: {:.2} / {:.2}", self.simulated_time, self.duration),
            ]),

            RenderState::Complete => Some(vec![
                "RENDERING MODE - RENDER COMPLETE".to_string(),
                String::new(),
                "All frames have been generated and stored successfully.".to_string(),
                String::new(),
                "You can close the app now, and review the results in:".to_string(),
                format!("{}", self.output_dir.display()),
                String::new(),
                format!("To return to real time, disable 'video_render_mode' in {SETTINGS_FILE}"),
                "and press [Enter].".to_string(),
            ]),
        }
    }
}
