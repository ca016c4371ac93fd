use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not create render directory {}: {source}", path.display())]
    RenderDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write frame {}: {source}", path.display())]
    FrameWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("capture readback failed: {0}")]
    Readback(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("create surface error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
}

impl SimError {
    /// Lost, outdated and timed-out surfaces come back on a later frame;
    /// everything else ends the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SimError::Surface(
                wgpu::SurfaceError::Lost
                    | wgpu::SurfaceError::Outdated
                    | wgpu::SurfaceError::Timeout
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_surface_losses_are_transient() {
        assert!(SimError::Surface(wgpu::SurfaceError::Lost).is_transient());
        assert!(SimError::Surface(wgpu::SurfaceError::Outdated).is_transient());
        assert!(SimError::Surface(wgpu::SurfaceError::Timeout).is_transient());

        assert!(!SimError::Surface(wgpu::SurfaceError::OutOfMemory).is_transient());
        assert!(!SimError::Readback("mapping failed".to_string()).is_transient());
        assert!(!SimError::FrameWrite {
            path: PathBuf::from("frame_00000.png"),
            source: image::ImageError::IoError(std::io::Error::other("disk full")),
        }
        .is_transient());
    }
}
