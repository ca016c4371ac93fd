use crate::error::SimError;
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::Path;

/// Destination for captured frames. The orchestrator only ever asks for one
/// write at a time; frame `i` is fully persisted before frame `i + 1` starts.
pub trait FrameSink {
    fn save_png(
        &mut self,
        frame: &RgbaImage,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SimError>;
}

/// Writes frames as PNG files, downscaling when the stored size differs from
/// the render size.
pub struct PngSink;

impl FrameSink for PngSink {
    fn save_png(
        &mut self,
        frame: &RgbaImage,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SimError> {
        let result = if frame.width() == width && frame.height() == height {
            frame.save(path)
        } else {
            image::imageops::resize(frame, width, height, FilterType::Triangle).save(path)
        };

        result.map_err(|source| SimError::FrameWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
