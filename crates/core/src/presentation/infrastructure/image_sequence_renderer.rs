use std::path::PathBuf;

use crate::presentation::domain::renderer::{Key, Renderer};
use crate::shared::frame::Frame;

/// Renderer writing each shown frame as a numbered PNG via the `image`
/// crate.
///
/// Stands in for an on-screen window in headless environments; frames can
/// be inspected afterwards or assembled into a clip. Never reports keys —
/// cancellation comes from elsewhere (Ctrl-C, frame budget).
pub struct ImageSequenceRenderer {
    output_dir: PathBuf,
    frames_written: u64,
}

impl ImageSequenceRenderer {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Renderer for ImageSequenceRenderer {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self
            .output_dir
            .join(format!("frame-{:06}.png", self.frames_written));

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("failed to create image from frame data")?;
        img.save(&path)?;

        self.frames_written += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> Option<Key> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fill: u8) -> Frame {
        Frame::new(vec![fill; 8 * 4 * 3], 8, 4, 3, 0)
    }

    #[test]
    fn test_show_writes_numbered_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = ImageSequenceRenderer::new(dir.path().to_path_buf());

        renderer.show(&frame(10)).unwrap();
        renderer.show(&frame(20)).unwrap();

        assert!(dir.path().join("frame-000000.png").exists());
        assert!(dir.path().join("frame-000001.png").exists());
        assert_eq!(renderer.frames_written(), 2);
    }

    #[test]
    fn test_written_frame_roundtrips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = ImageSequenceRenderer::new(dir.path().to_path_buf());
        renderer.show(&frame(77)).unwrap();

        let img = image::open(dir.path().join("frame-000000.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 4);
        assert_eq!(img.get_pixel(0, 0).0, [77, 77, 77]);
    }

    #[test]
    fn test_show_into_unwritable_dir_errors() {
        let mut renderer = ImageSequenceRenderer::new(PathBuf::from("/proc/no-such-dir/frames"));
        assert!(renderer.show(&frame(1)).is_err());
    }

    #[test]
    fn test_never_reports_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut renderer = ImageSequenceRenderer::new(dir.path().to_path_buf());
        assert_eq!(renderer.poll_key(), None);
    }
}
