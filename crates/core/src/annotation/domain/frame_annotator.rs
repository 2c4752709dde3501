use crate::detection::domain::detection::ScaledDetection;
use crate::shared::frame::Frame;

/// Domain interface for drawing detections onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid
/// allocation; the pipeline only ever hands them the presentation copy,
/// never the published original.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        detections: &[ScaledDetection],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
