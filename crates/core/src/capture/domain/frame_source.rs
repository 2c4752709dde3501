use crate::shared::frame::Frame;

/// Produces frames from a capture device or stream, one per call.
///
/// Any error is terminal for the pipeline: end-of-stream and device
/// failure are deliberately not distinguished, because neither can be
/// recovered from within the capture loop. Implementations open their
/// device in the constructor so `read` only ever pulls.
pub trait FrameSource: Send {
    fn read(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;
}
