use crate::detection::domain::detection::RawDetection;
use crate::shared::frame::Frame;

/// Domain interface for object detection.
///
/// `infer` receives a frame already resized to the model's input
/// resolution; returned boxes are in that frame's own coordinate space.
/// Implementations may hold session state, hence `&mut self`.
pub trait Detector: Send {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>>;

    /// Resolve a class id against the label table fixed at construction.
    /// Unknown ids resolve to `"unknown"`.
    fn label(&self, class_id: usize) -> &str;
}
