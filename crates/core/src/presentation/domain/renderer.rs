use crate::shared::frame::Frame;

/// Key events a renderer may report back to the presentation loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Requests pipeline cancellation.
    Escape,
    Other(u32),
}

/// Presentation-side collaborator: shows frames and reports key presses.
///
/// The loop calls `show` and `poll_key` once per cycle; any pacing
/// (vsync, wait-for-key timeouts) lives behind this seam.
pub trait Renderer: Send {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    fn poll_key(&mut self) -> Option<Key>;
}

/// Renderer that discards every frame.
///
/// Used headless and in tests where display output is irrelevant.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn show(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }

    fn poll_key(&mut self) -> Option<Key> {
        None
    }
}
