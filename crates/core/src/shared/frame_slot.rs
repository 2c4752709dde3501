use std::sync::{Arc, Mutex};

use crate::shared::frame::Frame;

/// Single-slot, latest-wins exchange between the capture thread and the
/// presentation loop.
///
/// This is the one mandatory synchronization point in the pipeline: a
/// publish replaces the stored frame atomically, a snapshot hands out a
/// cheap `Arc` handle to whatever complete frame is current. There is no
/// queue and no back-pressure; a slow reader simply skips frames.
pub struct FrameSlot {
    current: Mutex<Option<Arc<Frame>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Replace the stored frame. The previous frame's ownership is released
    /// here (or when the last outstanding snapshot handle drops).
    ///
    /// Never waits on a reader beyond the slot's own critical section.
    pub fn publish(&self, frame: Frame) {
        let mut slot = self.current.lock().expect("frame slot poisoned");
        *slot = Some(Arc::new(frame));
    }

    /// Handle to the most recently published frame, or `None` before the
    /// first publish. A returned frame is always complete; readers can
    /// never observe a partially written buffer.
    pub fn snapshot(&self) -> Option<Arc<Frame>> {
        self.current.lock().expect("frame slot poisoned").clone()
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}
