use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame_slot::FrameSlot;

/// Spawn the background capture thread: read frames as fast as the source
/// yields them and publish each into the shared slot.
///
/// Never blocks on the presentation side; an unread frame is simply
/// replaced. On any read error the thread logs it, raises the shared
/// cancellation flag so the presentation loop winds down too, and exits.
/// The source is returned through the join handle so the caller controls
/// when the device handle is released.
pub fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    slot: Arc<FrameSlot>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<Box<dyn FrameSource>> {
    std::thread::spawn(move || {
        loop {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            match source.read() {
                Ok(frame) => slot.publish(frame),
                Err(e) => {
                    log::error!("Capture stopped: {e}");
                    cancelled.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }
        source
    })
}
