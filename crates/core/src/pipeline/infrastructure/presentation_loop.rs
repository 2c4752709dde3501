use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::pipeline_observer::PipelineObserver;
use crate::presentation::domain::renderer::{Key, Renderer};
use crate::shared::constants::IDLE_POLL_MILLIS;
use crate::shared::frame_slot::FrameSlot;

/// Counters accumulated by one presentation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub frames_rendered: u64,
    pub detections_total: u64,
}

/// Run the foreground loop: snapshot the latest frame, process it, show
/// the result, poll for a cancel key.
///
/// Returns once `cancelled` is observed (raised by the capture side, a key
/// press, or an external signal) or the optional cycle budget runs out.
/// Cycles before the first published frame back off briefly and still
/// count toward the budget. A processing failure is cycle-local: the raw
/// frame is shown and the loop moves on.
pub fn run_presentation(
    processor: &mut FrameProcessor,
    renderer: &mut dyn Renderer,
    slot: &FrameSlot,
    cancelled: &AtomicBool,
    observer: &mut dyn PipelineObserver,
    max_cycles: Option<u64>,
) -> LoopStats {
    let mut stats = LoopStats::default();

    loop {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }
        if let Some(max) = max_cycles {
            if stats.cycles >= max {
                break;
            }
        }

        let cycle = stats.cycles;
        stats.cycles += 1;

        if let Some(Key::Escape) = renderer.poll_key() {
            observer.info("Cancellation requested");
            cancelled.store(true, Ordering::Relaxed);
            break;
        }

        let Some(frame) = slot.snapshot() else {
            std::thread::sleep(Duration::from_millis(IDLE_POLL_MILLIS));
            continue;
        };

        let started = Instant::now();
        match processor.process(&frame, cycle) {
            Ok(outcome) => {
                observer.timing("process", started.elapsed().as_secs_f64() * 1000.0);
                observer.cycle(cycle, outcome.ran, outcome.detections);
                stats.detections_total += outcome.detections as u64;

                if let Err(e) = renderer.show(&outcome.frame) {
                    log::warn!("Renderer failed on cycle {cycle}: {e}");
                } else {
                    stats.frames_rendered += 1;
                }
            }
            Err(e) => {
                log::warn!("Processing failed on cycle {cycle}, showing raw frame: {e}");
                observer.cycle(cycle, false, 0);
                if renderer.show(&frame).is_ok() {
                    stats.frames_rendered += 1;
                }
            }
        }
    }

    stats
}
