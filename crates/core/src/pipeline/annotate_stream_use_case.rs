use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::domain::frame_source::FrameSource;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::infrastructure::capture_loop::spawn_capture;
use crate::pipeline::infrastructure::presentation_loop::run_presentation;
use crate::pipeline::pipeline_observer::PipelineObserver;
use crate::presentation::domain::renderer::Renderer;
use crate::shared::frame_slot::FrameSlot;

/// Counters reported after a watch run completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub cycles: u64,
    pub frames_rendered: u64,
    pub detections_total: u64,
}

/// Orchestrates a live annotation run.
///
/// Layout: `capture thread → frame slot → presentation loop`
///
/// Capture runs in the background at device pace; the foreground loop
/// always processes the latest complete frame and never queues. Shutdown
/// is ordered: raise the cancellation flag, join the capture thread so
/// the device handle is released, then hand control back to the caller
/// (who still owns the renderer).
pub struct AnnotateStreamUseCase;

impl AnnotateStreamUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        source: Box<dyn FrameSource>,
        mut processor: FrameProcessor,
        renderer: &mut dyn Renderer,
        observer: &mut dyn PipelineObserver,
        cancelled: Arc<AtomicBool>,
        max_cycles: Option<u64>,
    ) -> Result<PipelineSummary, Box<dyn std::error::Error>> {
        let slot = Arc::new(FrameSlot::new());
        let capture = spawn_capture(source, slot.clone(), cancelled.clone());

        let stats = run_presentation(
            &mut processor,
            renderer,
            &slot,
            &cancelled,
            observer,
            max_cycles,
        );

        cancelled.store(true, Ordering::Relaxed);
        let source = capture
            .join()
            .map_err(|_| "Capture thread panicked")?;
        drop(source);

        observer.summary();

        Ok(PipelineSummary {
            cycles: stats.cycles,
            frames_rendered: stats.frames_rendered,
            detections_total: stats.detections_total,
        })
    }
}

impl Default for AnnotateStreamUseCase {
    fn default() -> Self {
        Self::new()
    }
}
