use std::collections::HashSet;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection::ScaledDetection;
use crate::detection::domain::detector::Detector;
use crate::pipeline::config::{ConfigError, PipelineConfig};
use crate::shared::frame::Frame;

/// Result of processing one frame through the detect/annotate stage.
pub struct ProcessOutcome {
    /// The frame to present: annotated when detection ran, an untouched
    /// copy when the cycle was skipped.
    pub frame: Frame,
    /// Whether detection actually ran this cycle (the frame-skip gate lets
    /// only every Nth cycle through).
    pub ran: bool,
    /// Number of detections that survived the confidence threshold and
    /// label filter. Always 0 when `ran` is false.
    pub detections: usize,
}

/// Per-cycle detect/annotate stage of the pipeline.
///
/// Owns the detector and annotator, the frame-skip gate, and the coordinate
/// mapping between the source frame and the detector's input resolution.
/// The input frame is never mutated; annotations land on a copy.
pub struct FrameProcessor {
    detector: Box<dyn Detector>,
    annotator: Box<dyn FrameAnnotator>,
    model_input: (u32, u32),
    confidence_percent: f64,
    skip_interval: u64,
    label_filter: Option<HashSet<String>>,
}

impl FrameProcessor {
    pub fn new(
        detector: Box<dyn Detector>,
        annotator: Box<dyn FrameAnnotator>,
        config: &PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector,
            annotator,
            model_input: config.model_input,
            confidence_percent: config.confidence_percent,
            skip_interval: config.skip_interval,
            label_filter: config.label_filter.clone(),
        })
    }

    /// Run one cycle: gate on the skip interval, stretch-resize to the
    /// model input, infer, rescale surviving boxes into source coordinates,
    /// and annotate a copy of the frame.
    pub fn process(
        &mut self,
        frame: &Frame,
        cycle: u64,
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error>> {
        if cycle % self.skip_interval != 0 {
            return Ok(ProcessOutcome {
                frame: frame.clone(),
                ran: false,
                detections: 0,
            });
        }

        let (model_w, model_h) = self.model_input;
        let resized = stretch_resize(frame, model_w, model_h)?;
        let raw = self.detector.infer(&resized)?;

        // Boxes come back in model-input space; map them to the source
        // frame with independent per-axis factors (the resize does not
        // preserve aspect ratio, so neither does the mapping back).
        let scale_x = frame.width() as f64 / model_w as f64;
        let scale_y = frame.height() as f64 / model_h as f64;

        let mut survivors: Vec<ScaledDetection> = Vec::new();
        for detection in &raw {
            if detection.confidence * 100.0 < self.confidence_percent {
                continue;
            }
            let label = self.detector.label(detection.class_id);
            if let Some(ref filter) = self.label_filter {
                if !filter.contains(label) {
                    continue;
                }
            }
            survivors.push(ScaledDetection::from_raw(
                detection,
                label,
                scale_x,
                scale_y,
                frame.width(),
                frame.height(),
            ));
        }

        let mut annotated = frame.clone();
        self.annotator.annotate(&mut annotated, &survivors)?;

        Ok(ProcessOutcome {
            frame: annotated,
            ran: true,
            detections: survivors.len(),
        })
    }
}

/// Resize a frame to exactly `width` x `height`, stretching as needed.
fn stretch_resize(
    frame: &Frame,
    width: u32,
    height: u32,
) -> Result<Frame, Box<dyn std::error::Error>> {
    if frame.width() == width && frame.height() == height {
        return Ok(frame.clone());
    }

    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Frame buffer does not match its dimensions")?;
    let resized = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);

    Ok(Frame::new(
        resized.into_raw(),
        width,
        height,
        3,
        frame.index(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::detection::domain::detection::RawDetection;

    struct FakeDetector {
        detections: Vec<RawDetection>,
        labels: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
        seen_dims: Arc<Mutex<Vec<(u32, u32)>>>,
    }

    impl FakeDetector {
        fn new(detections: Vec<RawDetection>) -> Self {
            Self {
                detections,
                labels: vec!["person", "bicycle", "car"],
                calls: Arc::new(AtomicUsize::new(0)),
                seen_dims: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Detector for FakeDetector {
        fn infer(
            &mut self,
            frame: &Frame,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_dims
                .lock()
                .unwrap()
                .push((frame.width(), frame.height()));
            Ok(self.detections.clone())
        }

        fn label(&self, class_id: usize) -> &str {
            self.labels.get(class_id).copied().unwrap_or("unknown")
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn infer(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            Err("inference backend unavailable".into())
        }

        fn label(&self, _class_id: usize) -> &str {
            "unknown"
        }
    }

    struct RecordingAnnotator {
        seen: Arc<Mutex<Vec<Vec<ScaledDetection>>>>,
    }

    impl FrameAnnotator for RecordingAnnotator {
        fn annotate(
            &self,
            _frame: &mut Frame,
            detections: &[ScaledDetection],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(detections.to_vec());
            Ok(())
        }
    }

    fn raw(class_id: usize, confidence: f64) -> RawDetection {
        RawDetection {
            class_id,
            confidence,
            x1: 10.0,
            y1: 10.0,
            x2: 20.0,
            y2: 20.0,
        }
    }

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![50; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn config(skip_interval: u64) -> PipelineConfig {
        PipelineConfig {
            model_input: (4, 3),
            confidence_percent: 50.0,
            skip_interval,
            label_filter: None,
            max_cycles: None,
        }
    }

    fn recording() -> (Box<RecordingAnnotator>, Arc<Mutex<Vec<Vec<ScaledDetection>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(RecordingAnnotator { seen: seen.clone() }),
            seen,
        )
    }

    #[test]
    fn test_skip_gate_runs_detection_on_every_nth_cycle() {
        let detector = FakeDetector::new(vec![]);
        let calls = detector.calls.clone();
        let (annotator, _) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(detector), annotator, &config(2)).unwrap();

        let input = frame(4, 3);
        for cycle in 0..4 {
            let outcome = processor.process(&input, cycle).unwrap();
            assert_eq!(outcome.ran, cycle % 2 == 0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_skipped_cycle_returns_untouched_copy() {
        let detector = FakeDetector::new(vec![raw(0, 0.9)]);
        let (annotator, seen) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(detector), annotator, &config(2)).unwrap();

        let input = frame(4, 3);
        let outcome = processor.process(&input, 1).unwrap();

        assert!(!outcome.ran);
        assert_eq!(outcome.detections, 0);
        assert_eq!(outcome.frame, input);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_confidence_threshold_rejects_strictly_below() {
        // 30% is out, exactly 50% is kept, 75% is kept.
        let detector = FakeDetector::new(vec![raw(0, 0.30), raw(0, 0.50), raw(0, 0.75)]);
        let (annotator, seen) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(detector), annotator, &config(1)).unwrap();

        let outcome = processor.process(&frame(4, 3), 0).unwrap();

        assert_eq!(outcome.detections, 2);
        let recorded = seen.lock().unwrap();
        assert_eq!(recorded[0].len(), 2);
        assert!((recorded[0][0].confidence_percent - 50.0).abs() < 1e-9);
        assert!((recorded[0][1].confidence_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_label_filter_keeps_only_named_classes() {
        let detector = FakeDetector::new(vec![raw(0, 0.9), raw(1, 0.9), raw(2, 0.9)]);
        let (annotator, seen) = recording();
        let mut cfg = config(1);
        cfg.label_filter = Some(HashSet::from(["person".to_string(), "car".to_string()]));
        let mut processor = FrameProcessor::new(Box::new(detector), annotator, &cfg).unwrap();

        let outcome = processor.process(&frame(4, 3), 0).unwrap();

        assert_eq!(outcome.detections, 2);
        let recorded = seen.lock().unwrap();
        let labels: Vec<_> = recorded[0].iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["person", "car"]);
    }

    #[test]
    fn test_frame_is_stretched_to_model_input() {
        let detector = FakeDetector::new(vec![]);
        let seen_dims = detector.seen_dims.clone();
        let (annotator, _) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(detector), annotator, &config(1)).unwrap();

        // 8x6 source against a 4x3 model input: stretch by 0.5 on each axis.
        processor.process(&frame(8, 6), 0).unwrap();

        assert_eq!(seen_dims.lock().unwrap()[0], (4, 3));
    }

    #[test]
    fn test_boxes_rescaled_into_source_coordinates() {
        let detector = FakeDetector::new(vec![RawDetection {
            class_id: 0,
            confidence: 0.9,
            x1: 1.0,
            y1: 1.0,
            x2: 2.0,
            y2: 2.0,
        }]);
        let (annotator, seen) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(detector), annotator, &config(1)).unwrap();

        // Source 8x6, model 4x3: scale factor 2.0 on both axes.
        processor.process(&frame(8, 6), 0).unwrap();

        let recorded = seen.lock().unwrap();
        let d = &recorded[0][0];
        assert_eq!((d.x1, d.y1, d.x2, d.y2), (2, 2, 4, 4));
    }

    #[test]
    fn test_no_detections_yields_identical_frame() {
        let detector = FakeDetector::new(vec![]);
        let annotator = Box::new(crate::annotation::infrastructure::box_annotator::BoxAnnotator::default());
        let mut processor = FrameProcessor::new(Box::new(detector), annotator, &config(1)).unwrap();

        let input = frame(4, 3);
        let outcome = processor.process(&input, 0).unwrap();

        assert!(outcome.ran);
        assert_eq!(outcome.detections, 0);
        assert_eq!(outcome.frame.data(), input.data());
    }

    #[test]
    fn test_detector_error_propagates() {
        let (annotator, _) = recording();
        let mut processor =
            FrameProcessor::new(Box::new(FailingDetector), annotator, &config(1)).unwrap();

        assert!(processor.process(&frame(4, 3), 0).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let detector = FakeDetector::new(vec![]);
        let (annotator, _) = recording();
        let result = FrameProcessor::new(Box::new(detector), annotator, &config(0));
        assert_eq!(result.err(), Some(ConfigError::SkipIntervalZero));
    }

    #[test]
    fn test_matching_dimensions_skip_the_resize() {
        let input = frame(4, 3);
        let resized = stretch_resize(&input, 4, 3).unwrap();
        assert_eq!(resized, input);
    }

    #[test]
    fn test_stretch_resize_changes_dimensions_only() {
        let input = frame(8, 6);
        let resized = stretch_resize(&input, 4, 3).unwrap();
        assert_eq!(resized.width(), 4);
        assert_eq!(resized.height(), 3);
        assert_eq!(resized.index(), input.index());
        // Uniform input stays uniform through interpolation.
        assert!(resized.data().iter().all(|&b| b == 50));
    }
}
