pub const DETECTION_MODEL_NAME: &str = "yolo11n.onnx";
pub const DETECTION_MODEL_URL: &str =
    "https://github.com/neutrinographics/framewatch/releases/download/v0.1.0/yolo11n.onnx";

/// Detector input resolution the frame is stretched to before inference.
pub const DEFAULT_MODEL_INPUT: (u32, u32) = (640, 480);

/// Detections below this confidence (in percent) are discarded.
pub const DEFAULT_CONFIDENCE_PERCENT: f64 = 50.0;

/// Run detection every Nth presentation cycle.
pub const DEFAULT_SKIP_INTERVAL: u64 = 2;

/// Presentation loop back-off while no frame has been published yet.
pub const IDLE_POLL_MILLIS: u64 = 2;
