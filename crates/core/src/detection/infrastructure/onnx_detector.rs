/// YOLO-family object detector using ONNX Runtime via `ort`.
///
/// Consumes frames already resized to the model input resolution; the
/// pipeline owns resizing and coordinate rescaling, so boxes are returned
/// in the submitted frame's own coordinate space untouched.
use std::path::Path;

use crate::detection::domain::detection::RawDetection;
use crate::detection::domain::detector::Detector;
use crate::shared::frame::Frame;

use super::math::nms;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Candidate floor applied before NMS. The pipeline applies the real
/// confidence threshold; this only trims the thousands of near-zero
/// anchors a YOLO head emits.
const MIN_CANDIDATE_CONFIDENCE: f64 = 0.10;

const UNKNOWN_LABEL: &str = "unknown";

/// Object detector backed by an ONNX Runtime session and a fixed label table.
pub struct OnnxDetector {
    session: ort::session::Session,
    labels: &'static [&'static str],
}

impl OnnxDetector {
    /// Load a YOLO ONNX model with the COCO-80 label table.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_labels(model_path, COCO_LABELS)
    }

    pub fn with_labels(
        model_path: &Path,
        labels: &'static [&'static str],
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session, labels })
    }
}

impl Detector for OnnxDetector {
    fn infer(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
        let input_tensor = tensor_from_frame(frame);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("detection model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();

        // YOLO output is [1, num_features, num_detections] (transposed) or
        // [1, num_detections, num_features]. Handle both.
        let (num_dets, num_feats, transposed) = if shape.len() == 3 {
            if shape[1] < shape[2] {
                (shape[2], shape[1], true)
            } else {
                (shape[1], shape[2], false)
            }
        } else {
            return Err(format!("unexpected detection output shape: {shape:?}").into());
        };

        let data = tensor.as_slice().ok_or("cannot get tensor slice")?;
        let candidates = parse_output(
            data,
            num_dets,
            num_feats,
            transposed,
            MIN_CANDIDATE_CONFIDENCE,
        );

        Ok(nms(candidates, NMS_IOU_THRESH))
    }

    fn label(&self, class_id: usize) -> &str {
        self.labels.get(class_id).copied().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Convert an RGB frame into a normalized NCHW float32 tensor.
fn tensor_from_frame(frame: &Frame) -> ndarray::Array4<f32> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let channels = frame.channels() as usize;
    let data = frame.data();

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, height, width));
    for y in 0..height {
        for x in 0..width {
            let offset = (y * width + x) * channels;
            for c in 0..3 {
                tensor[[0, c, y, x]] = data[offset + c] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Parse a YOLO detection head into raw detections.
///
/// Row format: `[cx, cy, w, h, class_0 .. class_n]`; the class with the
/// highest score wins. Rows below `floor` are dropped before NMS.
fn parse_output(
    data: &[f32],
    num_dets: usize,
    num_feats: usize,
    transposed: bool,
    floor: f64,
) -> Vec<RawDetection> {
    let mut candidates = Vec::new();

    for i in 0..num_dets {
        let at = |f: usize| -> f64 {
            if transposed {
                data[f * num_dets + i] as f64
            } else {
                data[i * num_feats + f] as f64
            }
        };

        if num_feats < 5 {
            continue;
        }

        let mut class_id = 0usize;
        let mut best = f64::MIN;
        for f in 4..num_feats {
            let score = at(f);
            if score > best {
                best = score;
                class_id = f - 4;
            }
        }

        if best < floor {
            continue;
        }

        let cx = at(0);
        let cy = at(1);
        let w = at(2);
        let h = at(3);

        candidates.push(RawDetection {
            class_id,
            confidence: best,
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        });
    }

    candidates
}

/// COCO class names indexed by YOLO class id.
pub const COCO_LABELS: &[&str] = &[
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];
