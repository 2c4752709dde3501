/// One detector result in the coordinate space of the image that was
/// submitted for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A detection mapped back into source-frame coordinates, with the class
/// label resolved and the confidence expressed as a percentage.
///
/// Invariants: `x1 <= x2`, `y1 <= y2`, all corners within
/// `[0, width-1] x [0, height-1]` of the source frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledDetection {
    pub label: String,
    pub confidence_percent: f64,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl ScaledDetection {
    /// Rescale a raw detection from detector-input space back into the
    /// source frame: multiply by the per-axis scale factors, round, clamp,
    /// and normalize corner order.
    pub fn from_raw(
        raw: &RawDetection,
        label: &str,
        scale_x: f64,
        scale_y: f64,
        source_width: u32,
        source_height: u32,
    ) -> Self {
        let clamp_x = |v: f64| -> i32 {
            (v.round() as i64).clamp(0, source_width as i64 - 1) as i32
        };
        let clamp_y = |v: f64| -> i32 {
            (v.round() as i64).clamp(0, source_height as i64 - 1) as i32
        };

        let mut x1 = clamp_x(raw.x1 * scale_x);
        let mut x2 = clamp_x(raw.x2 * scale_x);
        let mut y1 = clamp_y(raw.y1 * scale_y);
        let mut y2 = clamp_y(raw.y2 * scale_y);

        if x1 > x2 {
            std::mem::swap(&mut x1, &mut x2);
        }
        if y1 > y2 {
            std::mem::swap(&mut y1, &mut y2);
        }

        Self {
            label: label.to_string(),
            confidence_percent: raw.confidence * 100.0,
            x1,
            y1,
            x2,
            y2,
        }
    }
}
