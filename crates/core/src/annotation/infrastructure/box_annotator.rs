use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection::ScaledDetection;
use crate::shared::frame::Frame;

/// Rectangle outline thickness in pixels.
const BOX_THICKNESS: i32 = 3;

/// Label anchor offset from the box top-left corner, pointing outward so
/// the tag clears the outline.
const LABEL_OFFSET_X: i32 = 8;
const LABEL_OFFSET_Y: i32 = -12;

/// Glyph cell advance (5-px glyph + 1-px spacing) and glyph height.
const GLYPH_ADVANCE: i32 = 6;
const GLYPH_HEIGHT: i32 = 7;

/// CPU annotator drawing box outlines and label tags straight into the
/// frame's RGB bytes with a built-in 5x7 bitmap font.
pub struct BoxAnnotator {
    box_color: [u8; 3],
    text_color: [u8; 3],
    tag_color: [u8; 3],
}

impl BoxAnnotator {
    pub fn new(box_color: [u8; 3], text_color: [u8; 3], tag_color: [u8; 3]) -> Self {
        Self {
            box_color,
            text_color,
            tag_color,
        }
    }

    fn draw_label(&self, frame: &mut Frame, detection: &ScaledDetection) {
        let text = format!(
            "{} | {:.2}% confident.",
            detection.label, detection.confidence_percent
        );

        let x = (detection.x1 + LABEL_OFFSET_X).max(0);
        let y = (detection.y1 + LABEL_OFFSET_Y).max(0);
        let text_width = text.chars().count() as i32 * GLYPH_ADVANCE;

        fill_rect(
            frame,
            x - 2,
            y - 2,
            x + text_width + 1,
            y + GLYPH_HEIGHT + 1,
            self.tag_color,
        );
        draw_text(frame, x, y, &text, self.text_color);
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        // Red outline, white text on a dark tag.
        Self::new([255, 50, 50], [255, 255, 255], [32, 32, 32])
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        detections: &[ScaledDetection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Outlines first, labels second, so a tag is never cut by a
        // neighboring detection's outline.
        for det in detections {
            draw_outline(
                frame,
                det.x1,
                det.y1,
                det.x2,
                det.y2,
                BOX_THICKNESS,
                self.box_color,
            );
        }
        for det in detections {
            self.draw_label(frame, det);
        }
        Ok(())
    }
}

fn put_pixel(frame: &mut Frame, x: i32, y: i32, color: [u8; 3]) {
    if x < 0 || y < 0 || x >= frame.width() as i32 || y >= frame.height() as i32 {
        return;
    }
    let channels = frame.channels() as usize;
    let offset = (y as usize * frame.width() as usize + x as usize) * channels;
    let data = frame.data_mut();
    data[offset] = color[0];
    data[offset + 1] = color[1];
    data[offset + 2] = color[2];
}

/// Rectangle outline; each border ring grows inward so the box footprint
/// stays within the given corners.
fn draw_outline(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: [u8; 3]) {
    for ring in 0..thickness {
        let left = x1 + ring;
        let top = y1 + ring;
        let right = x2 - ring;
        let bottom = y2 - ring;
        if left > right || top > bottom {
            break;
        }
        for x in left..=right {
            put_pixel(frame, x, top, color);
            put_pixel(frame, x, bottom, color);
        }
        for y in top..=bottom {
            put_pixel(frame, left, y, color);
            put_pixel(frame, right, y, color);
        }
    }
}

fn fill_rect(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, color: [u8; 3]) {
    for y in y1.max(0)..=y2.min(frame.height() as i32 - 1) {
        for x in x1.max(0)..=x2.min(frame.width() as i32 - 1) {
            put_pixel(frame, x, y, color);
        }
    }
}

fn draw_text(frame: &mut Frame, mut x: i32, y: i32, text: &str, color: [u8; 3]) {
    for ch in text.chars().flat_map(|c| c.to_uppercase()) {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..5 {
                    if (pattern >> (4 - col)) & 1 == 1 {
                        put_pixel(frame, x + col, y + row as i32, color);
                    }
                }
            }
        }
        x += GLYPH_ADVANCE;
    }
}

/// 5x7 bitmap glyphs, one row per byte, high bit left.
fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    match ch {
        'A' => Some([0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'B' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
        'C' => Some([0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
        'D' => Some([0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
        'E' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111]),
        'F' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000]),
        'G' => Some([0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => Some([0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'I' => Some([0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        'J' => Some([0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'K' => Some([0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
        'L' => Some([0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
        'M' => Some([0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
        'N' => Some([0b10001, 0b11001, 0b10101, 0b10101, 0b10011, 0b10001, 0b10001]),
        'O' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'P' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'Q' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
        'R' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
        'S' => Some([0b01111, 0b10000, 0b01110, 0b00001, 0b00001, 0b10001, 0b01110]),
        'T' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'U' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'V' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'W' => Some([0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
        'X' => Some([0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
        'Y' => Some([0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
        'Z' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        '0' => Some([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => Some([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => Some([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => Some([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => Some([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        '%' => Some([0b10001, 0b10010, 0b00100, 0b01000, 0b10010, 0b10001, 0b00000]),
        '|' => Some([0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        '-' => Some([0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
        '.' => Some([0, 0, 0, 0, 0, 0b00110, 0b00110]),
        ' ' => Some([0, 0, 0, 0, 0, 0, 0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let offset = ((y * frame.width() + x) * 3) as usize;
        let d = frame.data();
        [d[offset], d[offset + 1], d[offset + 2]]
    }

    fn detection(x1: i32, y1: i32, x2: i32, y2: i32) -> ScaledDetection {
        ScaledDetection {
            label: "person".to_string(),
            confidence_percent: 87.5,
            x1,
            y1,
            x2,
            y2,
        }
    }

    #[test]
    fn test_annotate_empty_leaves_frame_untouched() {
        let mut frame = blank_frame(32, 32);
        let original = frame.clone();
        BoxAnnotator::default().annotate(&mut frame, &[]).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_outline_drawn_at_box_edges() {
        let mut frame = blank_frame(64, 64);
        let annotator = BoxAnnotator::new([255, 0, 0], [255, 255, 255], [0, 0, 0]);
        annotator
            .annotate(&mut frame, &[detection(40, 40, 60, 60)])
            .unwrap();

        assert_eq!(pixel(&frame, 40, 40), [255, 0, 0]);
        assert_eq!(pixel(&frame, 60, 60), [255, 0, 0]);
        assert_eq!(pixel(&frame, 50, 40), [255, 0, 0]);
        // Thickness 3: two rings in.
        assert_eq!(pixel(&frame, 50, 42), [255, 0, 0]);
        // Interior stays black.
        assert_eq!(pixel(&frame, 50, 50), [0, 0, 0]);
    }

    #[test]
    fn test_zero_area_box_draws_without_panic() {
        let mut frame = blank_frame(32, 32);
        let annotator = BoxAnnotator::new([255, 0, 0], [255, 255, 255], [0, 0, 0]);
        annotator
            .annotate(&mut frame, &[detection(30, 30, 30, 30)])
            .unwrap();
        assert_eq!(pixel(&frame, 30, 30), [255, 0, 0]);
    }

    #[test]
    fn test_label_tag_drawn_above_box() {
        let mut frame = blank_frame(200, 64);
        let annotator = BoxAnnotator::new([255, 0, 0], [255, 255, 255], [9, 9, 9]);
        annotator
            .annotate(&mut frame, &[detection(10, 30, 100, 60)])
            .unwrap();

        // Anchor is (x1 + 8, y1 - 12); the tag background starts two pixels
        // out from it, clear of any glyph.
        assert_eq!(pixel(&frame, 16, 16), [9, 9, 9]);
    }

    #[test]
    fn test_label_clamped_at_top_edge() {
        let mut frame = blank_frame(200, 64);
        let annotator = BoxAnnotator::new([255, 0, 0], [255, 255, 255], [9, 9, 9]);
        // Box at the very top: y1 - 12 would be negative.
        annotator
            .annotate(&mut frame, &[detection(10, 2, 100, 40)])
            .unwrap();
        // Tag lands at the clamped row instead of wrapping or panicking.
        assert_eq!(pixel(&frame, 16, 0), [9, 9, 9]);
    }

    #[test]
    fn test_draw_text_unknown_glyph_advances_silently() {
        let mut frame = blank_frame(32, 16);
        draw_text(&mut frame, 0, 0, "~A", [255, 255, 255]);
        // '~' has no glyph; 'A' still lands one advance to the right.
        assert_eq!(pixel(&frame, GLYPH_ADVANCE as u32 + 1, 0), [255, 255, 255]);
    }

    #[test]
    fn test_glyph_table_covers_label_charset() {
        for ch in "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789%|-. ".chars() {
            assert!(glyph_bits(ch).is_some(), "missing glyph for {ch:?}");
        }
    }
}
