use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Deterministic capture source producing a scrolling gradient.
///
/// Stands in for a real camera in demos and tests: frame content depends
/// only on the frame index, and an optional budget lets the stream end
/// after a fixed number of frames (reported as a read error, like any
/// exhausted device).
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    remaining: Option<u64>,
    next_index: u64,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32, frame_budget: Option<u64>) -> Self {
        Self {
            width,
            height,
            remaining: frame_budget,
            next_index: 0,
        }
    }
}

impl FrameSource for SyntheticFrameSource {
    fn read(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err("synthetic source exhausted".into());
            }
            *remaining -= 1;
        }

        let index = self.next_index;
        self.next_index += 1;

        let shift = (index % 256) as u32;
        let mut data = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(((x + shift) % 256) as u8);
                data.push(((y + shift) % 256) as u8);
                data.push((shift % 256) as u8);
            }
        }

        Ok(Frame::new(data, self.width, self.height, 3, index))
    }
}
