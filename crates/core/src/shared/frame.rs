/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Frames are created by a capture source, published into the shared slot,
/// and treated as immutable from then on. The only mutation after capture
/// happens on the presentation-side copy that receives annotations.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Monotonically increasing capture index assigned by the source.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
