use std::path::Path;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Capture source decoding a video file, stream URL, or device node via
/// ffmpeg-next (libavformat + libavcodec).
///
/// Each `read` pulls packets until one frame decodes, converts it to RGB24
/// and hands it out as a [`Frame`]. After the container is drained the
/// decoder is flushed; once the flush runs dry every further `read` fails
/// with an end-of-stream error, which the capture loop treats as fatal.
pub struct FfmpegFrameSource {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    frame_index: u64,
    flushing: bool,
}

// Safety: the source lives on the capture thread only; the raw pointers
// inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    /// Open a capture source by path or URL.
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "opened capture source {} ({}x{})",
            path.display(),
            width,
            height
        );

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            frame_index: 0,
            flushing: false,
        })
    }

    fn receive_decoded(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;

        let pixels = copy_rgb_rows(&rgb, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

impl FrameSource for FfmpegFrameSource {
    fn read(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        loop {
            if let Some(frame) = self.receive_decoded()? {
                return Ok(frame);
            }

            if self.flushing {
                return Err("end of stream".into());
            }

            let mut reached_eof = false;
            loop {
                let stream_index = self.stream_index;
                match self.ictx.packets().next() {
                    Some((stream, packet)) => {
                        if stream.index() != stream_index {
                            continue;
                        }
                        self.decoder.send_packet(&packet)?;
                        break;
                    }
                    None => {
                        reached_eof = true;
                        break;
                    }
                }
            }

            if reached_eof {
                self.decoder.send_eof()?;
                self.flushing = true;
            }
        }
    }
}

/// Copy RGB24 pixel rows out of an ffmpeg frame, dropping the per-row
/// stride padding libav may insert.
fn copy_rgb_rows(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let row_len = (width as usize) * 3;
    let src = rgb.data(0);

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&src[start..start + row_len]);
    }
    pixels
}
