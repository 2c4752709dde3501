use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use framewatch_core::annotation::infrastructure::box_annotator::BoxAnnotator;
use framewatch_core::capture::domain::frame_source::FrameSource;
use framewatch_core::capture::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use framewatch_core::capture::infrastructure::synthetic_frame_source::SyntheticFrameSource;
use framewatch_core::detection::domain::detector::Detector;
use framewatch_core::detection::infrastructure::model_resolver;
use framewatch_core::detection::infrastructure::onnx_detector::OnnxDetector;
use framewatch_core::pipeline::annotate_stream_use_case::AnnotateStreamUseCase;
use framewatch_core::pipeline::config::PipelineConfig;
use framewatch_core::pipeline::frame_processor::FrameProcessor;
use framewatch_core::pipeline::pipeline_observer::StdoutObserver;
use framewatch_core::presentation::domain::renderer::{NullRenderer, Renderer};
use framewatch_core::presentation::infrastructure::image_sequence_renderer::ImageSequenceRenderer;
use framewatch_core::shared::constants::{
    DEFAULT_MODEL_INPUT, DETECTION_MODEL_NAME, DETECTION_MODEL_URL,
};

/// Live object detection and annotation over a video stream.
#[derive(Parser)]
#[command(name = "framewatch")]
struct Cli {
    /// Input video file or stream URL; "synthetic" generates a test pattern.
    input: String,

    /// Directory to write annotated frames to (omit to measure only).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Detection confidence threshold in percent (0-100).
    #[arg(long, default_value = "50.0")]
    confidence: f64,

    /// Run detection every Nth cycle (1 = every cycle).
    #[arg(long, default_value = "2")]
    skip_interval: u64,

    /// Detector input resolution, WIDTHxHEIGHT.
    #[arg(long, default_value = "640x480")]
    model_input: String,

    /// Only annotate these class labels (comma-separated, e.g. person,car).
    #[arg(long, value_delimiter = ',')]
    classes: Option<Vec<String>>,

    /// Stop after this many presentation cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Path to a YOLO ONNX model file (skips the cached download).
    #[arg(long)]
    model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let signal_flag = cancelled.clone();
    ctrlc::set_handler(move || {
        signal_flag.store(true, Ordering::Relaxed);
    })?;

    let detector = build_detector(&cli)?;
    let source = open_source(&cli.input)?;
    let processor = FrameProcessor::new(detector, Box::new(BoxAnnotator::default()), &config)?;

    let mut renderer: Box<dyn Renderer> = match cli.output {
        Some(dir) => Box::new(ImageSequenceRenderer::new(dir)),
        None => Box::new(NullRenderer),
    };
    let mut observer = StdoutObserver::default();

    let summary = AnnotateStreamUseCase::new().execute(
        source,
        processor,
        renderer.as_mut(),
        &mut observer,
        cancelled,
        config.max_cycles,
    )?;

    log::info!(
        "Rendered {} frames over {} cycles, {} detections",
        summary.frames_rendered,
        summary.cycles,
        summary.detections_total
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    Ok(PipelineConfig {
        model_input: parse_model_input(&cli.model_input)?,
        confidence_percent: cli.confidence,
        skip_interval: cli.skip_interval,
        label_filter: cli
            .classes
            .clone()
            .map(|v| v.into_iter().collect::<HashSet<String>>()),
        max_cycles: cli.max_cycles,
    })
}

fn build_detector(cli: &Cli) -> Result<Box<dyn Detector>, Box<dyn std::error::Error>> {
    let model_path = match &cli.model {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Model file not found: {}", path.display()).into());
            }
            path.clone()
        }
        None => {
            log::info!("Resolving model: {DETECTION_MODEL_NAME}");
            let path = model_resolver::resolve(
                DETECTION_MODEL_NAME,
                DETECTION_MODEL_URL,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    Ok(Box::new(OnnxDetector::new(&model_path)?))
}

fn open_source(input: &str) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    if input == "synthetic" {
        let (w, h) = DEFAULT_MODEL_INPUT;
        return Ok(Box::new(SyntheticFrameSource::new(w, h, None)));
    }

    let path = Path::new(input);
    if !path.exists() && !input.contains("://") {
        return Err(format!("Input not found: {input}").into());
    }
    Ok(Box::new(FfmpegFrameSource::open(path)?))
}

fn parse_model_input(value: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let err = || format!("Model input must look like 640x480, got '{value}'");
    let (w, h) = value.split_once('x').ok_or_else(err)?;
    Ok((
        w.parse::<u32>().map_err(|_| err())?,
        h.parse::<u32>().map_err(|_| err())?,
    ))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading detection model... {pct}%");
    } else {
        eprint!("\rDownloading detection model... {downloaded} bytes");
    }
}
