use anyhow::bail;
use clap::Parser;
use image::ImageReader;
use log::{LevelFilter, error, info, warn};
use std::path::{Path, PathBuf};

use desmog::config::PipelineConfig;
use desmog::output::{DEFAULT_OUTPUT_PATH, save_annotated};
use desmog::{Detector, Pipeline};

#[derive(Parser)]
#[command(name = "desmog")]
#[command(about = "Remove smoke and haze from images and mark detected objects")]
struct Cli {
    /// Input image files; each is processed independently
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for outputs, named `<stem>_corrected.jpg`
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// JSON settings file; missing fields keep their defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// YOLOv8 model in `.rten` format
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Skip object detection and only dehaze
    #[arg(long)]
    no_detect: bool,

    /// Save per-stage debug images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(default_filter: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = match &args.config {
        Some(path) => PipelineConfig::load_from_path(path)?,
        None => PipelineConfig::default(),
    };
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.output.is_some() && args.images.len() > 1 {
        bail!("--output accepts a single input; use --output-dir for several images");
    }

    let mut pipeline = Pipeline::new(config.clone()).with_verbose(args.verbose);
    if !args.no_detect {
        if let Some(detector) = load_detector(args.model.as_deref(), &config) {
            pipeline = pipeline.with_detector(detector);
        }
    }
    if let Some(debug_dir) = args.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let mut failures = 0usize;
    for (index, image_path) in args.images.iter().enumerate() {
        let output_path = output_path_for(&args, image_path);
        let label = format!("{:02}", index + 1);
        if let Err(e) = process_one(&pipeline, image_path, &output_path, &label) {
            error!("{}: {e:#}", image_path.display());
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} image(s) failed", args.images.len());
    }
    Ok(())
}

fn process_one(pipeline: &Pipeline, image_path: &Path, output_path: &Path, label: &str) -> anyhow::Result<()> {
    info!("Loading image: {}", image_path.display());
    let img = ImageReader::open(image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    // Decoders may yield gray, alpha or 16-bit buffers; the core expects RGB8.
    let img = image::DynamicImage::ImageRgb8(img.to_rgb8());
    info!("Image loaded: {}x{}", img.width(), img.height());

    let frame = pipeline.process_frame_labeled(&img, label)?;
    for detection in &frame.detections {
        let b = detection.bbox;
        info!(
            "  {} at ({}, {})-({}, {}) - confidence: {:.2}",
            detection.label, b.x1, b.y1, b.x2, b.y2, detection.confidence
        );
    }

    save_annotated(&frame.image, output_path, &pipeline.config().output)?;
    Ok(())
}

fn output_path_for(args: &Cli, image_path: &Path) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let file_name = format!("{stem}_corrected.jpg");
    match &args.output_dir {
        Some(dir) => dir.join(file_name),
        None if args.images.len() == 1 => PathBuf::from(DEFAULT_OUTPUT_PATH),
        None => PathBuf::from(file_name),
    }
}

/// Initialise the detector once. Failure is reported and the run continues
/// without detection.
#[cfg(feature = "yolo")]
fn load_detector(model: Option<&Path>, config: &PipelineConfig) -> Option<Box<dyn Detector>> {
    let Some(path) = model else {
        warn!("No --model given; running without object detection");
        return None;
    };
    match desmog::YoloDetector::load(path, &config.detection) {
        Ok(detector) => Some(Box::new(detector)),
        Err(e) => {
            warn!("{e}; running without object detection");
            None
        }
    }
}

#[cfg(not(feature = "yolo"))]
fn load_detector(model: Option<&Path>, _config: &PipelineConfig) -> Option<Box<dyn Detector>> {
    if model.is_some() {
        warn!("Built without the `yolo` feature; ignoring --model and running without object detection");
    }
    None
}
