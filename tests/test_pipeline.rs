//! Integration tests for the dehaze -> detect -> annotate orchestrator.

mod common;

use desmog::Pipeline;
use desmog::dehaze::dehaze_rgb;
use desmog::output::{encode_jpeg, save_annotated};
use desmog::config::{DetectionSettings, OutputSettings};
use image::{DynamicImage, GrayImage};

use common::*;

#[test]
fn test_process_frame_detects_on_dehazed_image() -> anyhow::Result<()> {
    let input = hazy_image(48, 32);
    let detector = MockDetector::new(vec![
        candidate(4, 4, 30, 20, 1, 0.95),
        candidate(4, 4, 30, 20, 0, 0.2),
    ]);
    let pipeline = Pipeline::new(PipelineConfig::default()).with_detector(Box::new(detector));

    let frame = pipeline.process_frame(&as_dynamic(input.clone()))?;

    assert_eq!(frame.image.dimensions(), input.dimensions());
    assert!(frame.detection_error.is_none());
    assert_eq!(frame.detections.len(), 1);
    assert_eq!(frame.detections[0].label, "car");

    // Annotation only touches pixels on top of the dehazed result
    let dehazed = dehaze_rgb(&input, &PipelineConfig::default().dehaze)?;
    assert_ne!(frame.image, dehazed);
    assert_eq!(frame.image.get_pixel(40, 30), dehazed.get_pixel(40, 30));

    Ok(())
}

#[test]
fn test_detection_failure_degrades_to_dehazed_image() -> anyhow::Result<()> {
    let input = hazy_image(20, 20);
    let pipeline = Pipeline::new(PipelineConfig::default()).with_detector(Box::new(FailingDetector));

    let frame = pipeline.process_frame(&as_dynamic(input.clone()))?;

    assert!(frame.detections.is_empty());
    assert!(matches!(
        frame.detection_error,
        Some(PipelineError::DetectionUnavailable(_))
    ));
    assert_eq!(frame.image, dehaze_rgb(&input, &PipelineConfig::default().dehaze)?);

    Ok(())
}

#[test]
fn test_pipeline_without_detector_only_dehazes() -> anyhow::Result<()> {
    let input = hazy_image(16, 16);
    let pipeline = Pipeline::new(PipelineConfig::default());
    assert!(!pipeline.has_detector());

    let frame = pipeline.process_frame(&as_dynamic(input.clone()))?;

    assert!(frame.detections.is_empty());
    assert!(frame.detection_error.is_none());
    assert_eq!(frame.image, dehaze_rgb(&input, &PipelineConfig::default().dehaze)?);

    Ok(())
}

#[test]
fn test_invalid_shape_is_propagated() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let gray = DynamicImage::ImageLuma8(GrayImage::new(8, 8));

    let result = pipeline.process_frame(&gray);

    assert!(matches!(result, Err(PipelineError::InvalidImageShape { channels: 1, .. })));
}

#[test]
fn test_repeated_calls_are_independent() -> anyhow::Result<()> {
    let pipeline = Pipeline::new(PipelineConfig::default()).with_detector(Box::new(MockDetector::new(vec![
        candidate(1, 1, 10, 10, 0, 0.9),
    ])));
    let first = as_dynamic(hazy_image(24, 24));
    let second = as_dynamic(pattern_image(24, 24));

    let a = pipeline.process_frame(&first)?;
    let _ = pipeline.process_frame(&second)?;
    let b = pipeline.process_frame(&first)?;

    assert_eq!(a.image, b.image);
    assert_eq!(a.detections, b.detections);

    Ok(())
}

#[test]
fn test_debug_mode_writes_stage_images() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let pipeline = Pipeline::new(PipelineConfig::default()).with_debug(debug_dir.clone())?;

    pipeline.process_frame_labeled(&as_dynamic(hazy_image(12, 12)), "07")?;

    for stage in ["00_input", "01_dehaze", "02_annotate"] {
        let path = debug_dir.join(stage).join("07.png");
        assert!(path.exists(), "missing {}", path.display());
    }

    // A non-empty directory is refused
    let again = Pipeline::new(PipelineConfig::default()).with_debug(debug_dir);
    assert!(again.is_err());

    Ok(())
}

#[test]
fn test_save_annotated_writes_jpeg_and_png() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let image = pattern_image(32, 24);
    let settings = OutputSettings::default();

    let jpeg_path = dir.path().join("nested/corrected_image.jpg");
    save_annotated(&image, &jpeg_path, &settings)?;
    let decoded = image::open(&jpeg_path)?;
    assert_eq!((decoded.width(), decoded.height()), (32, 24));

    let png_path = dir.path().join("frame.png");
    save_annotated(&image, &png_path, &settings)?;
    assert_eq!(image::open(&png_path)?.to_rgb8(), image);

    Ok(())
}

#[test]
fn test_unknown_extension_is_encode_failure() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("frame.notanimage");

    let result = save_annotated(&solid_image(4, 4, 9), &path, &OutputSettings::default());

    assert!(matches!(result, Err(PipelineError::EncodeFailure(_))));
    Ok(())
}

#[test]
fn test_encode_jpeg_in_memory() -> anyhow::Result<()> {
    let bytes = encode_jpeg(&pattern_image(16, 16), 85)?;
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    Ok(())
}

#[test]
fn test_config_round_trip_and_partial_json() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("settings.json");

    std::fs::write(&path, r#"{ "dehaze": { "patch_size": 7, "blur_kind": "box" } }"#)?;
    let config = PipelineConfig::load_from_path(&path)?;
    assert_eq!(config.dehaze.patch_size, 7);
    assert_eq!(config.dehaze.blur_kind, desmog::BlurKind::Box);
    assert_eq!(config.dehaze.omega, 0.95);
    assert_eq!(config.detection.input_size, 640);

    let saved = dir.path().join("saved.json");
    config.save_to_path(&saved)?;
    assert_eq!(PipelineConfig::load_from_path(&saved)?, config);

    std::fs::write(&path, r#"{ "dehaze": { "omega": 3.0 } }"#)?;
    assert!(PipelineConfig::load_from_path(&path).is_err());

    Ok(())
}

#[test]
fn test_settings_file_cannot_lower_confidence_cutoff() -> anyhow::Result<()> {
    // 1. A settings file naming a lower cutoff still loads; the field is ignored
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "detection": { "confidence_threshold": 0.1 } }"#)?;
    let config = PipelineConfig::load_from_path(&path)?;

    // 2. Candidates at 0.9 and 0.3 go through the pipeline
    let detector = MockDetector::new(vec![
        candidate(1, 1, 10, 10, 0, 0.9),
        candidate(2, 2, 12, 12, 1, 0.3),
    ]);
    let pipeline = Pipeline::new(config).with_detector(Box::new(detector));
    let frame = pipeline.process_frame(&as_dynamic(hazy_image(16, 16)))?;

    // 3. Only the candidate above 0.5 survives
    let scores: Vec<f32> = frame.detections.iter().map(|d| d.confidence).collect();
    assert_eq!(scores, vec![0.9]);

    Ok(())
}

#[test]
fn test_detection_settings_are_validated_on_load() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("settings.json");

    for payload in [
        r#"{ "detection": { "input_size": 0 } }"#,
        r#"{ "detection": { "nms_iou_threshold": 1.5 } }"#,
    ] {
        std::fs::write(&path, payload)?;
        assert!(PipelineConfig::load_from_path(&path).is_err(), "{payload} loaded");
    }

    let bad = DetectionSettings {
        input_size: 0,
        ..DetectionSettings::default()
    };
    assert!(matches!(
        bad.validate(),
        Err(PipelineError::InvalidParameter { name: "input_size", .. })
    ));
    assert!(DetectionSettings::default().validate().is_ok());

    Ok(())
}
