//! End-to-end normalization flows against temporary image files.
//!
//! These run through `normalize::run`, which picks whichever backend the
//! host provides; every assertion here holds on both execution paths.

mod common;

use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;
use tilekit::error::NormalizeError;
use tilekit::normalize;

fn read_values(path: &Path) -> Vec<u16> {
    let image = image::open(path).unwrap().to_luma16();
    image.pixels().map(|p| p.0[0]).collect()
}

#[test]
fn test_single_bright_pixel_scenario() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scene.png");
    common::write_rgb(
        &input,
        2,
        2,
        &[[255, 255, 255], [0, 0, 0], [0, 0, 0], [0, 0, 0]],
    );

    let outcome = normalize::run(&input).unwrap();
    assert_eq!((outcome.width, outcome.height), (2, 2));
    assert!(outcome.output.exists());

    let name = outcome.output.file_name().unwrap().to_string_lossy();
    assert_eq!(name, format!("scene-gs-norm-{}.png", outcome.backend));

    let values = read_values(&outcome.output);
    assert_eq!(values.iter().filter(|&&v| v == 65535).count(), 1);
    assert_eq!(values.iter().filter(|&&v| v == 0).count(), 3);
}

#[test]
fn test_output_spans_full_range() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("gradient.png");
    let pixels: Vec<[u8; 3]> = (0..16)
        .map(|i| {
            let v = (i * 17) as u8;
            [v, v.wrapping_mul(3), 255 - v]
        })
        .collect();
    common::write_rgb(&input, 4, 4, &pixels);

    let outcome = normalize::run(&input).unwrap();
    let values = read_values(&outcome.output);

    assert_eq!(values.iter().copied().min(), Some(0));
    assert_eq!(values.iter().copied().max(), Some(65535));
}

#[test]
fn test_second_run_fails_and_preserves_first_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scan.png");
    common::write_rgb(&input, 2, 1, &[[9, 8, 7], [200, 100, 50]]);

    let outcome = normalize::run(&input).unwrap();
    let first_bytes = std::fs::read(&outcome.output).unwrap();

    let err = normalize::run(&input).unwrap_err();
    match err {
        NormalizeError::OutputExists { path } => assert_eq!(path, outcome.output),
        other => panic!("expected OutputExists, got {other:?}"),
    }

    assert_eq!(std::fs::read(&outcome.output).unwrap(), first_bytes);
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let err = normalize::run(&dir.path().join("absent.png")).unwrap_err();
    assert!(matches!(err, NormalizeError::InputMissing { .. }));
}

#[test]
fn test_constant_input_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("flat.png");
    common::write_rgb(&input, 2, 2, &[[66, 66, 66]; 4]);

    let err = normalize::run(&input).unwrap_err();
    assert!(matches!(
        err,
        NormalizeError::Norm(gray_norm::NormError::ConstantInput { .. })
    ));

    // No output file of either suffix may appear.
    assert!(!dir.path().join("flat-gs-norm-cpu.png").exists());
    assert!(!dir.path().join("flat-gs-norm-gpu.png").exists());
}

#[test]
fn test_non_png_input_gets_png_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.bmp");
    common::write_rgb(&input, 2, 2, &[[0, 0, 0], [10, 0, 0], [0, 10, 0], [0, 0, 10]]);

    let outcome = normalize::run(&input).unwrap();
    let name = outcome.output.file_name().unwrap().to_string_lossy();
    assert_eq!(name, format!("photo-gs-norm-{}.png", outcome.backend));

    let values = read_values(&outcome.output);
    assert_eq!(values.len(), 4);
    assert_eq!(values.iter().copied().min(), Some(0));
    assert_eq!(values.iter().copied().max(), Some(65535));
}
