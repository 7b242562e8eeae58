//! Common test infrastructure for tilekit integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::path::Path;

/// Write a solid-color square tile.
pub fn write_tile(path: &Path, size: u32, color: [u8; 3]) {
    let tile = RgbImage::from_pixel(size, size, Rgb(color));
    tile.save(path).expect("write test tile");
}

/// Write an RGB image from per-pixel data (row-major).
pub fn write_rgb(path: &Path, width: u32, height: u32, pixels: &[[u8; 3]]) {
    assert_eq!(pixels.len(), (width * height) as usize);
    let mut image = RgbImage::new(width, height);
    for (i, px) in pixels.iter().enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        image.put_pixel(x, y, Rgb(*px));
    }
    image.save(path).expect("write test image");
}

/// Distinct color per grid cell so placement mistakes show up in pixels.
pub fn cell_color(col: i64, row: i64) -> [u8; 3] {
    [(20 + col * 60) as u8, (20 + row * 60) as u8, 180]
}
