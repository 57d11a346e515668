#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Random-looking pixels so the encoders cannot shrink the file much.
pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed | 1;
    let img = RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn write_noise_png(path: &Path, side: u32, seed: u32) -> u64 {
    noise_image(side, side, seed)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
    fs::metadata(path).unwrap().len()
}

pub fn write_noise_jpeg(path: &Path, side: u32, seed: u32) -> u64 {
    noise_image(side, side, seed)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
    fs::metadata(path).unwrap().len()
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

/// Megabyte string for a byte count, as typed on the command line.
pub fn megabytes_arg(bytes: u64) -> String {
    format!("{}", bytes as f64 / 1_000_000.0)
}

/// Three noise PNGs in a nested folder plus two tiny JPEGs.
pub fn create_mixed_tree(root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let nested = root.join("nested");
    fs::create_dir(&nested).unwrap();

    let pngs = vec![
        root.join("a.png"),
        nested.join("b.png"),
        nested.join("c.PNG"),
    ];
    for (i, path) in pngs.iter().enumerate() {
        write_noise_png(path, 160, 11 + i as u32);
    }

    let jpegs = vec![root.join("small.jpg"), nested.join("tiny.jpeg")];
    for (i, path) in jpegs.iter().enumerate() {
        write_noise_jpeg(path, 8, 101 + i as u32);
    }

    (pngs, jpegs)
}
