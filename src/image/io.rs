//! Loading and saving frames via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{Frame, Geometry};
use crate::pixel::Rgb565;
use crate::util::{CamFilterError, CamFilterResult};
use image::imageops::FilterType;
use std::path::Path;

fn io_error(err: image::ImageError) -> CamFilterError {
    CamFilterError::ImageIo {
        reason: err.to_string(),
    }
}

/// Quantizes an 8-bit RGB image into a frame of the same size.
pub fn frame_from_rgb_image(img: &image::RgbImage) -> CamFilterResult<Frame> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .pixels()
        .map(|px| Rgb565::from_rgb8(px[0], px[1], px[2]))
        .collect();
    Frame::from_vec(data, width, height)
}

/// Image dimensions for `geometry`, rejecting sizes `image` cannot address.
fn image_dims(geometry: Geometry) -> CamFilterResult<(u32, u32)> {
    let invalid = |_| CamFilterError::InvalidDimensions {
        width: geometry.width,
        height: geometry.height,
    };
    let width = u32::try_from(geometry.width).map_err(invalid)?;
    let height = u32::try_from(geometry.height).map_err(invalid)?;
    Ok((width, height))
}

/// Expands a frame into an 8-bit RGB image.
pub fn rgb_image_from_frame(frame: &Frame) -> CamFilterResult<image::RgbImage> {
    let (width, height) = image_dims(frame.geometry())?;
    let raw: Vec<u8> = frame
        .as_slice()
        .iter()
        .flat_map(|px| px.to_rgb8())
        .collect();
    let got = raw.len();
    image::RgbImage::from_raw(width, height, raw).ok_or(CamFilterError::BufferTooSmall {
        needed: frame.geometry().len() * 3,
        got,
    })
}

/// Loads an image from disk, resizing it to `geometry` when sizes differ.
pub fn load_frame<P: AsRef<Path>>(path: P, geometry: Geometry) -> CamFilterResult<Frame> {
    let (width, height) = image_dims(geometry)?;
    let img = image::open(path).map_err(io_error)?.to_rgb8();
    if img.width() == width && img.height() == height {
        return frame_from_rgb_image(&img);
    }
    let resized = image::imageops::resize(&img, width, height, FilterType::Triangle);
    frame_from_rgb_image(&resized)
}

/// Writes a frame to disk; the format follows the file extension.
pub fn save_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> CamFilterResult<()> {
    rgb_image_from_frame(frame)?.save(path).map_err(io_error)
}
