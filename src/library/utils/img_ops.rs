use image::{
    imageops::{resize, rotate180, rotate270, rotate90, FilterType},
    ImageBuffer, Luma, Rgb,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::Rotation;

pub type RgbImgBuf = ImageBuffer<Rgb<u8>, Vec<u8>>;
pub type GrayImgBuf = ImageBuffer<Luma<u8>, Vec<u8>>;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ImgOpsError {
    #[error("Failed to convert raw bytes received from FFMpeg into an image")]
    RawConversionError,
}

pub fn bytes_to_image(bytes: Vec<u8>, dimensions_x: u32, dimensions_y: u32) -> Result<RgbImgBuf, ImgOpsError> {
    RgbImgBuf::from_raw(dimensions_x, dimensions_y, bytes).ok_or(ImgOpsError::RawConversionError)
}

pub fn to_gray(img: &RgbImgBuf) -> GrayImgBuf {
    image::buffer::ConvertBuffer::convert(img)
}

//Lossless: rotation by right angles only moves pixels around.
pub fn rotate(img: RgbImgBuf, rotation: Rotation) -> RgbImgBuf {
    match rotation {
        Rotation::None => img,
        Rotation::Clockwise90 => rotate90(&img),
        Rotation::Clockwise180 => rotate180(&img),
        Rotation::Clockwise270 => rotate270(&img),
    }
}

/// Shrink so that neither side exceeds `max_dim`, keeping the aspect ratio.
/// Images already within bounds are returned unchanged.
pub fn shrink_to_fit(img: GrayImgBuf, max_dim: u32) -> GrayImgBuf {
    let (x, y) = img.dimensions();
    let long_side = std::cmp::max(x, y);
    if long_side <= max_dim {
        return img;
    }

    let scale = max_dim as f64 / long_side as f64;
    let new_x = std::cmp::max(1, (x as f64 * scale).round() as u32);
    let new_y = std::cmp::max(1, (y as f64 * scale).round() as u32);

    resize(&img, new_x, new_y, FilterType::Triangle)
}

pub fn squash(img: &GrayImgBuf, dimensions_x: u32, dimensions_y: u32) -> GrayImgBuf {
    resize(img, dimensions_x, dimensions_y, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_image(x: u32, y: u32) -> RgbImgBuf {
        ImageBuffer::from_fn(x, y, |px, py| {
            let v = (py * x + px) as u8;
            Rgb([v, v.wrapping_mul(3), v.wrapping_add(17)])
        })
    }

    #[test]
    fn rotate_zero_is_noop() {
        let img = numbered_image(5, 3);
        assert_eq!(rotate(img.clone(), Rotation::None), img);
    }

    #[test]
    fn rotate_four_quarter_turns_restores_image() {
        let img = numbered_image(5, 3);

        let mut rotated = img.clone();
        for _ in 0..4 {
            rotated = rotate(rotated, Rotation::Clockwise90);
        }

        assert_eq!(rotated, img);
    }

    #[test]
    fn rotate_quarter_turns_swap_dimensions() {
        let img = numbered_image(5, 3);

        assert_eq!(rotate(img.clone(), Rotation::Clockwise90).dimensions(), (3, 5));
        assert_eq!(rotate(img.clone(), Rotation::Clockwise180).dimensions(), (5, 3));
        assert_eq!(rotate(img, Rotation::Clockwise270).dimensions(), (3, 5));
    }

    #[test]
    fn rotate_clockwise_moves_top_left_to_top_right() {
        let img = numbered_image(5, 3);
        let rotated = rotate(img.clone(), Rotation::Clockwise90);

        //after a clockwise quarter turn of a 5x3 image, (0,0) lands at (2,0).
        assert_eq!(rotated.get_pixel(2, 0), img.get_pixel(0, 0));

        let opposite = rotate(rotate(img.clone(), Rotation::Clockwise90), Rotation::Clockwise270);
        assert_eq!(opposite, img);
    }

    #[test]
    fn raw_bytes_of_wrong_length_are_rejected() {
        assert!(bytes_to_image(vec![0; 2 * 2 * 3], 2, 2).is_ok());
        assert!(matches!(
            bytes_to_image(vec![0; 5], 2, 2),
            Err(ImgOpsError::RawConversionError)
        ));
    }

    #[test]
    fn shrink_keeps_aspect_ratio() {
        let img = GrayImgBuf::new(1024, 512);
        let shrunk = shrink_to_fit(img, 256);
        assert_eq!(shrunk.dimensions(), (256, 128));

        let small = GrayImgBuf::new(100, 50);
        assert_eq!(shrink_to_fit(small, 256).dimensions(), (100, 50));
    }
}
