use image::Luma;
use imageproc::{definitions::Image, filter::filter3x3};

use crate::library::{definitions::LAPLACIAN_KERNEL, img_ops::GrayImgBuf};

/// Blur score of a grayscale image: the variance of its Laplacian response.
///
/// Sharp images have strong, varied edges and score high; a flat image scores
/// exactly 0. Images too small to hold a 3x3 neighbourhood also score 0.
pub fn sharpness(gray: &GrayImgBuf) -> f64 {
    let (x, y) = gray.dimensions();
    if x < 3 || y < 3 {
        return 0.0;
    }

    let response: Image<Luma<i16>> = filter3x3(gray, &LAPLACIAN_KERNEL[..]);

    let num_px = (x as f64) * (y as f64);
    let mean = response.pixels().map(|p| p[0] as f64).sum::<f64>() / num_px;
    let variance = response
        .pixels()
        .map(|p| {
            let d = p[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / num_px;

    variance.max(0.0)
}

#[cfg(test)]
mod tests {
    use image::ImageBuffer;
    use imageproc::filter::gaussian_blur_f32;

    use super::*;

    fn checkerboard(size: u32, square: u32) -> GrayImgBuf {
        ImageBuffer::from_fn(size, size, |x, y| {
            if ((x / square) + (y / square)) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn solid_image_has_zero_sharpness() {
        let black = GrayImgBuf::new(10, 10);
        assert_eq!(sharpness(&black), 0.0);

        let white = ImageBuffer::from_pixel(10, 10, Luma([255u8]));
        assert_eq!(sharpness(&white), 0.0);
    }

    #[test]
    fn tiny_images_have_zero_sharpness() {
        let img = ImageBuffer::from_fn(2, 2, |x, _| Luma([(x * 255) as u8]));
        assert_eq!(sharpness(&img), 0.0);
    }

    #[test]
    fn blurring_reduces_sharpness() {
        let sharp = checkerboard(64, 4);
        let blurred = gaussian_blur_f32(&sharp, 2.0);
        let very_blurred = gaussian_blur_f32(&sharp, 6.0);

        let sharp_score = sharpness(&sharp);
        let blurred_score = sharpness(&blurred);
        let very_blurred_score = sharpness(&very_blurred);

        assert!(sharp_score > 100.0, "{}", sharp_score);
        assert!(sharp_score > blurred_score);
        assert!(blurred_score > very_blurred_score);
    }

    #[test]
    fn sharpness_is_deterministic() {
        let img = checkerboard(32, 3);
        assert_eq!(sharpness(&img), sharpness(&img.clone()));
    }
}
