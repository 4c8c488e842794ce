use crate::library::{
    definitions::{SSIM_DYNAMIC_RANGE, SSIM_K1, SSIM_K2, SSIM_MAX_DIM, SSIM_MISMATCH_DIM, SSIM_WINDOW},
    img_ops::{shrink_to_fit, squash, GrayImgBuf},
};

/// Mean structural similarity (SSIM) of two grayscale images, clamped to [0, 1].
///
/// Luminance, contrast and structure are compared over every 7x7 window lying
/// fully inside the image, and the per-window scores are averaged. Identical
/// images score exactly 1.0. Images of different sizes are both squashed to a
/// common square before comparison.
pub fn structural_similarity(a: &GrayImgBuf, b: &GrayImgBuf) -> f64 {
    if a.dimensions() != b.dimensions() {
        let a = squash(a, SSIM_MISMATCH_DIM, SSIM_MISMATCH_DIM);
        let b = squash(b, SSIM_MISMATCH_DIM, SSIM_MISMATCH_DIM);
        return mean_ssim(&a, &b);
    }

    mean_ssim(a, b)
}

// Running totals of x, y, x^2, y^2 and xy for one summed-area table cell.
type Moments = [f64; 5];

struct SummedAreaTable {
    stride: usize,
    cells: Vec<Moments>,
}

impl SummedAreaTable {
    fn new(a: &GrayImgBuf, b: &GrayImgBuf) -> Self {
        let (x, y) = a.dimensions();
        let (x, y) = (x as usize, y as usize);
        let stride = x + 1;
        let mut cells = vec![[0.0; 5]; stride * (y + 1)];

        for py in 0..y {
            let mut row = [0.0; 5];
            for px in 0..x {
                let p = a.get_pixel(px as u32, py as u32)[0] as f64;
                let q = b.get_pixel(px as u32, py as u32)[0] as f64;
                row[0] += p;
                row[1] += q;
                row[2] += p * p;
                row[3] += q * q;
                row[4] += p * q;

                let above = cells[py * stride + px + 1];
                let cell = &mut cells[(py + 1) * stride + px + 1];
                for k in 0..5 {
                    cell[k] = above[k] + row[k];
                }
            }
        }

        Self { stride, cells }
    }

    fn window(&self, x0: usize, y0: usize, size: usize) -> Moments {
        let (x1, y1) = (x0 + size, y0 + size);
        let br = self.cells[y1 * self.stride + x1];
        let tr = self.cells[y0 * self.stride + x1];
        let bl = self.cells[y1 * self.stride + x0];
        let tl = self.cells[y0 * self.stride + x0];

        let mut ret = [0.0; 5];
        for k in 0..5 {
            ret[k] = br[k] - tr[k] - bl[k] + tl[k];
        }
        ret
    }
}

fn mean_ssim(a: &GrayImgBuf, b: &GrayImgBuf) -> f64 {
    let (x, y) = a.dimensions();
    let win = std::cmp::min(SSIM_WINDOW, std::cmp::min(x, y)) as usize;

    //too small for any variance estimate: fall back to exact comparison.
    if win < 2 {
        return if a == b { 1.0 } else { 0.0 };
    }

    let c1 = (SSIM_K1 * SSIM_DYNAMIC_RANGE).powi(2);
    let c2 = (SSIM_K2 * SSIM_DYNAMIC_RANGE).powi(2);

    let table = SummedAreaTable::new(a, b);
    let n = (win * win) as f64;

    let mut total = 0.0;
    let mut num_windows = 0u64;
    for y0 in 0..=(y as usize - win) {
        for x0 in 0..=(x as usize - win) {
            let [sx, sy, sxx, syy, sxy] = table.window(x0, y0, win);

            let mx = sx / n;
            let my = sy / n;
            let vx = (sxx - sx * sx / n) / (n - 1.0);
            let vy = (syy - sy * sy / n) / (n - 1.0);
            let cov = (sxy - sx * sy / n) / (n - 1.0);

            let numerator = (2.0 * mx * my + c1) * (2.0 * cov + c2);
            let denominator = (mx * mx + my * my + c1) * (vx + vy + c2);

            total += numerator / denominator;
            num_windows += 1;
        }
    }

    (total / num_windows as f64).max(0.0).min(1.0)
}

/// Holds the most recently accepted frame of a video, prepared for comparison.
///
/// The reference only changes through [`DuplicateDetector::set_reference`];
/// scoring a candidate never touches it.
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    reference: Option<GrayImgBuf>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self { reference: None }
    }

    //Comparison runs on a bounded-size copy of each frame.
    pub fn prepare(gray: GrayImgBuf) -> GrayImgBuf {
        shrink_to_fit(gray, SSIM_MAX_DIM)
    }

    /// Similarity of a prepared candidate to the reference, or 0.0 when there is
    /// no reference yet (the first frame is never a duplicate).
    pub fn similarity(&self, candidate: &GrayImgBuf) -> f64 {
        match &self.reference {
            Some(reference) => structural_similarity(candidate, reference),
            None => 0.0,
        }
    }

    pub fn set_reference(&mut self, prepared: GrayImgBuf) {
        self.reference = Some(prepared);
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }
}
