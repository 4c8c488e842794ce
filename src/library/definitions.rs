// Filter defaults (user-facing)
pub const DEFAULT_SHARPNESS_THRESHOLD: u32 = 100;
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 1.0;
pub const DEFAULT_FRAME_INTERVAL: u32 = 1;

// Sharpness: 3x3 Laplacian (second derivative) kernel.
pub const LAPLACIAN_KERNEL: [i32; 9] = [0, 1, 0, 1, -4, 1, 0, 1, 0];

// Structural similarity definitions
pub const SSIM_WINDOW: u32 = 7;
pub const SSIM_K1: f64 = 0.01;
pub const SSIM_K2: f64 = 0.03;
pub const SSIM_DYNAMIC_RANGE: f64 = 255.0;

//frames of differing size are both squashed to this size before comparison.
pub const SSIM_MISMATCH_DIM: u32 = 256;

//frames larger than this (on the long side) are shrunk before comparison.
pub const SSIM_MAX_DIM: u32 = 512;

// Discovery and output naming
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "Processed_Frames";
pub const SINGLE_VIDEO_DIR_SUFFIX: &str = "_frames";
pub const FRAME_FILE_EXTENSION: &str = "jpg";

pub fn frame_file_name(ordinal: u64) -> String {
    format!("frame_{:04}.{}", ordinal, FRAME_FILE_EXTENSION)
}
