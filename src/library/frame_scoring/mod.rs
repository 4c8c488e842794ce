mod sharpness;
mod similarity;

pub use sharpness::sharpness;
pub use similarity::{structural_similarity, DuplicateDetector};
