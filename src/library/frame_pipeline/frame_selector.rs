use crate::library::{
    frame_scoring::{sharpness, DuplicateDetector},
    img_ops::{to_gray, RgbImgBuf},
    FilterConfig,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameVerdict {
    Accepted { sharpness: f64, similarity: f64 },
    RejectedBlur { sharpness: f64 },
    RejectedDuplicate { sharpness: f64, similarity: f64 },
}

/// Decides, frame by frame, whether a video's frames are kept.
///
/// Frames must be fed in increasing index order. Blur is checked first, so
/// blurry frames are never compared for similarity. Only an accepted frame
/// becomes the new duplicate reference, and it does so before `evaluate`
/// returns.
pub struct FrameSelector {
    sharpness_threshold: f64,
    duplicate_threshold: f64,
    detector: DuplicateDetector,
}

impl FrameSelector {
    pub fn new(cfg: &FilterConfig) -> Self {
        Self {
            sharpness_threshold: cfg.sharpness_threshold() as f64,
            duplicate_threshold: cfg.duplicate_threshold(),
            detector: DuplicateDetector::new(),
        }
    }

    pub fn evaluate(&mut self, image: &RgbImgBuf) -> FrameVerdict {
        let gray = to_gray(image);

        let sharpness = sharpness(&gray);
        if sharpness < self.sharpness_threshold {
            return FrameVerdict::RejectedBlur { sharpness };
        }

        let prepared = DuplicateDetector::prepare(gray);
        let similarity = self.detector.similarity(&prepared);

        //with no reference, similarity is 0.0 but a threshold of 0.0 would still match it.
        if self.detector.has_reference() && similarity >= self.duplicate_threshold {
            return FrameVerdict::RejectedDuplicate { sharpness, similarity };
        }

        self.detector.set_reference(prepared);
        FrameVerdict::Accepted { sharpness, similarity }
    }
}
