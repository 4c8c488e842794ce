use std::path::Path;

use super::{errors::DecodeError, img_ops::RgbImgBuf};

/// One decoded frame, tagged with its ordinal position in the source video.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub index: u64,
    pub image: RgbImgBuf,
}

impl DecodedFrame {
    pub fn new(index: u64, image: RgbImgBuf) -> Self {
        Self { index, image }
    }
}

/// Something that can turn a video file into a lazy sequence of frames.
///
/// `open` yields frames at indices `0, interval, 2 * interval, ...`. The
/// returned iterator is forward-only: re-scanning a video needs a fresh call
/// to `open`. Any decoder resources held by the iterator must be released
/// when it is dropped, whether or not it was run to exhaustion. After an
/// `Err` item the iterator is finished.
pub trait FrameDecoder: Sync {
    type Source: Iterator<Item = Result<DecodedFrame, DecodeError>>;

    fn open(&self, src_path: &Path, interval: u32) -> Result<Self::Source, DecodeError>;
}
