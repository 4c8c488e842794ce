use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::library::{errors::LibError, video_job::VideoJob};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounts {
    pub scanned: u64,
    pub accepted: u64,
    pub rejected_blur: u64,
    pub rejected_duplicate: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFrame {
    pub ordinal: u64,
    pub frame_index: u64,
    pub path: PathBuf,
}

/// Outcome of running one video through the pipeline. A failed video still
/// reports everything it did before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    job: VideoJob,
    counts: FrameCounts,
    saved_frames: Vec<SavedFrame>,
    failure: Option<LibError>,
}

impl PipelineResult {
    pub fn new(job: VideoJob, counts: FrameCounts, saved_frames: Vec<SavedFrame>, failure: Option<LibError>) -> Self {
        Self {
            job,
            counts,
            saved_frames,
            failure,
        }
    }

    pub fn failed(job: VideoJob, failure: LibError) -> Self {
        Self::new(job, FrameCounts::default(), vec![], Some(failure))
    }

    pub fn job(&self) -> &VideoJob {
        &self.job
    }

    pub fn counts(&self) -> &FrameCounts {
        &self.counts
    }

    //empty in dry-run mode.
    pub fn saved_frames(&self) -> &[SavedFrame] {
        &self.saved_frames
    }

    pub fn failure(&self) -> Option<&LibError> {
        self.failure.as_ref()
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub videos_attempted: u64,
    pub videos_succeeded: u64,
    pub videos_failed: u64,
    pub frames_scanned: u64,
    pub frames_accepted: u64,
    pub frames_rejected_blur: u64,
    pub frames_rejected_duplicate: u64,
}

impl BatchSummary {
    //Pure accumulation, so the order results arrive in does not matter.
    pub fn add(&mut self, result: &PipelineResult) {
        let counts = result.counts();

        self.videos_attempted += 1;
        if result.succeeded() {
            self.videos_succeeded += 1;
        } else {
            self.videos_failed += 1;
        }

        self.frames_scanned += counts.scanned;
        self.frames_accepted += counts.accepted;
        self.frames_rejected_blur += counts.rejected_blur;
        self.frames_rejected_duplicate += counts.rejected_duplicate;
    }
}

/// Everything a finished batch produced: the totals, and each video's result
/// ordered by job index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<PipelineResult>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = (&VideoJob, &LibError)> {
        self.results
            .iter()
            .filter_map(|result| result.failure().map(|failure| (result.job(), failure)))
    }
}
