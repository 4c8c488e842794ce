use std::path::{Path, PathBuf};

use image::ImageFormat;

use super::{
    frame_selector::{FrameSelector, FrameVerdict},
    results::{FrameCounts, PipelineResult, SavedFrame},
};
use crate::library::{
    definitions::frame_file_name,
    errors::{LibError, WriteError},
    frame_source::{DecodedFrame, FrameDecoder},
    img_ops::{rotate, RgbImgBuf},
    video_job::VideoJob,
    FilterConfig,
};

//Persists accepted frames. In dry-run mode nothing touches the filesystem.
struct FrameWriter {
    output_dir: PathBuf,
    dry_run: bool,
    dir_ready: bool,
}

impl FrameWriter {
    fn new(output_dir: &Path, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            dry_run,
            dir_ready: false,
        }
    }

    fn write(&mut self, ordinal: u64, image: &RgbImgBuf) -> Result<Option<PathBuf>, WriteError> {
        if self.dry_run {
            return Ok(None);
        }

        if !self.dir_ready {
            std::fs::create_dir_all(&self.output_dir).map_err(|e| WriteError::CreateDir {
                path: self.output_dir.clone(),
                src: e.to_string(),
            })?;
            self.dir_ready = true;
        }

        let path = self.output_dir.join(frame_file_name(ordinal));
        image
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|e| WriteError::WriteFrame {
                path: path.clone(),
                src: e.to_string(),
            })?;

        Ok(Some(path))
    }
}

/// Drives a single video from decoding through to persisted frames.
///
/// Everything here is owned by the pipeline instance, so any number of
/// pipelines can run side by side as long as their output directories differ.
pub struct VideoPipeline<'a> {
    job: &'a VideoJob,
    cfg: &'a FilterConfig,
    selector: FrameSelector,
    writer: FrameWriter,
    counts: FrameCounts,
    saved_frames: Vec<SavedFrame>,
}

impl<'a> VideoPipeline<'a> {
    pub fn new(job: &'a VideoJob, cfg: &'a FilterConfig) -> Self {
        Self {
            job,
            cfg,
            selector: FrameSelector::new(cfg),
            writer: FrameWriter::new(job.output_dir(), cfg.dry_run()),
            counts: FrameCounts::default(),
            saved_frames: vec![],
        }
    }

    /// Run to completion. Decode and write errors end the video early but are
    /// recorded in the result rather than returned.
    pub fn run<D: FrameDecoder>(mut self, decoder: &D) -> PipelineResult {
        info!(
            target: "video_pipeline",
            "Processing {} -> {}{}",
            self.job.src_path().display(),
            self.job.output_dir().display(),
            if self.cfg.dry_run() { " (dry run)" } else { "" }
        );

        let failure = self.process(decoder).err();
        self.log_outcome(failure.as_ref());

        PipelineResult::new(self.job.clone(), self.counts, self.saved_frames, failure)
    }

    fn process<D: FrameDecoder>(&mut self, decoder: &D) -> Result<(), LibError> {
        //the source (and its decoder process) is dropped on every exit path from here.
        let frames = decoder.open(self.job.src_path(), self.cfg.frame_interval())?;

        for frame in frames {
            self.process_frame(frame?)?;
        }

        Ok(())
    }

    fn process_frame(&mut self, frame: DecodedFrame) -> Result<(), LibError> {
        self.counts.scanned += 1;
        let DecodedFrame { index, image } = frame;

        let verdict = self.selector.evaluate(&image);
        let mut ordinal = None;
        match verdict {
            FrameVerdict::RejectedBlur { .. } => self.counts.rejected_blur += 1,
            FrameVerdict::RejectedDuplicate { .. } => self.counts.rejected_duplicate += 1,
            FrameVerdict::Accepted { .. } => {
                let next_ordinal = self.counts.accepted;
                let rotated = rotate(image, self.cfg.rotation());

                if let Some(path) = self.writer.write(next_ordinal, &rotated)? {
                    self.saved_frames.push(SavedFrame {
                        ordinal: next_ordinal,
                        frame_index: index,
                        path,
                    });
                }
                self.counts.accepted += 1;
                ordinal = Some(next_ordinal);
            }
        }

        if self.cfg.verbose() {
            self.log_decision(index, &verdict, ordinal);
        }

        Ok(())
    }

    fn log_decision(&self, index: u64, verdict: &FrameVerdict, ordinal: Option<u64>) {
        let name = self.job.src_path().display();

        match *verdict {
            FrameVerdict::RejectedBlur { sharpness } => debug!(
                target: "frame_decision",
                "{}: frame {} rejected as blurry (sharpness {:.2} < {})",
                name,
                index,
                sharpness,
                self.cfg.sharpness_threshold()
            ),
            FrameVerdict::RejectedDuplicate { similarity, .. } => debug!(
                target: "frame_decision",
                "{}: frame {} rejected as duplicate (similarity {:.4} >= {:.4})",
                name,
                index,
                similarity,
                self.cfg.duplicate_threshold()
            ),
            FrameVerdict::Accepted { sharpness, similarity } => debug!(
                target: "frame_decision",
                "{}: frame {} accepted as #{} (sharpness {:.2}, similarity {:.4})",
                name,
                index,
                ordinal.unwrap_or_default(),
                sharpness,
                similarity
            ),
        }
    }

    fn log_outcome(&self, failure: Option<&LibError>) {
        let c = &self.counts;
        match failure {
            None => info!(
                target: "video_pipeline",
                "{}: scanned {}, accepted {}, blurry {}, duplicate {}",
                self.job.src_path().display(),
                c.scanned,
                c.accepted,
                c.rejected_blur,
                c.rejected_duplicate
            ),
            Some(e) => warn!(
                target: "video_pipeline",
                "{}: stopped after {} frames ({} accepted): {}",
                self.job.src_path().display(),
                c.scanned,
                c.accepted,
                e
            ),
        }
    }
}

pub fn run_video_pipeline<D: FrameDecoder>(job: &VideoJob, cfg: &FilterConfig, decoder: &D) -> PipelineResult {
    VideoPipeline::new(job, cfg).run(decoder)
}
