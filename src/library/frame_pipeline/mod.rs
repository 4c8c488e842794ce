mod batch;
mod frame_selector;
mod results;
mod video_pipeline;


pub use batch::run_batch;
pub use frame_selector::{FrameSelector, FrameVerdict};
pub use results::{BatchReport, BatchSummary, FrameCounts, PipelineResult, SavedFrame};
pub use video_pipeline::run_video_pipeline;
