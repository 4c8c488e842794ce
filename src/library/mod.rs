pub mod definitions;
pub mod errors;
pub mod file_set;
pub mod frame_pipeline;
pub mod frame_scoring;
pub mod frame_source;
mod library_cfg;
mod utils;
pub mod video_job;

//exports to app and tests
pub use errors::{ConfigError, LibError};
pub use file_set::{FileSet, FileSetError};
pub use frame_pipeline::{run_batch, BatchReport};
pub use library_cfg::{FilterConfig, Rotation};
pub(crate) use utils::{ffmpeg_ops, img_ops};
pub use video_job::{OutputPlan, VideoJob};
