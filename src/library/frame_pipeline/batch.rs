use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::mpsc,
};

use rayon::prelude::*;

use super::{
    results::{BatchReport, BatchSummary, PipelineResult},
    video_pipeline::run_video_pipeline,
};
use crate::library::{
    errors::{ConfigError, LibError},
    frame_source::FrameDecoder,
    video_job::VideoJob,
    FilterConfig,
};

/// Runs every job on a pool of `workers` threads (rayon's default, one per
/// CPU, when `None`) and gathers the results.
///
/// Each video is an isolated task: decode errors, write errors and panics are
/// all captured in that video's `PipelineResult` and never stop its siblings.
/// The only errors returned here are those which prevent the batch starting.
pub fn run_batch<D: FrameDecoder>(
    jobs: &[VideoJob],
    cfg: &FilterConfig,
    decoder: &D,
    workers: Option<usize>,
) -> Result<BatchReport, LibError> {
    let mut pool_builder = rayon::ThreadPoolBuilder::new();
    if let Some(workers) = workers {
        if workers == 0 {
            return Err(ConfigError::Workers(workers).into());
        }
        pool_builder = pool_builder.num_threads(workers);
    }
    let pool = pool_builder
        .thread_name(|i| format!("frame-worker-{}", i))
        .build()
        .map_err(|e| LibError::ThreadPool(e.to_string()))?;

    info!(
        target: "batch",
        "Processing {} videos using {} workers",
        jobs.len(),
        pool.current_num_threads()
    );

    let (sender, receiver) = mpsc::channel();

    //one job per task, so a long video never holds up the videos queued behind it.
    pool.install(|| {
        jobs.par_iter().with_max_len(1).for_each_with(sender, |sender, job| {
            let result = run_isolated(job, cfg, decoder);
            //the receiver outlives the pool, so this cannot fail.
            let _ = sender.send(result);
        })
    });

    //results arrive in completion order.
    let mut summary = BatchSummary::default();
    let mut results = vec![];
    for result in receiver {
        summary.add(&result);
        results.push(result);
    }

    results.sort_by_key(|result| result.job().index());

    Ok(BatchReport { summary, results })
}

fn run_isolated<D: FrameDecoder>(job: &VideoJob, cfg: &FilterConfig, decoder: &D) -> PipelineResult {
    catch_unwind(AssertUnwindSafe(|| run_video_pipeline(job, cfg, decoder))).unwrap_or_else(|panic| {
        let e = LibError::WorkerPanic(panic_message(&*panic));
        warn!(target: "batch", "{}: {}", job.src_path().display(), e);
        PipelineResult::failed(job.clone(), e)
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
