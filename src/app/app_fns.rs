use std::{
    error::Error,
    io::{self, BufWriter},
    path::Path,
};

use crate::{
    app::*,
    library::{ffmpeg_ops::FfmpegDecoder, run_batch, BatchReport, FileSet, OutputPlan, VideoJob},
};

pub fn run_app() -> i32 {
    //Parse arguments and bail early if there is an error.
    let cfg = match arg_parse::parse_args() {
        Ok(cfg) => {
            configure_logs(cfg.output_cfg.verbosity);
            cfg
        }
        Err(fatal) => {
            //Errors are reported using TermLogger, which is configured from the argument parser.
            //But if a fatal error occurred during parsing the logger would not be configured when
            //we attempt to print the fatal error. So if a fatal error occurs, start the logger
            //before returning the error.
            configure_logs(ReportVerbosity::Verbose);
            print_fatal_err(&fatal, ReportVerbosity::Verbose);
            return 1;
        }
    };

    match run_app_inner(&cfg) {
        Ok((report, nonfatal_errs)) => {
            print_nonfatal_errs(&nonfatal_errs);
            print_report(&report, &cfg.output_cfg);
            0
        }
        Err(fatal_error) => {
            print_fatal_err(&fatal_error, cfg.output_cfg.verbosity);
            1
        }
    }
}

fn run_app_inner(cfg: &AppCfg) -> Result<(BatchReport, Vec<AppError>), AppError> {
    let (jobs, nonfatal_errs) = plan_batch(cfg)?;

    //Check that ffmpeg and ffprobe exist on the command line, and bail if not.
    //Otherwise every video would fail with the same "cannot spawn ffmpeg" error.
    if !ffmpeg_cmdline_utils::ffmpeg_and_ffprobe_are_callable() {
        return Err(AppError::FfmpegNotFound);
    }

    let report = run_batch(&jobs, &cfg.filter_cfg, &FfmpegDecoder, cfg.workers)?;

    Ok((report, nonfatal_errs))
}

//Everything that must succeed before any video is touched: discovery, job
//planning and preparing the output root.
fn plan_batch(cfg: &AppCfg) -> Result<(Vec<VideoJob>, Vec<AppError>), AppError> {
    let dir_cfg = &cfg.dir_cfg;

    let file_set = FileSet::new(&dir_cfg.input_path, dir_cfg.recursive, dir_cfg.limit);
    let (video_paths, search_errs) = file_set.enumerate_from_fs()?;
    let nonfatal_errs = search_errs.into_iter().map(AppError::from).collect::<Vec<_>>();

    if video_paths.is_empty() {
        return Err(AppError::NoVideosFound(dir_cfg.input_path.clone()));
    }

    let plan = OutputPlan::new(
        &dir_cfg.input_path,
        file_set.source_is_dir(),
        dir_cfg.output_path.as_deref(),
    );

    if !cfg.filter_cfg.dry_run() {
        prepare_output_root(&plan.root)?;
    }

    let jobs = plan.plan_jobs(video_paths);
    info!(
        target: "batch",
        "Found {} videos at {}, writing frames under {}",
        jobs.len(),
        dir_cfg.input_path.display(),
        plan.root.display()
    );

    let filter_cfg = &cfg.filter_cfg;
    debug!(
        target: "batch",
        "Every {} frames, sharpness >= {}, similarity < {}, rotated {} degrees{}",
        filter_cfg.frame_interval(),
        filter_cfg.sharpness_threshold(),
        filter_cfg.duplicate_threshold(),
        filter_cfg.rotation().degrees(),
        if filter_cfg.dry_run() { ", dry run" } else { "" }
    );

    Ok((jobs, nonfatal_errs))
}

fn prepare_output_root(root: &Path) -> Result<(), AppError> {
    let not_writable = |e| AppError::OutputNotWritable(root.to_path_buf(), e);

    std::fs::create_dir_all(root).map_err(not_writable)?;

    //an empty root means "the current directory".
    let metadata_path = if root.as_os_str().is_empty() { Path::new(".") } else { root };
    let metadata = std::fs::metadata(metadata_path).map_err(not_writable)?;
    if metadata.permissions().readonly() {
        return Err(not_writable(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "directory is read-only",
        )));
    }

    Ok(())
}

fn print_fatal_err(fatal_err: &AppError, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

fn print_nonfatal_errs(nonfatal_errs: &[AppError]) {
    for err in nonfatal_errs {
        warn!("{}", err);
    }
}

fn print_report(report: &BatchReport, output_cfg: &OutputCfg) {
    let summary = &report.summary;

    info!(
        target: "batch",
        "Videos: {} attempted, {} succeeded, {} failed",
        summary.videos_attempted,
        summary.videos_succeeded,
        summary.videos_failed
    );
    info!(
        target: "batch",
        "Frames: {} scanned, {} accepted, {} rejected as blurry, {} rejected as duplicates",
        summary.frames_scanned,
        summary.frames_accepted,
        summary.frames_rejected_blur,
        summary.frames_rejected_duplicate
    );

    if summary.videos_failed > 0 {
        let decode_failures = report.failures().filter(|(_, e)| e.is_decode_error()).count();
        let write_failures = report.failures().filter(|(_, e)| e.is_write_error()).count();
        warn!(
            target: "batch",
            "{} videos failed ({} unreadable, {} could not be written, {} other)",
            summary.videos_failed,
            decode_failures,
            write_failures,
            summary.videos_failed as usize - decode_failures - write_failures
        );
    }

    for (job, failure) in report.failures() {
        warn!(target: "batch", "Failed: {}: {}", job.src_path().display(), failure);
    }

    if output_cfg.json_output {
        let stdout = BufWriter::new(std::io::stdout());
        serde_json::to_writer_pretty(stdout, report).unwrap_or_default();
        println!();
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Off);
    cfg.set_thread_level(LevelFilter::Off);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    //timestamps only when verbose.
    if verbosity == ReportVerbosity::Verbose {
        cfg.set_time_level(LevelFilter::Trace);
    } else {
        cfg.set_time_level(LevelFilter::Off);
    }

    //Carry on without logs rather than refuse to run.
    if let Err(e) = TermLogger::init(min_loglevel, cfg.build(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
