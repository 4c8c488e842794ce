use std::{
    convert::TryFrom,
    ffi::OsString,
    iter::once,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ArgMatches;

use crate::{
    app::*,
    library::{
        definitions::{DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_FRAME_INTERVAL, DEFAULT_SHARPNESS_THRESHOLD},
        ConfigError, FilterConfig, Rotation,
    },
};

const INPUT_PATH: &str = "Input path";
const OUTPUT_PATH: &str = "Output path";
const INTERVAL: &str = "interval";
const SHARPNESS: &str = "sharpness";
const DUPLICATE: &str = "duplicate";
const ROTATE: &str = "rotate";
const DRY_RUN: &str = "Dry run";
const LIMIT: &str = "limit";
const WORKERS: &str = "workers";
const RECURSIVE: &str = "Recursive";
const JSON_OUTPUT: &str = "Json output";
const ARGS_FILE: &str = "Args file";
const VERBOSE: &str = "Verbose";
const QUIET: &str = "Quiet";

const PROGRAM_NAME: &str = "vid_frame_sieve";

pub fn parse_args() -> Result<AppCfg, AppError> {
    let matches = build_app().get_matches();

    //first check if a Args file is present. If so, then read it and use the arguments from within.
    match matches.value_of_os(ARGS_FILE) {
        Some(args_fname) => {
            let args = read_args_file(Path::new(args_fname))?;

            //slight bodge: need to prepend program name to as this is what would be seen in a direct shell invocation.
            let args = once(OsString::from(PROGRAM_NAME)).chain(args);
            let matches = build_app().get_matches_from(args);
            cfg_from_matches(&matches)
        }
        None => cfg_from_matches(&matches),
    }
}

fn build_app() -> clap::App<'static, 'static> {
    //args are not added through method chaining because this appears to break rustfmt.
    let mut clap_app = clap::App::new("Video frame sieve")
        .version("0.1")
        .about("Extracts sharp, non-duplicate frames from video files");

    clap_app = clap_app.arg(
        clap::Arg::with_name(INPUT_PATH)
            .index(1)
            .default_value(".")
            .help("A video file, or a directory containing video files")
            .display_order(1),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(OUTPUT_PATH)
            .short("o")
            .long("output")
            .takes_value(true)
            .help("Root directory for extracted frames. Each video's frames are written to a subdirectory named after the video.")
            .long_help(concat!(
                "Root directory for extracted frames. Each video's frames are written to a subdirectory ",
                "named after the video. Defaults to 'Processed_Frames' inside the input directory, or for ",
                "a single video file, to a '<name>_frames' directory next to the video."
            ))
            .display_order(2),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(INTERVAL)
            .short("i")
            .long("interval")
            .takes_value(true)
            .default_value("1")
            .help("Only consider every Nth frame of each video")
            .display_order(3),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(SHARPNESS)
            .short("s")
            .long("sharpness")
            .takes_value(true)
            .default_value("100")
            .help("Frames whose sharpness score is below this value are discarded as blurry")
            .display_order(4),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(DUPLICATE)
            .short("d")
            .long("duplicate")
            .takes_value(true)
            .default_value("1.0")
            .help("Frames at least this similar (0.0 to 1.0) to the last kept frame are discarded as duplicates")
            .display_order(5),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(ROTATE)
            .short("r")
            .long("rotate")
            .takes_value(true)
            .default_value("0")
            .help("Rotate kept frames clockwise by 0, 90, 180 or 270 degrees")
            .display_order(6),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(DRY_RUN)
            .long("dry-run")
            .help("Score frames and report what would be kept, without writing anything"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(LIMIT)
            .short("l")
            .long("limit")
            .takes_value(true)
            .help("Process at most this many videos from a directory"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(RECURSIVE)
            .short("R")
            .long("recursive")
            .help("Also search subdirectories of the input directory for videos"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(WORKERS)
            .short("w")
            .long("workers")
            .takes_value(true)
            .help("Number of videos to process in parallel. Defaults to the number of CPUs"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(JSON_OUTPUT)
            .long("json-output")
            .help("Print the batch report in json format"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(ARGS_FILE)
            .long("args-file")
            .takes_value(true)
            .help("Read command line arguments from a file"),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(VERBOSE)
            .short("v")
            .long("verbose")
            .help("Log every accept/reject decision with its scores")
            .conflicts_with(QUIET),
    );

    clap_app = clap_app.arg(
        clap::Arg::with_name(QUIET)
            .short("q")
            .long("quiet")
            .help("Quiet verbosity: Only print errors, warnings and output"),
    );

    clap_app
}

fn read_args_file(args_fname: &Path) -> Result<Vec<OsString>, AppError> {
    let args = match std::fs::read_to_string(args_fname) {
        Ok(args) => args,
        Err(e) => return Err(AppError::ArgsFileNotFound(args_fname.to_path_buf(), e)),
    };

    //now strip comments from the args file
    let args_file_contents = match comment::shell::strip(args) {
        Ok(args_file_contents) => args_file_contents,
        Err(e) => return Err(AppError::ArgsFileParse(args_fname.to_path_buf(), e.to_string())),
    };

    //the arguments file needs to be split into args in the same way as the shell would do it.
    //call out to an external create for this.
    let args = match shell_words::split(&args_file_contents) {
        Ok(args) => args,
        Err(e) => return Err(AppError::ArgsFileParse(args_fname.to_path_buf(), e.to_string())),
    };

    Ok(args.into_iter().map(OsString::from).collect())
}

fn parse_value<T: FromStr>(matches: &ArgMatches, arg: &str) -> Result<Option<T>, AppError> {
    match matches.value_of(arg) {
        Some(value) => match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_e) => Err(AppError::ParseArgument {
                arg: arg.to_string(),
                value: value.to_string(),
            }),
        },
        None => Ok(None),
    }
}

fn cfg_from_matches(matches: &ArgMatches) -> Result<AppCfg, AppError> {
    let verbosity = if matches.is_present(VERBOSE) {
        ReportVerbosity::Verbose
    } else if matches.is_present(QUIET) {
        ReportVerbosity::Quiet
    } else {
        ReportVerbosity::Default
    };

    let rotation = Rotation::try_from(parse_value::<u32>(matches, ROTATE)?.unwrap_or(0))?;

    let filter_cfg = FilterConfig::new(
        parse_value(matches, SHARPNESS)?.unwrap_or(DEFAULT_SHARPNESS_THRESHOLD),
        parse_value(matches, DUPLICATE)?.unwrap_or(DEFAULT_DUPLICATE_THRESHOLD),
        parse_value(matches, INTERVAL)?.unwrap_or(DEFAULT_FRAME_INTERVAL),
        rotation,
        matches.is_present(DRY_RUN),
        verbosity == ReportVerbosity::Verbose,
    )?;

    let limit = parse_value::<usize>(matches, LIMIT)?;
    if let Some(0) = limit {
        return Err(ConfigError::Limit(0).into());
    }

    let workers = parse_value::<usize>(matches, WORKERS)?;
    if let Some(0) = workers {
        return Err(ConfigError::Workers(0).into());
    }

    let dir_cfg = DirCfg {
        input_path: matches
            .value_of_os(INPUT_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        output_path: matches.value_of_os(OUTPUT_PATH).map(PathBuf::from),
        recursive: matches.is_present(RECURSIVE),
        limit,
    };

    let output_cfg = OutputCfg {
        json_output: matches.is_present(JSON_OUTPUT),
        verbosity,
    };

    Ok(AppCfg {
        dir_cfg,
        filter_cfg,
        workers,
        output_cfg,
    })
}
