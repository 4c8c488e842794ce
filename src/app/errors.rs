use std::path::PathBuf;

use thiserror::Error;

use crate::library::{ConfigError, FileSetError, LibError};

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    // Argument parsing
    #[error("Args file not found at {0}")]
    ArgsFileNotFound(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse args file at given location: {0}: {1}")]
    ArgsFileParse(PathBuf, String),

    #[error("could not parse value given for --{arg}: {value}")]
    ParseArgument { arg: String, value: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /////////////////////////////////
    // Input discovery.
    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Input path is neither a video file nor a directory: {0}")]
    InputNotFileOrDir(PathBuf),

    #[error("No video files found at {0}")]
    NoVideosFound(PathBuf),

    #[error("Video file search error: {0}")]
    FileSearchError(#[source] FileSetError),

    /////////////////////////////////
    // Output
    #[error("Output directory is not writable: {0}")]
    OutputNotWritable(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Lib(#[from] LibError),

    #[error(
        "Ffmpeg command not found. Vid Frame Sieve cannot run unless Ffmpeg is installed:
* Debian-based systems: 
    # apt-get install ffmpeg
* Yum-based systems: 
    # yum install ffmpeg
* Windows:
    1) Download the correct installer from <https://ffmpeg.org/download.html>
    2) run the installer and install ffmpeg to any directory
    3) add the directory into the PATH environment variable"
    )]
    FfmpegNotFound,
}

impl From<FileSetError> for AppError {
    fn from(e: FileSetError) -> Self {
        match e {
            FileSetError::PathNotFoundError(path) => Self::InputNotFound(path),
            FileSetError::NotFileOrDirError(path) => Self::InputNotFileOrDir(path),
            e @ FileSetError::EnumerationError { .. } => Self::FileSearchError(e),
        }
    }
}
