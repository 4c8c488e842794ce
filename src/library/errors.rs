use std::{fmt::Debug, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DecodeError {
    #[error("Could not open video {path}: {src}")]
    Open { path: PathBuf, src: String },

    #[error("Failed to decode frame {frame_index} of {path}: {src}")]
    Frame { path: PathBuf, frame_index: u64, src: String },

    #[error("Decoder output for frame {frame_index} of {path} was truncated ({got} of {expected} bytes)")]
    Truncated {
        path: PathBuf,
        frame_index: u64,
        got: usize,
        expected: usize,
    },
}

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WriteError {
    #[error("Failed to create output directory {path}: {src}")]
    CreateDir { path: PathBuf, src: String },

    #[error("Failed to write frame to {path}: {src}")]
    WriteFrame { path: PathBuf, src: String },
}

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConfigError {
    #[error("Frame interval must be at least 1 (got {0})")]
    Interval(u32),

    #[error("Duplicate threshold must be between 0.0 and 1.0 (got {0})")]
    DuplicateThreshold(f64),

    #[error("Rotation must be one of 0, 90, 180 or 270 degrees (got {0})")]
    Rotation(u32),

    #[error("Worker count must be at least 1 (got {0})")]
    Workers(usize),

    #[error("Video limit must be at least 1 (got {0})")]
    Limit(usize),
}

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LibError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Worker panicked while processing video: {0}")]
    WorkerPanic(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

impl LibError {
    pub fn is_decode_error(&self) -> bool {
        matches!(&self, Self::Decode(_))
    }

    pub fn is_write_error(&self) -> bool {
        matches!(&self, Self::Write(_))
    }
}
