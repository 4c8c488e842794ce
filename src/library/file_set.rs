use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    result::Result,
};

use itertools::{Either::*, Itertools};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use super::definitions::VIDEO_EXTENSIONS;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileSetError {
    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Path is neither a file nor a directory: {0}")]
    NotFileOrDirError(PathBuf),

    #[error("File enumeration failed at {path}: {src}")]
    EnumerationError { path: PathBuf, src: String },
}

impl From<walkdir::Error> for FileSetError {
    fn from(e: walkdir::Error) -> Self {
        Self::EnumerationError {
            path: e.path().map(Path::to_path_buf).unwrap_or_default(),
            src: format!("{}", e),
        }
    }
}

/// The videos named by one input path: either the file itself, or the video
/// files found in a directory.
pub struct FileSet {
    source_path: PathBuf,
    recursive: bool,
    limit: Option<usize>,
}

impl FileSet {
    pub fn new(source_path: impl AsRef<Path>, recursive: bool, limit: Option<usize>) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            recursive,
            limit,
        }
    }

    pub fn source_is_dir(&self) -> bool {
        self.source_path.is_dir()
    }

    /// Returns the enumerated videos plus any non-fatal errors hit while walking
    /// the directory. A missing input path is fatal.
    pub fn enumerate_from_fs(&self) -> Result<(Vec<PathBuf>, Vec<FileSetError>), FileSetError> {
        use FileSetError::*;

        let src = &self.source_path;
        if !src.exists() {
            return Err(PathNotFoundError(src.to_owned()));
        }

        //A file given explicitly is always taken, whatever its extension.
        if src.is_file() {
            return Ok((vec![src.to_owned()], vec![]));
        }

        if !src.is_dir() {
            return Err(NotFileOrDirError(src.to_owned()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let paths_to_enumerate = WalkDir::new(src)
            .max_depth(max_depth)
            .into_iter()
            .filter(|dir_entry_res| match &dir_entry_res {
                Ok(dir_entry) => Self::should_keep(dir_entry),
                Err(_) => true,
            });

        let (mut enumerated_paths, loading_errors): (Vec<_>, Vec<_>) = paths_to_enumerate
            .map(|dir_entry_res| dir_entry_res.map(|dir_entry| dir_entry.path().to_path_buf()))
            .partition_map(|dir_entry_res| match dir_entry_res {
                Ok(src_path) => Left(src_path),
                Err(e) => Right(e.into()),
            });

        //sort is required for deterministic outputs.
        enumerated_paths.sort();
        enumerated_paths.dedup();

        if let Some(limit) = self.limit {
            enumerated_paths.truncate(limit);
        }

        Ok((enumerated_paths, loading_errors))
    }

    fn should_keep(x: &walkdir::DirEntry) -> bool {
        x.path().is_file() && has_video_extension(x.path())
    }
}

pub fn has_video_extension(path: impl AsRef<Path>) -> bool {
    let ext = path
        .as_ref()
        .extension()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default()
        .to_lowercase();

    VIDEO_EXTENSIONS.iter().any(|&video_ext| video_ext == ext)
}
