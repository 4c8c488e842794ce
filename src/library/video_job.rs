use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::definitions::{DEFAULT_OUTPUT_DIR_NAME, SINGLE_VIDEO_DIR_SUFFIX};

/// One input video and where its accepted frames go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoJob {
    index: usize,
    src_path: PathBuf,
    output_dir: PathBuf,
}

impl VideoJob {
    pub fn new(index: usize, src_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            index,
            src_path: src_path.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Where a batch writes: a root directory, and a suffix appended to each
/// video's directory name under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub root: PathBuf,
    pub dir_suffix: String,
}

impl OutputPlan {
    pub fn new(input_path: &Path, input_is_dir: bool, output: Option<&Path>) -> Self {
        match (output, input_is_dir) {
            (Some(output), _) => Self {
                root: output.to_path_buf(),
                dir_suffix: String::new(),
            },
            (None, true) => Self {
                root: input_path.join(DEFAULT_OUTPUT_DIR_NAME),
                dir_suffix: String::new(),
            },
            //a lone video writes next to itself, into "<stem>_frames".
            (None, false) => Self {
                root: input_path.parent().map(Path::to_path_buf).unwrap_or_default(),
                dir_suffix: SINGLE_VIDEO_DIR_SUFFIX.to_string(),
            },
        }
    }

    /// Assigns each video an index (in the given order) and a private output
    /// directory named after its file stem. Repeated stems get the job index
    /// appended (then a counter, if that name is taken too) so that no two
    /// jobs share a directory.
    pub fn plan_jobs(&self, video_paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Vec<VideoJob> {
        let mut used_names = HashSet::new();

        video_paths
            .into_iter()
            .enumerate()
            .map(|(index, src_path)| {
                let src_path = src_path.as_ref();
                let stem = src_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("video_{}", index));

                let mut name = format!("{}{}", stem, self.dir_suffix);
                let mut attempt = 0;
                while !used_names.insert(name.clone()) {
                    name = match attempt {
                        0 => format!("{}_{}{}", stem, index, self.dir_suffix),
                        n => format!("{}_{}_{}{}", stem, index, n, self.dir_suffix),
                    };
                    attempt += 1;
                }

                VideoJob::new(index, src_path, self.root.join(name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_input_defaults_to_processed_frames() {
        let plan = OutputPlan::new(Path::new("/videos"), true, None);
        let jobs = plan.plan_jobs(vec!["/videos/a.mp4", "/videos/b.mkv"]);

        assert_eq!(jobs[0], VideoJob::new(0, "/videos/a.mp4", "/videos/Processed_Frames/a"));
        assert_eq!(jobs[1], VideoJob::new(1, "/videos/b.mkv", "/videos/Processed_Frames/b"));
    }

    #[test]
    fn single_file_defaults_to_sibling_directory() {
        let plan = OutputPlan::new(Path::new("/videos/clip.mov"), false, None);
        let jobs = plan.plan_jobs(vec!["/videos/clip.mov"]);

        assert_eq!(jobs[0].output_dir(), Path::new("/videos/clip_frames"));
    }

    #[test]
    fn explicit_output_root_is_used() {
        let plan = OutputPlan::new(Path::new("/videos/clip.mov"), false, Some(Path::new("/out")));
        let jobs = plan.plan_jobs(vec!["/videos/clip.mov"]);
        assert_eq!(jobs[0].output_dir(), Path::new("/out/clip"));

        let plan = OutputPlan::new(Path::new("/videos"), true, Some(Path::new("/out")));
        let jobs = plan.plan_jobs(vec!["/videos/x.avi"]);
        assert_eq!(jobs[0].output_dir(), Path::new("/out/x"));
    }

    #[test]
    fn repeated_stems_get_distinct_directories() {
        let plan = OutputPlan::new(Path::new("/videos"), true, None);
        let jobs = plan.plan_jobs(vec!["/videos/a.mp4", "/videos/a.mov", "/videos/sub/a.mkv"]);

        let dirs = jobs.iter().map(|j| j.output_dir().to_path_buf()).collect::<HashSet<_>>();
        assert_eq!(dirs.len(), 3);
        assert_eq!(jobs[1].output_dir(), Path::new("/videos/Processed_Frames/a_1"));
        assert_eq!(jobs[2].index(), 2);
    }

    #[test]
    fn renamed_stems_do_not_collide_with_real_ones() {
        let plan = OutputPlan::new(Path::new("/v"), true, None);
        let jobs = plan.plan_jobs(vec!["/v/a.mp4", "/v/a_2.mp4", "/v/sub/a.mkv"]);

        let dirs = jobs.iter().map(|j| j.output_dir().to_path_buf()).collect::<HashSet<_>>();
        assert_eq!(dirs.len(), 3);
        assert_eq!(jobs[1].output_dir(), Path::new("/v/Processed_Frames/a_2"));
        assert_eq!(jobs[2].output_dir(), Path::new("/v/Processed_Frames/a_2_1"));

        //a later video whose real stem matches an earlier rename also moves aside.
        let jobs = plan.plan_jobs(vec!["/v/a.mp4", "/v/a.mov", "/v/a_1.mp4"]);
        let dirs = jobs.iter().map(|j| j.output_dir().to_path_buf()).collect::<HashSet<_>>();
        assert_eq!(dirs.len(), 3);
        assert_eq!(jobs[2].output_dir(), Path::new("/v/Processed_Frames/a_1_2"));
    }
}
