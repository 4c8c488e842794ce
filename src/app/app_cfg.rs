use std::path::PathBuf;

use crate::library::FilterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub json_output: bool,
    pub verbosity: ReportVerbosity,
}

#[derive(Debug, Clone)]
pub struct DirCfg {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub recursive: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub dir_cfg: DirCfg,
    pub filter_cfg: FilterConfig,
    pub workers: Option<usize>,

    pub output_cfg: OutputCfg,
}
