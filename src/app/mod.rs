mod app_cfg;
mod app_fns;
mod arg_parse;
mod errors;

//exports
pub use app_cfg::{AppCfg, DirCfg, OutputCfg, ReportVerbosity};
pub use app_fns::run_app;
pub use arg_parse::parse_args;
pub use errors::AppError;
