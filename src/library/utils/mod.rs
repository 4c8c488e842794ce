pub mod ffmpeg_ops;
pub mod img_ops;
