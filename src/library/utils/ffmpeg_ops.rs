use std::{
    ffi::OsString,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
    thread::JoinHandle,
};

use serde::Deserialize;

use super::img_ops::bytes_to_image;
use crate::library::{
    errors::DecodeError,
    frame_source::{DecodedFrame, FrameDecoder},
};

//sometimes ffmpeg creates very long error messages. Limit them to the first 500 characters
fn truncate_tool_output(msg: &str) -> String {
    msg.trim().chars().take(500).collect::<String>()
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoGeometry {
    pub dimensions_x: u32,
    pub dimensions_y: u32,
    pub frame_count: Option<u64>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
}

fn open_error(src_path: &Path, src: impl Into<String>) -> DecodeError {
    DecodeError::Open {
        path: src_path.to_path_buf(),
        src: src.into(),
    }
}

pub fn probe_video<P: AsRef<Path>>(src_path: P) -> Result<VideoGeometry, DecodeError> {
    let src_path = src_path.as_ref();

    #[rustfmt::skip]
    let output = Command::new("ffprobe")
        .args(&[
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,nb_frames",
            "-of", "json",
        ])
        .arg(escaped_path(src_path))
        .output()
        .map_err(|e| open_error(src_path, format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(open_error(
            src_path,
            truncate_tool_output(&String::from_utf8_lossy(&output.stderr)),
        ));
    }

    parse_probe_output(src_path, &output.stdout)
}

fn parse_probe_output(src_path: &Path, stdout: &[u8]) -> Result<VideoGeometry, DecodeError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| open_error(src_path, format!("unreadable ffprobe output: {}", e)))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| open_error(src_path, "no video stream found"))?;

    match (stream.width, stream.height) {
        (Some(dimensions_x), Some(dimensions_y)) if dimensions_x > 0 && dimensions_y > 0 => Ok(VideoGeometry {
            dimensions_x,
            dimensions_y,
            //"N/A" for containers which do not record a frame count.
            frame_count: stream.nb_frames.and_then(|n| n.parse().ok()),
        }),
        _ => Err(open_error(src_path, "video stream has no usable dimensions")),
    }
}

/// Decodes videos by piping raw RGB frames out of an `ffmpeg` child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegDecoder;

impl FrameDecoder for FfmpegDecoder {
    type Source = FfmpegFrameSource;

    fn open(&self, src_path: &Path, interval: u32) -> Result<Self::Source, DecodeError> {
        FfmpegFrameSource::spawn(src_path, interval)
    }
}

pub struct FfmpegFrameSource {
    src_path: PathBuf,
    child: Child,
    stdout: ChildStdout,
    stderr_drain: Option<JoinHandle<String>>,
    geometry: VideoGeometry,
    interval: u64,
    frames_read: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    pub fn spawn(src_path: &Path, interval: u32) -> Result<Self, DecodeError> {
        let geometry = probe_video(src_path)?;
        let interval = std::cmp::max(interval, 1);

        //select every nth decoded frame; passthrough vsync stops ffmpeg duplicating/dropping frames.
        let mut filter_args: Vec<String> = vec![];
        if interval > 1 {
            filter_args.push("-vf".to_string());
            filter_args.push(format!("select=not(mod(n\\,{}))", interval));
        }

        #[rustfmt::skip]
        let spawn_result = Command::new("ffmpeg")
            .args(&[
                "-hide_banner",
                "-loglevel", "error",
                "-nostats",
                "-noautorotate",
                "-i",
            ])
            .arg(escaped_path(src_path))
            .args(&["-map", "0:v:0", "-an", "-sn"])
            .args(&filter_args)
            .args(&[
                "-vsync", "0",
                "-pix_fmt", "rgb24",
                "-f", "rawvideo",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = spawn_result.map_err(|e| open_error(src_path, format!("failed to run ffmpeg: {}", e)))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                reap(&mut child);
                return Err(open_error(src_path, "ffmpeg stdout was not captured"));
            }
        };

        //stderr is drained on its own thread so that a chatty ffmpeg can never fill the
        //pipe and stall while we are blocked reading frames from stdout.
        let stderr_drain = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut msg = String::new();
                let _ = stderr.read_to_string(&mut msg);
                msg
            })
        });

        debug!(
            target: "video_pipeline",
            "Decoding {} ({}x{}, {} frames, interval {})",
            src_path.display(),
            geometry.dimensions_x,
            geometry.dimensions_y,
            geometry.frame_count.map(|n| n.to_string()).unwrap_or_else(|| "unknown".to_string()),
            interval
        );

        Ok(Self {
            src_path: src_path.to_path_buf(),
            child,
            stdout,
            stderr_drain,
            geometry,
            interval: interval as u64,
            frames_read: 0,
            finished: false,
        })
    }

    fn frame_len(&self) -> usize {
        self.geometry.dimensions_x as usize * self.geometry.dimensions_y as usize * 3
    }

    fn next_index(&self) -> u64 {
        self.frames_read * self.interval
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr_drain
            .take()
            .and_then(|handle| handle.join().ok())
            .map(|msg| truncate_tool_output(&msg))
            .unwrap_or_default()
    }

    //called once ffmpeg has closed stdout. Reports a failure if ffmpeg exited uncleanly.
    fn finish(&mut self) -> Option<DecodeError> {
        self.finished = true;
        let status = self.child.wait();
        let stderr = self.collect_stderr();

        match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(DecodeError::Frame {
                path: self.src_path.clone(),
                frame_index: self.next_index(),
                src: if stderr.is_empty() {
                    format!("ffmpeg exited with {}", status)
                } else {
                    stderr
                },
            }),
            Err(e) => Some(DecodeError::Frame {
                path: self.src_path.clone(),
                frame_index: self.next_index(),
                src: format!("failed to wait for ffmpeg: {}", e),
            }),
        }
    }

    fn abort(&mut self, e: DecodeError) -> Option<Result<DecodedFrame, DecodeError>> {
        self.finished = true;
        reap(&mut self.child);
        let _ = self.collect_stderr();
        Some(Err(e))
    }
}

impl Iterator for FfmpegFrameSource {
    type Item = Result<DecodedFrame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let frame_index = self.next_index();
        let expected = self.frame_len();
        let mut buf = vec![0; expected];

        match read_full(&mut self.stdout, &mut buf) {
            Ok(0) => self.finish().map(Err),
            Ok(got) if got < expected => {
                let e = DecodeError::Truncated {
                    path: self.src_path.clone(),
                    frame_index,
                    got,
                    expected,
                };
                self.abort(e)
            }
            Ok(_) => match bytes_to_image(buf, self.geometry.dimensions_x, self.geometry.dimensions_y) {
                Ok(image) => {
                    self.frames_read += 1;
                    Some(Ok(DecodedFrame::new(frame_index, image)))
                }
                Err(e) => {
                    let e = DecodeError::Frame {
                        path: self.src_path.clone(),
                        frame_index,
                        src: e.to_string(),
                    };
                    self.abort(e)
                }
            },
            Err(e) => {
                let e = DecodeError::Frame {
                    path: self.src_path.clone(),
                    frame_index,
                    src: e.to_string(),
                };
                self.abort(e)
            }
        }
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if !self.finished {
            reap(&mut self.child);
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

//Fill buf as far as possible. Returns fewer bytes than buf.len() only at end of stream.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn escaped_path(path: impl AsRef<Path>) -> OsString {
    OsString::from(path.as_ref().as_os_str())
}
