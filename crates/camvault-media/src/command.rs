//! FFmpeg subprocess invocation.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Run ffmpeg with the given arguments, capturing stderr.
///
/// A non-zero exit status is a hard failure carrying the captured
/// stderr and exit code.
pub async fn run_ffmpeg<I, S>(args: I) -> MediaResult<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    check_ffmpeg()?;

    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if output.status.success() {
        Ok(())
    } else {
        Err(MediaError::ffmpeg_failed(
            "FFmpeg exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ))
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
