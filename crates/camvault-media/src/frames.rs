//! Sampled frame extraction for face analysis.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::run_ffmpeg;
use crate::error::{MediaError, MediaResult};

/// One extracted frame, identified by its index in the source video.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Zero-based frame index in the source video
    pub frame_index: u64,
    /// Extracted PNG on disk
    pub path: PathBuf,
}

/// Extract every `frame_skip`-th frame of a video as PNG files into `dir`.
///
/// Frames are written as `000001.png`, `000002.png`, ... in sample order;
/// the k-th extracted frame corresponds to source frame `k * frame_skip`.
/// The caller owns `dir` (typically a `TempDir`) and its contents.
pub async fn sample_frames(
    video: impl AsRef<Path>,
    frame_skip: u32,
    dir: impl AsRef<Path>,
) -> MediaResult<Vec<SampledFrame>> {
    let video = video.as_ref();
    let dir = dir.as_ref();

    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    let frame_skip = frame_skip.max(1);
    let pattern = dir.join("%06d.png");

    run_ffmpeg([
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-vf".to_string(),
        format!("select='not(mod(n\\,{frame_skip}))'"),
        "-vsync".to_string(),
        "vfr".to_string(),
        pattern.to_string_lossy().to_string(),
    ])
    .await?;

    let mut frames = collect_frames(dir, frame_skip)?;
    frames.sort_by_key(|f| f.frame_index);

    debug!(
        video = %video.display(),
        frame_skip,
        sampled = frames.len(),
        "Extracted sample frames"
    );

    Ok(frames)
}

/// Map the numbered PNG outputs back to source frame indices.
fn collect_frames(dir: &Path, frame_skip: u32) -> MediaResult<Vec<SampledFrame>> {
    let mut frames = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map(|e| e != "png").unwrap_or(true) {
            continue;
        }

        // ffmpeg's image2 muxer numbers outputs from 1
        let ordinal: u64 = match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
        {
            Some(n) => n,
            None => continue,
        };
        if ordinal == 0 {
            continue;
        }

        frames.push(SampledFrame {
            frame_index: (ordinal - 1) * frame_skip as u64,
            path,
        });
    }

    Ok(frames)
}
