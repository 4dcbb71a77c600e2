//! Lossless concatenation of already-encoded recordings.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::command::run_ffmpeg;
use crate::error::{MediaError, MediaResult};

/// Concatenate same-codec videos into `output` without re-encoding.
///
/// Inputs are joined in the order given; callers are responsible for
/// sorting them (e.g., by recording time). Uses ffmpeg's concat demuxer
/// with stream copy, so all inputs must share codec parameters.
pub async fn concat_videos(inputs: &[PathBuf], output: impl AsRef<Path>) -> MediaResult<()> {
    let output = output.as_ref();

    if inputs.is_empty() {
        return Err(MediaError::NoInputs);
    }
    for input in inputs {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.clone()));
        }
    }

    let manifest = output.with_extension("concat.txt");
    std::fs::write(&manifest, build_manifest(inputs))?;

    let result = run_ffmpeg([
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.to_string_lossy().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().to_string(),
    ])
    .await;

    // Manifest is scratch either way
    let _ = std::fs::remove_file(&manifest);
    result?;

    info!(
        inputs = inputs.len(),
        output = %output.display(),
        "Concatenated videos"
    );

    Ok(())
}

/// Build a concat-demuxer manifest. Single quotes in paths are escaped
/// per the demuxer's quoting rules.
fn build_manifest(inputs: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for input in inputs {
        let escaped = input.to_string_lossy().replace('\'', "'\\''");
        manifest.push_str(&format!("file '{escaped}'\n"));
    }
    manifest
}
