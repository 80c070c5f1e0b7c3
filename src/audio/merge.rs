use crate::audio::fallback::{run_chain, Strategy};
use crate::audio::{check_ffmpeg, list_matching_files, parse_slide_ordinal};
use crate::error::{Result, SlidecastError};
use crate::script::Selection;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Default output filename when merging a whole directory.
pub const DEFAULT_MERGED_NAME: &str = "merged_slides.mp3";

const COPY_CODEC: &[&str] = &["-c", "copy"];
const REENCODE_CODEC: &[&str] = &["-c:a", "libmp3lame", "-b:a", "192k", "-ar", "44100", "-ac", "2"];

/// Collect merge inputs from a directory.
///
/// With an explicit selection, only `slide_<digits>.mp3` files whose ordinal
/// is selected are kept, ordered by that ordinal so inconsistent zero-padding
/// cannot scramble playback order. Without one, every pattern match is kept
/// in filename order. The output path is excluded from the inputs either way.
pub fn collect_merge_inputs(
    dir: &Path,
    pattern: &str,
    selection: &Selection,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let files = list_matching_files(dir, pattern)?;

    let mut inputs = match selection {
        Selection::All => files,
        Selection::Indices(_) => {
            let mut numbered: Vec<(usize, PathBuf)> = files
                .into_iter()
                .filter_map(|path| {
                    let ordinal = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .and_then(parse_slide_ordinal)?;
                    selection.contains(ordinal).then_some((ordinal, path))
                })
                .collect();
            numbered.sort_by_key(|(ordinal, _)| *ordinal);
            numbered.into_iter().map(|(_, path)| path).collect()
        }
    };

    // Never feed the output file back into its own merge.
    let output_abs = absolute(output);
    inputs.retain(|path| absolute(path) != output_abs);

    Ok(inputs)
}

/// Merge audio files into a single output, in the given order.
///
/// A single input is copied byte-for-byte. Multiple inputs go through the
/// ffmpeg concat demuxer: first with stream copy, then re-encoding to a
/// common format when the copy attempt fails or leaves an empty file.
pub fn merge_files(inputs: &[PathBuf], output: &Path, overwrite: bool) -> Result<()> {
    if inputs.is_empty() {
        return Err(SlidecastError::NoMatchingInputs(
            "nothing to merge".to_string(),
        ));
    }

    check_ffmpeg()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if inputs.len() == 1 {
        if output.exists() && !overwrite {
            return Err(SlidecastError::OutputExists(output.display().to_string()));
        }
        info!(
            "Copying single input {} to {}",
            inputs[0].display(),
            output.display()
        );
        fs::copy(&inputs[0], output)?;
        return Ok(());
    }

    // The manifest is a NamedTempFile: dropped, and therefore removed, on
    // every exit path below.
    let manifest = write_concat_manifest(inputs)?;
    let manifest_path = manifest.path().to_path_buf();
    let overwrite_flag = if overwrite { "-y" } else { "-n" };

    info!("Merging {} files (stream copy)...", inputs.len());

    let strategies: Vec<Strategy<()>> = vec![
        (
            "stream-copy",
            Box::new(|| run_concat(&manifest_path, output, overwrite_flag, COPY_CODEC)),
        ),
        (
            "re-encode",
            Box::new(|| {
                warn!("Stream copy failed or produced empty output, retrying with re-encode");
                run_concat(&manifest_path, output, overwrite_flag, REENCODE_CODEC)
            }),
        ),
    ];

    let outcome = run_chain(strategies);
    match outcome.value {
        Some((_, strategy)) => {
            debug!("Merge succeeded via {}", strategy);
            Ok(())
        }
        None => {
            let mut copy = String::new();
            let mut reencode = String::new();
            for (name, diagnostic) in outcome.failures {
                match name {
                    "stream-copy" => copy = diagnostic,
                    _ => reencode = diagnostic,
                }
            }
            Err(SlidecastError::MergeExhausted { copy, reencode })
        }
    }
}

/// Write the concat-demuxer manifest, one `file '<abs path>'` line per input.
fn write_concat_manifest(inputs: &[PathBuf]) -> Result<NamedTempFile> {
    let mut manifest = tempfile::Builder::new()
        .prefix("ffconcat_")
        .suffix(".txt")
        .tempfile()?;

    for input in inputs {
        // Absolute paths; quoting stays simple for typical POSIX paths.
        writeln!(manifest, "file '{}'", absolute(input).display())?;
    }
    manifest.flush()?;

    Ok(manifest)
}

fn run_concat(
    manifest: &Path,
    output: &Path,
    overwrite_flag: &str,
    codec: &[&str],
) -> std::result::Result<(), String> {
    let result = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", overwrite_flag])
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(manifest)
        .args(codec)
        .arg(output)
        .output()
        .map_err(|e| format!("failed to run ffmpeg: {e}"))?;

    let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();

    // A clean exit can still leave an empty file behind, so the output file
    // itself is part of the success condition.
    let produced = fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false);
    if result.status.success() && produced {
        return Ok(());
    }

    if stderr.is_empty() {
        Err(format!(
            "ffmpeg exited with {} and the output was missing or empty",
            result.status
        ))
    } else {
        Err(stderr)
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}
