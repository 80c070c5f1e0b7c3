pub mod duration;
pub(crate) mod fallback;
pub mod merge;

pub use duration::{format_seconds, scan_durations, DurationReport, FileDuration};
pub use merge::{collect_merge_inputs, merge_files, DEFAULT_MERGED_NAME};

use crate::error::{Result, SlidecastError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Artifact filename for a 1-based slide index, zero-padded to two digits.
pub fn slide_file_name(index: usize) -> String {
    format!("slide_{:02}.mp3", index)
}

/// Parse the ordinal out of a `slide_<digits>.mp3` filename.
///
/// Case differences and inconsistent zero-padding are tolerated; anything
/// else returns `None`.
pub fn parse_slide_ordinal(name: &str) -> Option<usize> {
    let re = Regex::new(r"(?i)^slide_(\d+)\.mp3$").expect("Invalid regex");
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Match a file name against a `*`-wildcard pattern such as `*.mp3`.
pub(crate) fn matches_pattern(name: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return name == pattern;
    }

    let mut rest = name;
    if !rest.starts_with(parts[0]) {
        return false;
    }
    rest = &rest[parts[0].len()..];

    for mid in &parts[1..parts.len() - 1] {
        if mid.is_empty() {
            continue;
        }
        match rest.find(mid) {
            Some(pos) => rest = &rest[pos + mid.len()..],
            None => return false,
        }
    }

    rest.ends_with(parts[parts.len() - 1])
}

/// List files in `dir` whose names match `pattern`, sorted by filename.
pub fn list_matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SlidecastError::InputNotFound(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| matches_pattern(name, pattern))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg").arg("-version").output().map_err(|e| {
        SlidecastError::ToolUnavailable(format!(
            "ffmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(SlidecastError::ToolUnavailable(
            "ffmpeg check failed".to_string(),
        ));
    }

    debug!("ffmpeg is available");
    Ok(())
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe").arg("-version").output().map_err(|e| {
        SlidecastError::ToolUnavailable(format!(
            "ffprobe not found. Please install FFmpeg (includes ffprobe). Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(SlidecastError::ToolUnavailable(
            "ffprobe check failed".to_string(),
        ));
    }

    debug!("ffprobe is available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_file_name_zero_padding() {
        assert_eq!(slide_file_name(1), "slide_01.mp3");
        assert_eq!(slide_file_name(9), "slide_09.mp3");
        assert_eq!(slide_file_name(10), "slide_10.mp3");
        assert_eq!(slide_file_name(123), "slide_123.mp3");
    }

    #[test]
    fn test_parse_slide_ordinal() {
        assert_eq!(parse_slide_ordinal("slide_01.mp3"), Some(1));
        assert_eq!(parse_slide_ordinal("slide_1.mp3"), Some(1));
        assert_eq!(parse_slide_ordinal("slide_010.mp3"), Some(10));
        assert_eq!(parse_slide_ordinal("SLIDE_02.MP3"), Some(2));
        assert_eq!(parse_slide_ordinal("slide_.mp3"), None);
        assert_eq!(parse_slide_ordinal("merged_slides.mp3"), None);
        assert_eq!(parse_slide_ordinal("slide_02.wav"), None);
        assert_eq!(parse_slide_ordinal("xslide_02.mp3"), None);
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("slide_01.mp3", "*.mp3"));
        assert!(matches_pattern("slide_01.mp3", "slide_*"));
        assert!(matches_pattern("slide_01.mp3", "slide_*.mp3"));
        assert!(matches_pattern("track.mp3", "*"));
        assert!(matches_pattern("exact.mp3", "exact.mp3"));
        assert!(!matches_pattern("slide_01.wav", "*.mp3"));
        assert!(!matches_pattern("notes.txt", "slide_*.mp3"));
        assert!(!matches_pattern("other.mp3", "exact.mp3"));
    }

    #[test]
    fn test_list_matching_files_missing_dir() {
        let result = list_matching_files(Path::new("/nonexistent/dir"), "*.mp3");
        assert!(matches!(result, Err(SlidecastError::InputNotFound(_))));
    }
}
