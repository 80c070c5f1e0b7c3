use crate::audio::fallback::{run_chain, Strategy};
use crate::audio::list_matching_files;
use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::process::Command;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Durations at or below this are treated as unusable (half a millisecond).
const USABLE_MIN_SECS: f64 = 0.0005;

const STREAM_QUERY: &[&str] = &["-select_streams", "a:0", "-show_entries", "stream=duration"];
const FORMAT_QUERY: &[&str] = &["-show_entries", "format=duration"];

/// Measured duration of one file and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct FileDuration {
    pub name: String,
    pub seconds: f64,
    pub strategy: &'static str,
}

/// Per-file durations plus the aggregate for one directory scan.
#[derive(Debug, Clone, Default)]
pub struct DurationReport {
    pub files: Vec<FileDuration>,
    /// Files that raised an unexpected error during measurement. Reported,
    /// excluded from the total, and the scan continues.
    pub errors: Vec<(String, String)>,
    pub total_seconds: f64,
}

/// Measure every matching file in `dir` and sum the results.
///
/// Each file goes through the measurement chain independently; a file whose
/// duration cannot be determined contributes zero with strategy "unknown"
/// rather than aborting the scan.
pub fn scan_durations(dir: &Path, pattern: &str) -> Result<DurationReport> {
    let files = list_matching_files(dir, pattern)?;
    let mut report = DurationReport::default();

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        match measure_file(&path) {
            Ok((seconds, strategy)) => {
                report.total_seconds += seconds;
                report.files.push(FileDuration {
                    name,
                    seconds,
                    strategy,
                });
            }
            Err(message) => {
                warn!("{}: error reading duration ({})", name, message);
                report.errors.push((name, message));
            }
        }
    }

    Ok(report)
}

/// Measure one file: metadata reader first, then the probe tool's
/// stream-level and container-level duration fields.
fn measure_file(path: &Path) -> std::result::Result<(f64, &'static str), String> {
    // A file we cannot even open is a per-file measurement error rather
    // than an "unknown" zero.
    File::open(path).map_err(|e| e.to_string())?;

    let strategies: Vec<Strategy<f64>> = vec![
        ("symphonia", Box::new(|| metadata_duration(path))),
        (
            "ffprobe-stream",
            Box::new(|| probe_duration(path, STREAM_QUERY)),
        ),
        (
            "ffprobe-format",
            Box::new(|| probe_duration(path, FORMAT_QUERY)),
        ),
    ];

    let outcome = run_chain(strategies);
    match outcome.value {
        Some((seconds, strategy)) => Ok((seconds, strategy)),
        None => {
            for (strategy, diagnostic) in &outcome.failures {
                debug!("{}: {} gave no duration: {}", path.display(), strategy, diagnostic);
            }
            Ok((0.0, "unknown"))
        }
    }
}

fn usable(seconds: f64) -> std::result::Result<f64, String> {
    if seconds > USABLE_MIN_SECS {
        Ok(seconds)
    } else {
        Err(format!("duration {seconds} at or below usable threshold"))
    }
}

/// Read the duration from container metadata via symphonia.
fn metadata_duration(path: &Path) -> std::result::Result<f64, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| e.to_string())?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| "no default audio track".to_string())?;
    let params = &track.codec_params;
    let time_base = params
        .time_base
        .ok_or_else(|| "no time base".to_string())?;
    let n_frames = params
        .n_frames
        .ok_or_else(|| "total frame count unknown".to_string())?;

    let time = time_base.calc_time(n_frames);
    usable(time.seconds as f64 + time.frac)
}

/// Ask ffprobe for a duration field. `query` selects the stream-level or the
/// container-level field.
fn probe_duration(path: &Path, query: &[&str]) -> std::result::Result<f64, String> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(query)
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .output()
        .map_err(|e| format!("ffprobe not available: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffprobe failed: {}", stderr.trim()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().unwrap_or("").trim();
    let seconds: f64 = first
        .parse()
        .map_err(|_| format!("unparseable duration '{first}'"))?;
    usable(seconds)
}

/// Render seconds as `MM:SS.mmm`, or `HH:MM:SS.mmm` from one hour up.
pub fn format_seconds(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let (hours, rem) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (minutes, rem) = (rem / 60_000, rem % 60_000);
    let (secs, millis) = (rem / 1000, rem % 1000);

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{secs:02}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00.000");
        assert_eq!(format_seconds(1.5), "00:01.500");
        assert_eq!(format_seconds(61.001), "01:01.001");
        assert_eq!(format_seconds(3661.123), "01:01:01.123");
    }

    #[test]
    fn test_usable_threshold() {
        assert!(usable(0.0).is_err());
        assert!(usable(0.0005).is_err());
        assert!(usable(0.001).is_ok());
        assert_eq!(usable(2.5).unwrap(), 2.5);
    }

    #[test]
    fn test_metadata_duration_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not audio at all")
            .unwrap();
        assert!(metadata_duration(&path).is_err());
    }

    #[test]
    fn test_scan_reports_unknown_for_unreadable_audio() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["slide_01.mp3", "slide_02.mp3"] {
            let path = dir.path().join(name);
            std::fs::File::create(&path)
                .unwrap()
                .write_all(b"garbage bytes")
                .unwrap();
        }

        let report = scan_durations(dir.path(), "*.mp3").unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.total_seconds, 0.0);
        for file in &report.files {
            assert_eq!(file.seconds, 0.0);
            assert_eq!(file.strategy, "unknown");
        }
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_durations(dir.path(), "*.mp3").unwrap();
        assert!(report.files.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(report.total_seconds, 0.0);
    }
}
