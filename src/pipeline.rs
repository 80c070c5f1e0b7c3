use crate::error::{Result, SlidecastError};
use crate::script::{self, parse_selection, Bound};
use crate::speech::{SlideOutcome, SpeechSynthesizer, SynthesisOrchestrator, SynthesisStats};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration for the narration pipeline.
#[derive(Debug, Clone)]
pub struct NarrationConfig {
    /// Voice identifier passed through to the speech service.
    pub voice: String,
    /// Slide selection string, e.g. "1,3-5". None narrates everything.
    pub selection: Option<String>,
    /// Show a progress bar.
    pub show_progress: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            voice: crate::config::DEFAULT_VOICE.to_string(),
            selection: None,
            show_progress: true,
        }
    }
}

/// Result of narrating a script.
#[derive(Debug)]
pub struct NarrationResult {
    pub output_dir: PathBuf,
    /// Total slides found in the script.
    pub slide_count: usize,
    /// Indices that were selected for synthesis, ascending.
    pub selected: Vec<usize>,
    pub outcomes: Vec<SlideOutcome>,
    pub stats: SynthesisStats,
    /// Warning-class diagnostics (rejected selection tokens, selection
    /// fallback). Surfacing them is the caller's decision.
    pub warnings: Vec<String>,
}

/// Narrate a slide script: segment it, resolve the selection, and synthesize
/// one audio file per selected slide into `output_dir`.
pub async fn narrate(
    script_path: &Path,
    output_dir: &Path,
    synthesizer: Box<dyn SpeechSynthesizer>,
    config: NarrationConfig,
) -> Result<NarrationResult> {
    if !script_path.exists() {
        return Err(SlidecastError::InputNotFound(
            script_path.display().to_string(),
        ));
    }

    let text = fs::read_to_string(script_path)?;
    let slides = script::segment(&text);
    if slides.is_empty() {
        return Err(SlidecastError::NoMatchingInputs(format!(
            "no slides found in {}",
            script_path.display()
        )));
    }

    let slide_count = slides.len();
    info!("Found {} slides in the presentation", slide_count);

    let parsed = parse_selection(config.selection.as_deref(), Bound::Known(slide_count));

    let mut warnings = Vec::new();
    if !parsed.rejected.is_empty() {
        warnings.push(format!(
            "invalid slide selection ignored: {}",
            parsed.rejected.join(", ")
        ));
    }
    if parsed.fell_back_to_all {
        warnings.push("selection matched no slides; processing all slides".to_string());
    }

    let selected = parsed.selection.resolve(slide_count);
    info!(
        "Processing slides: {}",
        selected
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let orchestrator = SynthesisOrchestrator::new(synthesizer, config.voice.clone())
        .with_progress(config.show_progress);
    let (outcomes, stats) = orchestrator
        .process_slides(&slides, &selected, output_dir)
        .await?;

    Ok(NarrationResult {
        output_dir: output_dir.to_path_buf(),
        slide_count,
        selected,
        outcomes,
        stats,
        warnings,
    })
}

/// Print a summary of the narration results.
pub fn print_summary(result: &NarrationResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                      Narration Complete                        ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output dir:   {}", result.output_dir.display());
    println!(
        "  Slides:       {} total, {} selected",
        result.slide_count,
        result.selected.len()
    );
    println!("  Synthesized:  {}", result.stats.synthesized);
    if result.stats.skipped_empty > 0 {
        println!("  Skipped:      {} (empty)", result.stats.skipped_empty);
    }
    if result.stats.failed > 0 {
        println!("  Failed:       {}", result.stats.failed);
        for outcome in &result.outcomes {
            if let Some(ref error) = outcome.error {
                println!("    - slide {}: {}", outcome.index, error);
            }
        }
    }
    println!(
        "  Total time:   {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_config_default() {
        let config = NarrationConfig::default();
        assert_eq!(config.voice, "onyx");
        assert!(config.selection.is_none());
        assert!(config.show_progress);
    }
}
