use crate::audio::slide_file_name;
use crate::error::Result;
use crate::script::Slide;
use crate::speech::SpeechSynthesizer;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Result of synthesizing a single slide.
#[derive(Debug)]
pub struct SlideOutcome {
    pub index: usize,
    /// Path of the written artifact, when synthesis succeeded.
    pub path: Option<PathBuf>,
    pub error: Option<String>,
    pub skipped_empty: bool,
    pub duration_ms: u64,
}

/// Statistics from a synthesis batch.
#[derive(Debug, Clone)]
pub struct SynthesisStats {
    pub total_selected: usize,
    pub synthesized: usize,
    pub skipped_empty: usize,
    pub failed: usize,
    pub total_time: Duration,
}

/// Drives per-slide synthesis over a selected index set, one slide at a time.
pub struct SynthesisOrchestrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice: String,
    show_progress: bool,
}

impl SynthesisOrchestrator {
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, voice: String) -> Self {
        Self {
            synthesizer: Arc::from(synthesizer),
            voice,
            show_progress: true,
        }
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Synthesize every selected slide into `output_dir` as
    /// `slide_NN.mp3`, in ascending index order.
    ///
    /// A failed slide is recorded and the batch continues; slides whose text
    /// trims to empty are skipped without producing a file or an error.
    pub async fn process_slides(
        &self,
        slides: &[Slide],
        selected: &[usize],
        output_dir: &Path,
    ) -> Result<(Vec<SlideOutcome>, SynthesisStats)> {
        let start_time = Instant::now();
        tokio::fs::create_dir_all(output_dir).await?;

        info!(
            "Synthesizing {} slide(s) with {} (voice: {})",
            selected.len(),
            self.synthesizer.name(),
            self.voice
        );

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(selected.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} slides ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut outcomes = Vec::with_capacity(selected.len());

        for &index in selected {
            let slide = match index.checked_sub(1).and_then(|i| slides.get(i)) {
                Some(slide) => slide,
                None => continue,
            };

            let slide_start = Instant::now();

            if slide.text.trim().is_empty() {
                debug!("Slide {} has no text, skipping", index);
                outcomes.push(SlideOutcome {
                    index,
                    path: None,
                    error: None,
                    skipped_empty: true,
                    duration_ms: 0,
                });
                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
                continue;
            }

            let path = output_dir.join(slide_file_name(index));
            debug!("Processing slide {} -> {:?}", index, path);

            let outcome = match self.write_artifact(&slide.text, &path).await {
                Ok(()) => {
                    info!("Audio saved to {}", path.display());
                    SlideOutcome {
                        index,
                        path: Some(path),
                        error: None,
                        skipped_empty: false,
                        duration_ms: slide_start.elapsed().as_millis() as u64,
                    }
                }
                Err(e) => {
                    warn!("Slide {} failed: {}", index, e);
                    SlideOutcome {
                        index,
                        path: None,
                        error: Some(e.to_string()),
                        skipped_empty: false,
                        duration_ms: slide_start.elapsed().as_millis() as u64,
                    }
                }
            };
            outcomes.push(outcome);

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        let synthesized = outcomes.iter().filter(|o| o.path.is_some()).count();
        let skipped_empty = outcomes.iter().filter(|o| o.skipped_empty).count();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

        let stats = SynthesisStats {
            total_selected: selected.len(),
            synthesized,
            skipped_empty,
            failed,
            total_time: start_time.elapsed(),
        };

        Ok((outcomes, stats))
    }

    /// Stream synthesized bytes to `path`.
    ///
    /// The file handle lives only in this scope, so it is closed on every
    /// exit path. A mid-stream failure leaves the partial file on disk for
    /// inspection or retry.
    async fn write_artifact(&self, text: &str, path: &Path) -> Result<()> {
        let mut stream = self.synthesizer.synthesize(text, &self.voice).await?;
        let mut file = File::create(path).await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }
}
