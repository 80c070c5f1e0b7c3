use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use slidecast::audio::{
    check_ffprobe, collect_merge_inputs, format_seconds, merge_files, scan_durations,
    DEFAULT_MERGED_NAME,
};
use slidecast::config::Config;
use slidecast::error::SlidecastError;
use slidecast::pipeline::{narrate, print_summary, NarrationConfig};
use slidecast::script::{parse_selection, Bound, Selection};
use slidecast::speech::{OpenAiSpeechClient, ResponseFormat, TranscriptionClient};
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "slidecast")]
#[command(version, about = "Narrate slide scripts with OpenAI text-to-speech")]
#[command(
    long_about = "Convert a slide-delimited presentation script into per-slide audio files, \
merge them into a single track, and sum the runtime of a directory of audio files."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert each slide of a script to a spoken audio file
    Synth {
        /// Input text file containing the presentation script
        input: PathBuf,

        /// Directory to save the audio files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Voice to use. Options: alloy, echo, fable, onyx, nova, shimmer
        #[arg(long)]
        voice: Option<String>,

        /// Synthesis model (e.g. tts-1, tts-1-hd)
        #[arg(long)]
        model: Option<String>,

        /// Playback speed multiplier passed to the synthesis service
        #[arg(long)]
        speed: Option<f32>,

        /// Slides to process (e.g. "1", "2,4", "3-5", "1,3-4,7")
        #[arg(long)]
        slides: Option<String>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Merge per-slide audio files into a single track
    Merge {
        /// Directory containing the audio files
        #[arg(long = "dir", default_value = "output")]
        directory: PathBuf,

        /// Pattern to match files
        #[arg(long, default_value = "*.mp3")]
        pattern: String,

        /// Slide selection (e.g. "1", "2,4", "3-5"); merges all files if omitted
        #[arg(long)]
        slides: Option<String>,

        /// Output path (default: <dir>/merged_slides.mp3)
        #[arg(long = "out")]
        output: Option<PathBuf>,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Sum playback durations of audio files in a directory
    Duration {
        /// Directory containing the audio files
        #[arg(long = "dir", default_value = "output")]
        directory: PathBuf,

        /// Pattern to match files
        #[arg(long, default_value = "*.mp3")]
        pattern: String,
    },

    /// Transcribe an audio file back to text
    Transcribe {
        /// Input audio file (mp3, wav, m4a, webm, ...)
        audio: PathBuf,

        /// Language code (e.g. "ko", "en")
        #[arg(long)]
        language: Option<String>,

        /// Domain-specific hint text
        #[arg(long)]
        prompt: Option<String>,

        /// Output format: text, srt, vtt, verbose_json, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Decoding temperature
        #[arg(long, default_value_t = 0.0)]
        temperature: f32,

        /// Output file path; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Command::Synth {
            input,
            output_dir,
            voice,
            model,
            speed,
            slides,
            no_progress,
        } => {
            let config = Config::load().context("Failed to load configuration")?;
            config.validate().context("Configuration validation failed")?;

            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

            let mut client = OpenAiSpeechClient::new(api_key)
                .with_model(model.unwrap_or_else(|| config.default_model.clone()));
            let speed = speed.unwrap_or(config.default_speed);
            if (speed - 1.0).abs() > f32::EPSILON {
                client = client.with_speed(speed);
            }

            let narration = NarrationConfig {
                voice: voice.unwrap_or_else(|| config.default_voice.clone()),
                selection: slides,
                show_progress: !no_progress,
            };

            let result = narrate(&input, &output_dir, Box::new(client), narration).await?;
            for warning in &result.warnings {
                warn!("{}", warning);
            }
            print_summary(&result);
        }

        Command::Merge {
            directory,
            pattern,
            slides,
            output,
            overwrite,
        } => {
            let parsed = parse_selection(slides.as_deref(), Bound::Unknown);
            for warning in &parsed.rejected {
                warn!("Invalid slide token ignored: {}", warning);
            }

            let output = output.unwrap_or_else(|| directory.join(DEFAULT_MERGED_NAME));

            if let Err(e) = run_merge(&directory, &pattern, &parsed.selection, &output, overwrite)
            {
                eprintln!("Error: {e}");
                std::process::exit(merge_exit_code(&e));
            }
            println!("Merged audio saved to: {}", output.display());
        }

        Command::Duration { directory, pattern } => {
            let report = scan_durations(&directory, &pattern)?;

            println!(
                "Scanned {} file(s) in {} matching '{}':",
                report.files.len() + report.errors.len(),
                directory.display(),
                pattern
            );
            for file in &report.files {
                let extra = if file.strategy == "symphonia" {
                    String::new()
                } else {
                    format!(" (via {})", file.strategy)
                };
                println!("- {}: {}{}", file.name, format_seconds(file.seconds), extra);
            }
            for (name, message) in &report.errors {
                println!("- {}: error reading duration ({})", name, message);
            }

            println!();
            println!("Total duration:");
            println!(
                "= {} ({:.3} seconds)",
                format_seconds(report.total_seconds),
                report.total_seconds
            );

            if report.total_seconds <= 0.0005 && check_ffprobe().is_err() {
                println!(
                    "Note: all durations are zero or unknown. If the files are playable, \
install ffmpeg to enable the ffprobe fallback."
                );
            }
        }

        Command::Transcribe {
            audio,
            language,
            prompt,
            format,
            temperature,
            output,
        } => {
            let config = Config::load().context("Failed to load configuration")?;
            config.validate().context("Configuration validation failed")?;

            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

            let format: ResponseFormat =
                format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

            let mut client = TranscriptionClient::new(api_key).with_temperature(temperature);
            if let Some(language) = language {
                client = client.with_language(language);
            }
            if let Some(prompt) = prompt {
                client = client.with_prompt(prompt);
            }

            if output.is_some() {
                let out = client
                    .transcribe_to_file(&audio, output.as_deref(), format)
                    .await?;
                println!("Saved transcription to {}", out.display());
            } else {
                let text = client.transcribe(&audio, format).await?;
                println!("{text}");
            }
        }
    }

    Ok(())
}

fn run_merge(
    directory: &std::path::Path,
    pattern: &str,
    selection: &Selection,
    output: &std::path::Path,
    overwrite: bool,
) -> std::result::Result<(), SlidecastError> {
    let inputs = collect_merge_inputs(directory, pattern, selection, output)?;

    if inputs.is_empty() {
        let hint = match selection {
            Selection::All => format!("no files matched pattern '{pattern}' in {}", directory.display()),
            Selection::Indices(_) => format!(
                "no files matched the slide selection in {} \
(expected names like 'slide_01.mp3')",
                directory.display()
            ),
        };
        return Err(SlidecastError::NoMatchingInputs(hint));
    }

    println!("Files to merge (in order):");
    for input in &inputs {
        if let Some(name) = input.file_name().and_then(|n| n.to_str()) {
            println!("- {name}");
        }
    }

    merge_files(&inputs, output, overwrite)
}

/// Exit codes match the error categories: 1 for a missing input directory,
/// 2 for nothing matched, 3 for a failed merge.
fn merge_exit_code(error: &SlidecastError) -> i32 {
    match error {
        SlidecastError::InputNotFound(_) => 1,
        SlidecastError::NoMatchingInputs(_) => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_exit_codes() {
        assert_eq!(
            merge_exit_code(&SlidecastError::InputNotFound("x".to_string())),
            1
        );
        assert_eq!(
            merge_exit_code(&SlidecastError::NoMatchingInputs("x".to_string())),
            2
        );
        assert_eq!(
            merge_exit_code(&SlidecastError::MergeExhausted {
                copy: "a".to_string(),
                reencode: "b".to_string(),
            }),
            3
        );
        assert_eq!(
            merge_exit_code(&SlidecastError::OutputExists("x".to_string())),
            3
        );
    }
}
