pub mod openai;
pub mod orchestrator;
pub mod transcribe;

pub use openai::OpenAiSpeechClient;
pub use orchestrator::{SlideOutcome, SynthesisOrchestrator, SynthesisStats};
pub use transcribe::{default_transcript_path, ResponseFormat, TranscriptionClient};

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A finite sequence of audio byte chunks, produced once and consumed once.
pub type AudioByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// The speech synthesis capability.
///
/// Adapters own all transport detail; callers only ever see a stream of
/// bytes, whatever shape the service response took.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Request synthesis of `text` with the given voice. The voice identifier
    /// is passed through to the service untouched.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioByteStream>;

    fn name(&self) -> &'static str;
}
