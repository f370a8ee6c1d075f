/*!
 * # storyvox - Scripted narration with captions
 *
 * A Rust library that turns written scripts into narrated audio with
 * synchronized SRT captions.
 *
 * ## Features
 *
 * - Three script modes:
 *   - Single narrator (plain text)
 *   - Question and answer dialogue (`Q:` / `A:` lines)
 *   - Multiple characters (`CHAR1:` .. `CHAR3:`, `NARRATOR:`)
 * - Text normalization of numbers, currency, times, units, URLs and more
 * - Bounded concurrent synthesis through pluggable speech providers
 * - Peak normalization, compression and fades per segment
 * - Punctuation-aware pauses
 * - Captions timed from the assembled audio
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Settings store
 * - `script_parser`: Script to utterances
 * - `normalization`: Speakable text:
 *   - `normalization::words`: Number and unit wording
 *   - `normalization::expanders`: Token class expansion passes
 * - `providers`: Speech provider clients:
 *   - `providers::http`: JSON-over-HTTP synthesis service
 *   - `providers::mock`: Deterministic tone generator
 * - `synthesis`: Provider calls with retry and WAV decoding
 * - `audio`: Sample buffers, WAV IO and effects
 * - `assembly`: Timeline building and pause policies
 * - `captions`: Caption cues and SRT format
 * - `pipeline`: Request orchestration
 * - `file_utils`: Output scopes and atomic writes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod assembly;
pub mod audio;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod normalization;
pub mod pipeline;
pub mod providers;
pub mod script_parser;
pub mod synthesis;

// Re-exports for convenience
pub use app_config::Config;
pub use captions::{CaptionCue, CaptionGenerator};
pub use errors::{AppError, NarrationError, ProviderError, SynthesisError};
pub use normalization::normalize;
pub use pipeline::{NarrationMode, NarrationPipeline, NarrationRequest, PipelineOutcome, PipelineStatus};
pub use script_parser::{ScriptParser, Utterance};
