/*!
 * # videodoc - narration extraction for product walkthrough videos
 *
 * A Rust library that recovers the narration of a video composition
 * template: every caption string placed inside a timed `<Sequence>` block,
 * with the block's frame timing resolved to concrete frames and seconds.
 *
 * ## Features
 *
 * - Nesting-aware block scanning that is not fooled by quoted markup
 * - Symbolic timing (`from={STEP * 2}`) resolved from `const STEP = 90;`
 *   declarations with a dedicated arithmetic evaluator
 * - Escape-aware caption extraction in any quote style
 * - Narration JSON output (`fps` + `steps`) for speech synthesis
 * - Voiceover planning: segment order, pauses and the sync manifest
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `narration`: the extraction engine:
 *   - `narration::scanner`: block scanner
 *   - `narration::constants`: constant table and expression resolution
 *   - `narration::expression`: arithmetic evaluator
 *   - `narration::extractor`: caption extraction and output model
 * - `voiceover`: speech stage planning
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
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
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod narration;
pub mod voiceover;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ConfigError, ExpressionError, NarrationError};
pub use narration::{
    extract_narration, extract_narration_with, ExtractOptions, NarrationDocument, NarrationStep,
};
pub use voiceover::VoiceoverPlan;
