/*!
 * Narration extraction engine.
 *
 * Recovers the ordered, time-aligned narration lines of a composition
 * template. Pure functions over an in-memory string; malformed or sparse
 * markup yields fewer steps, never an error.
 *
 * - `scanner`: nesting-aware `<Sequence>` block scanner
 * - `constants`: symbolic frame constants and timing expression resolution
 * - `expression`: arithmetic evaluator behind the resolver
 * - `extractor`: caption extraction and the output data model
 */

pub mod constants;
pub mod expression;
pub mod extractor;
pub mod scanner;

use std::num::NonZeroU32;

pub use constants::{extract_constants, resolve_expression, ConstantTable};
pub use extractor::{
    ExtractOptions, NarrationDocument, NarrationExtractor, NarrationStep, DEFAULT_CAPTION_ATTRIBUTE,
    DEFAULT_FPS,
};
pub use scanner::{find_blocks, Block, BlockScanner, DEFAULT_BLOCK_TAG};

/// Extracts `<Sequence>` captions (`text="..."`) at the given frame rate
pub fn extract_narration(document: &str, fps: NonZeroU32) -> NarrationDocument {
    extract_narration_with(document, &ExtractOptions::with_fps(fps))
}

/// Extracts captions with explicit options
pub fn extract_narration_with(document: &str, options: &ExtractOptions) -> NarrationDocument {
    NarrationExtractor::new(options.clone()).extract(document)
}
