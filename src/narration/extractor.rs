/*!
 * Caption extraction: blocks + constants -> ordered narration steps.
 */

use std::fmt;
use std::num::NonZeroU32;

use log::debug;
use serde::{Deserialize, Serialize};

use super::constants::ConstantTable;
use super::scanner::{self, Block, BlockScanner, DEFAULT_BLOCK_TAG};

/// Frame rate used when the caller does not supply one
pub const DEFAULT_FPS: NonZeroU32 = NonZeroU32::new(30).unwrap();

/// Attribute carrying narration text inside a block body
pub const DEFAULT_CAPTION_ATTRIBUTE: &str = "text";

/// Attribute holding a block's first frame
pub const FROM_ATTRIBUTE: &str = "from";

/// Attribute holding a block's length in frames
pub const DURATION_ATTRIBUTE: &str = "durationInFrames";

/// One narration line with the timing of the block it was found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationStep {
    /// First frame of the block
    pub from: u64,

    /// Block length in frames, always > 0
    pub duration_in_frames: u64,

    /// `duration_in_frames / fps`, rounded to 2 decimals
    pub duration_seconds: f64,

    /// `from / fps`, rounded to 2 decimals
    pub start_seconds: f64,

    /// Unescaped, trimmed, non-empty caption text
    pub text: String,
}

impl NarrationStep {
    /// Creates a step, deriving the second-based timings from `fps`
    pub fn new(from: u64, duration_in_frames: u64, fps: NonZeroU32, text: String) -> Self {
        Self {
            from,
            duration_in_frames,
            duration_seconds: frames_to_seconds(duration_in_frames, fps),
            start_seconds: frames_to_seconds(from, fps),
            text,
        }
    }
}

impl fmt::Display for NarrationStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}s +{}s] {}", self.start_seconds, self.duration_seconds, self.text)
    }
}

/// Extraction result: the frame rate and the steps in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationDocument {
    /// Frame rate the second-based timings were computed with
    pub fps: NonZeroU32,

    /// Narration steps in document order
    pub steps: Vec<NarrationStep>,
}

impl NarrationDocument {
    /// Creates an empty document
    pub fn new(fps: NonZeroU32) -> Self {
        Self {
            fps,
            steps: Vec::new(),
        }
    }

    /// Whether no caption was found
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Silence to play before the first step, in seconds
    pub fn lead_silence_seconds(&self) -> f64 {
        self.steps.first().map_or(0.0, |step| step.start_seconds)
    }

    /// Serializes to the narration JSON payload
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Parses a narration JSON payload
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Tunables for one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Frame rate used for the second-based timings
    pub fps: NonZeroU32,

    /// Tag of the timing blocks
    pub block_tag: String,

    /// Attribute carrying the narration text
    pub caption_attribute: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            block_tag: DEFAULT_BLOCK_TAG.to_string(),
            caption_attribute: DEFAULT_CAPTION_ATTRIBUTE.to_string(),
        }
    }
}

impl ExtractOptions {
    /// Default options at the given frame rate
    pub fn with_fps(fps: NonZeroU32) -> Self {
        Self {
            fps,
            ..Self::default()
        }
    }
}

/// Resolved `from` / `durationInFrames` of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockTiming {
    from: u64,
    duration_in_frames: u64,
}

/// Reusable extractor for one set of options
#[derive(Debug, Clone)]
pub struct NarrationExtractor {
    options: ExtractOptions,
    scanner: BlockScanner,
}

impl NarrationExtractor {
    /// Creates an extractor
    pub fn new(options: ExtractOptions) -> Self {
        let scanner = BlockScanner::new(&options.block_tag);
        Self { options, scanner }
    }

    /// Options this extractor was built with
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extracts every caption of every block with resolvable timing.
    ///
    /// Blocks missing `from` or `durationInFrames`, or whose timing does not
    /// resolve to `from >= 0` and `durationInFrames > 0`, contribute nothing.
    pub fn extract(&self, document: &str) -> NarrationDocument {
        let constants = ConstantTable::from_document(document);
        let fps = self.options.fps;
        let mut narration = NarrationDocument::new(fps);

        for (index, block) in self.scanner.scan(document).iter().enumerate() {
            let Some(timing) = block_timing(block, &constants) else {
                debug!("Skipping block {} ({}): no usable timing", index + 1, block.attributes);
                continue;
            };

            for text in CaptionTexts::new(block.body, &self.options.caption_attribute) {
                narration.steps.push(NarrationStep::new(
                    timing.from,
                    timing.duration_in_frames,
                    fps,
                    text,
                ));
            }
        }

        debug!(
            "Extracted {} narration step(s) with {} constant(s)",
            narration.steps.len(),
            constants.len()
        );
        narration
    }
}

fn block_timing(block: &Block<'_>, constants: &ConstantTable) -> Option<BlockTiming> {
    let from = block.expression_attribute(FROM_ATTRIBUTE)?;
    let duration = block.expression_attribute(DURATION_ATTRIBUTE)?;

    let from = constants.resolve(from)?;
    let duration_in_frames = constants.resolve(duration)?;

    if from < 0 || duration_in_frames <= 0 {
        debug!("Ignoring timing from={} durationInFrames={}", from, duration_in_frames);
        return None;
    }

    Some(BlockTiming {
        from: from as u64,
        duration_in_frames: duration_in_frames as u64,
    })
}

/// Iterator over the quoted values of `attribute=` in a block body
struct CaptionTexts<'a> {
    body: &'a str,
    needle: String,
    pos: usize,
}

impl<'a> CaptionTexts<'a> {
    fn new(body: &'a str, attribute: &str) -> Self {
        Self {
            body,
            needle: format!("{attribute}="),
            pos: 0,
        }
    }
}

impl Iterator for CaptionTexts<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let bytes = self.body.as_bytes();

        while self.pos < self.body.len() {
            let at = self.pos + self.body[self.pos..].find(&self.needle)?;
            let open = at + self.needle.len();
            self.pos = open;

            let at_boundary = self.body[..at]
                .chars()
                .next_back()
                .is_none_or(|c| !scanner::is_word_char(c));
            if !at_boundary || !bytes.get(open).is_some_and(|&b| scanner::is_quote(b)) {
                continue;
            }

            let Some(close) = scanner::closing_quote(bytes, open) else {
                continue;
            };
            self.pos = close + 1;

            let text = unescape(&self.body[open + 1..close]);
            let text = text.trim();
            if text.is_empty() {
                debug!("Skipping empty caption at offset {}", at);
                continue;
            }
            return Some(text.to_string());
        }

        None
    }
}

/// Collapses `\X` to `X`; a backslash before a line break is kept as is
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if !matches!(next, '\n' | '\r' | '\u{2028}' | '\u{2029}') => {
                    out.push(next);
                    chars.next();
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

fn frames_to_seconds(frames: u64, fps: NonZeroU32) -> f64 {
    let seconds = frames as f64 / f64::from(fps.get());
    (seconds * 100.0).round() / 100.0
}
