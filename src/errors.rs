/*!
 * Error types for the videodoc application.
 *
 * The extraction engine itself never fails: malformed or sparse markup
 * degrades to fewer narration steps. The types here cover the layers
 * around it (configuration, the orchestration that reads and writes
 * files, and the arithmetic evaluator used for timing expressions).
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while evaluating a timing expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// A character outside the arithmetic grammar
    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar {
        /// Offending character
        found: char,
        /// Byte offset in the expression
        offset: usize,
    },

    /// The expression stopped where an operand or `)` was required
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// A literal that does not fit a finite number
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),

    /// Right-hand side of `/` evaluated to zero
    #[error("Division by zero")]
    DivisionByZero,
}

/// Errors that can occur when validating the configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Frame rate must be a positive integer
    #[error("Invalid fps: must be a positive integer. Got: {0}")]
    InvalidFps(u32),

    /// Tag or attribute names must be plain identifiers
    #[error("Invalid {field}: '{value}' is not a valid identifier")]
    InvalidIdentifier {
        /// Configuration field name
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// A numeric voice setting outside of its accepted range
    #[error("Invalid {field}: must be {min}–{max}. Got: {value}")]
    OutOfRange {
        /// Configuration field name
        field: &'static str,
        /// Rejected value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// Voice name left empty
    #[error("Voice name must not be empty")]
    EmptyVoice,
}

/// Errors raised by the narration pipeline around the extraction engine
#[derive(Error, Debug)]
pub enum NarrationError {
    /// The composition file to extract from does not exist
    #[error("Composition file not found: {0}")]
    CompositionNotFound(PathBuf),

    /// The narration JSON to plan from does not exist
    #[error("Narration file not found: {0}. Run extract first, or ensure the file exists.")]
    NarrationNotFound(PathBuf),

    /// The narration JSON could not be parsed
    #[error("Invalid narration file {path}: {reason}")]
    InvalidNarration {
        /// Narration file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Extraction produced zero steps, usually an unannotated template
    #[error(
        "No captions found in {path}. Make sure each <{tag}> has from={{..}} and \
         durationInFrames={{..}} and captions use the {attribute} prop with a string literal, \
         e.g. <Caption {attribute}=\"Your narration text.\" />"
    )]
    NoCaptions {
        /// Composition or narration file path
        path: PathBuf,
        /// Block tag that was scanned for
        tag: String,
        /// Caption attribute that was scanned for
        attribute: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from configuration validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the narration pipeline
    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
