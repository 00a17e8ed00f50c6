/*!
 * Symbolic frame constants and timing expression resolution.
 *
 * Templates usually declare their timings once (`const STEP = 90;`) and
 * reference them in block attributes (`from={STEP * 2}`). Only names that
 * are entirely upper case with digits and underscores take part; mixed-case
 * bindings are left alone and make an expression unresolvable.
 */

use std::collections::HashMap;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::expression;

// @const: `const NAME = value` up to `;`, `,` or end of line
static DECLARATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+([A-Z][A-Z0-9_]*)\s*=\s*([^;,\n]+)").unwrap()
});

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9_]*\b").unwrap());

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

// @const: what may reach the evaluator after substitution
static ARITHMETIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9\s+\-*/()]+$").unwrap());

/// Name to value map of the integer constants declared in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantTable {
    values: HashMap<String, i64>,
}

impl ConstantTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every `const|let|var NAME = <integer>` declaration.
    ///
    /// Declarations whose value is anything but a bare non-negative integer
    /// literal are ignored, including ones referencing other constants. A
    /// later declaration of the same name replaces an earlier one.
    pub fn from_document(document: &str) -> Self {
        let mut table = Self::new();
        for caps in DECLARATION_REGEX.captures_iter(document) {
            let value = caps[2].trim();
            if !INTEGER_REGEX.is_match(value) {
                continue;
            }
            match value.parse::<i64>() {
                Ok(parsed) => table.insert(&caps[1], parsed),
                Err(e) => debug!("Ignoring constant {} = {}: {}", &caps[1], value, e),
            }
        }
        table
    }

    /// Adds or replaces a constant
    pub fn insert(&mut self, name: &str, value: i64) {
        self.values.insert(name.to_string(), value);
    }

    /// Value of a constant, if declared
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    /// Number of known constants
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no constant was found
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolves a timing expression to an integer frame value.
    ///
    /// Returns `None` ("unresolved") when the expression references an
    /// unknown name, contains anything besides integers, whitespace,
    /// parentheses and `+ - * /`, fails to evaluate, or evaluates to a
    /// non-integral value.
    pub fn resolve(&self, expression: &str) -> Option<i64> {
        let expression = expression.trim();
        if INTEGER_REGEX.is_match(expression) {
            return expression.parse().ok();
        }

        let substituted = IDENTIFIER_REGEX.replace_all(expression, |caps: &Captures| {
            match self.get(&caps[0]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        });

        if !ARITHMETIC_REGEX.is_match(&substituted) {
            debug!("Unresolved timing expression: {}", expression);
            return None;
        }

        let value = match expression::evaluate(&substituted) {
            Ok(value) => value,
            Err(e) => {
                debug!("Failed to evaluate timing expression '{}': {}", expression, e);
                return None;
            }
        };

        if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
            warn!(
                "Timing expression '{}' evaluates to {}, which is not a whole frame",
                expression, value
            );
            return None;
        }

        Some(value as i64)
    }
}

/// Builds the constant table of a document
pub fn extract_constants(document: &str) -> ConstantTable {
    ConstantTable::from_document(document)
}

/// Resolves `expression` against `constants`; `None` means unresolved
pub fn resolve_expression(expression: &str, constants: &ConstantTable) -> Option<i64> {
    constants.resolve(expression)
}
