/*!
 * Nesting-aware scanner for timing blocks.
 *
 * A block is `<Tag attrs>body</Tag>`. The scanner walks the document as
 * bytes with two states (normal / inside a string literal) and an explicit
 * depth counter, so quoted `>` characters and quoted markers never end a
 * tag or a body early. Every marker and quote is ASCII, which keeps every
 * index used for slicing on a UTF-8 boundary.
 */

use log::debug;

/// Block tag used by composition templates
pub const DEFAULT_BLOCK_TAG: &str = "Sequence";

/// One `<Tag ...>...</Tag>` region of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Raw attribute text between the tag name and the closing `>`, trimmed
    pub attributes: &'a str,

    /// Raw text between the opening tag and the matching end marker
    pub body: &'a str,
}

impl<'a> Block<'a> {
    /// Returns the raw expression of a `name={...}` attribute.
    ///
    /// The name must start at a word boundary outside any quoted value and
    /// the braces must hold at least one character; the value stops at the
    /// first `}`.
    pub fn expression_attribute(&self, name: &str) -> Option<&'a str> {
        let attributes = self.attributes;
        let bytes = attributes.as_bytes();
        let needle = format!("{name}={{");
        let mut i = 0;

        while i < bytes.len() {
            if is_quote(bytes[i]) {
                i = closing_quote(bytes, i).map_or(i + 1, |close| close + 1);
                continue;
            }

            if !bytes[i..].starts_with(needle.as_bytes()) {
                i += 1;
                continue;
            }

            let value_start = i + needle.len();
            let at_boundary = attributes[..i]
                .chars()
                .next_back()
                .is_none_or(|c| !is_word_char(c));
            if !at_boundary {
                i = value_start;
                continue;
            }

            let rest = &attributes[value_start..];
            match rest.find('}') {
                Some(0) => i = value_start,
                Some(close) => return Some(&rest[..close]),
                None => return None,
            }
        }

        None
    }

    /// Scans this block's body for nested blocks of the same tag
    pub fn children(&self, scanner: &BlockScanner) -> Vec<Block<'a>> {
        scanner.scan(self.body)
    }
}

/// Finds top-level blocks for one tag name
#[derive(Debug, Clone)]
pub struct BlockScanner {
    start_marker: String,
    end_marker: String,
}

impl Default for BlockScanner {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_TAG)
    }
}

impl BlockScanner {
    /// Creates a scanner for `<tag` ... `</tag>`
    pub fn new(tag: &str) -> Self {
        Self {
            start_marker: format!("<{tag}"),
            end_marker: format!("</{tag}>"),
        }
    }

    /// Returns the top-level blocks of `document` in order of appearance.
    ///
    /// Scanning stops early, keeping what was found so far, when an opening
    /// tag has no closing `>` or a body never reaches its end marker.
    pub fn scan<'a>(&self, document: &'a str) -> Vec<Block<'a>> {
        let bytes = document.as_bytes();
        let mut blocks = Vec::new();
        let mut pos = 0;

        while let Some(open) = self.next_start_marker(document, pos) {
            let attrs_start = open + self.start_marker.len();

            let Some(tag_end) = opening_tag_end(bytes, attrs_start) else {
                debug!("Opening tag at offset {} has no closing '>', stopping scan", open);
                break;
            };

            if bytes[tag_end - 1] == b'/' {
                blocks.push(Block {
                    attributes: document[attrs_start..tag_end - 1].trim(),
                    body: "",
                });
                pos = tag_end + 1;
                continue;
            }

            let body_start = tag_end + 1;
            let Some(body_end) = self.body_end(bytes, body_start) else {
                debug!("Block at offset {} is never closed, stopping scan", open);
                break;
            };

            blocks.push(Block {
                attributes: document[attrs_start..tag_end].trim(),
                body: &document[body_start..body_end],
            });
            pos = body_end + self.end_marker.len();
        }

        blocks
    }

    fn next_start_marker(&self, document: &str, from: usize) -> Option<usize> {
        let mut from = from;
        while from < document.len() {
            let at = from + document[from..].find(&self.start_marker)?;
            if self.start_marker_at(document.as_bytes(), at) {
                return Some(at);
            }
            from = at + self.start_marker.len();
        }
        None
    }

    /// `<Tag` only counts when the tag name is not a prefix of a longer one
    fn start_marker_at(&self, bytes: &[u8], at: usize) -> bool {
        bytes[at..].starts_with(self.start_marker.as_bytes())
            && bytes
                .get(at + self.start_marker.len())
                .is_none_or(|&b| !is_ident_byte(b))
    }

    /// Finds the end marker that brings the depth from 1 back to 0
    fn body_end(&self, bytes: &[u8], start: usize) -> Option<usize> {
        let end_marker = self.end_marker.as_bytes();
        let mut depth = 1usize;
        let mut i = start;

        while i < bytes.len() {
            if is_quote(bytes[i]) {
                i = match closing_quote(bytes, i) {
                    Some(close) => close + 1,
                    None => i + 1,
                };
                continue;
            }

            if self.start_marker_at(bytes, i) {
                let tag_end = opening_tag_end(bytes, i + self.start_marker.len())?;
                if bytes[tag_end - 1] != b'/' {
                    depth += 1;
                }
                i = tag_end + 1;
                continue;
            }

            if bytes[i..].starts_with(end_marker) {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += end_marker.len();
                continue;
            }

            i += 1;
        }

        None
    }
}

/// Finds top-level `<Sequence>` blocks
pub fn find_blocks(document: &str) -> Vec<Block<'_>> {
    BlockScanner::default().scan(document)
}

/// Index of the `>` closing an opening tag whose attributes start at `from`
fn opening_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i),
            b if is_quote(b) => {
                i = match closing_quote(bytes, i) {
                    Some(close) => close + 1,
                    None => i + 1,
                };
            }
            _ => i += 1,
        }
    }
    None
}

/// Index of the unescaped quote closing the string opened at `open`.
///
/// A backslash and the byte after it are skipped as a pair.
pub(crate) fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

pub(crate) fn is_quote(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'`')
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
