//! Field text cleanup.
//!
//! Applied to every extracted field before it is stored, so that all text
//! reaching a timeline or output row has passed through it:
//! 1. Runs of garbled glyphs (replacement characters and their common
//!    mojibake forms) become a single placeholder character
//! 2. Control characters other than newline and tab are removed
//! 3. Whitespace runs, newlines included, collapse to one space
//! 4. Leading and trailing whitespace is trimmed

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// U+FFFD, the UTF-8 bytes of U+FFFD read as Latin-1, and the same bytes
/// read as GBK.
static GARBLED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?:\u{FFFD}|ï¿½|锟斤拷)+").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Cleans a single field value.
#[must_use]
pub fn normalize_text(input: &str, placeholder: char) -> String {
    let mut buf = [0u8; 4];
    let placeholder: &str = placeholder.encode_utf8(&mut buf);

    let replaced = GARBLED_RE.replace_all(input, NoExpand(placeholder));
    let printable: String = replaced
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();

    WHITESPACE_RE.replace_all(&printable, " ").trim().to_string()
}
