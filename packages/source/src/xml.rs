//! Error-tolerant XML tree building.
//!
//! Report files are frequently malformed: unclosed elements, stray end
//! tags, undefined entities, or truncated documents. [`parse_lenient`]
//! drives a [`quick_xml`] reader with end-name checking disabled and builds
//! a best-effort tree from whatever it can read:
//!
//! - an end tag closes the nearest open element with the same name, along
//!   with any unclosed elements nested inside it
//! - an end tag with no matching open element is ignored
//! - a `<` that cannot start markup is read as text
//! - unknown entities and bare `&` are kept verbatim, while the predefined
//!   and numeric entities around them are still decoded
//! - a hard syntax error stops reading, and everything read so far is kept
//! - elements still open at end of input are closed
//!
//! Only the first top-level element becomes the root. An unterminated
//! comment or CDATA section swallows the rest of the input, so elements
//! after it are lost.

use std::borrow::Cow;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Longest entity name considered when scanning for a closing `;`.
const MAX_ENTITY_LEN: usize = 32;

/// A parsed element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Qualified tag name.
    pub name: String,
    /// Character data that appears before the first child element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// Direct children named `name`.
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Self> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child named `name`, if there is one.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.as_str())
    }
}

/// Open-element stack plus the finished root.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<XmlNode>,
    root: Option<XmlNode>,
    ignored_roots: usize,
}

impl TreeBuilder {
    fn open(&mut self, node: XmlNode) {
        self.open.push(node);
    }

    fn attach(&mut self, node: XmlNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
        } else if self.root.is_none() {
            self.root = Some(node);
        } else {
            self.ignored_roots += 1;
        }
    }

    fn close(&mut self, name: &str) {
        let Some(depth) = self.open.iter().rposition(|n| n.name == name) else {
            log::trace!("Ignoring unmatched end tag </{name}>");
            return;
        };
        while self.open.len() > depth {
            if let Some(node) = self.open.pop() {
                self.attach(node);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(node) = self.open.last_mut()
            && node.children.is_empty()
        {
            node.text.push_str(text);
        }
    }

    fn finish(mut self) -> Option<XmlNode> {
        while let Some(node) = self.open.pop() {
            self.attach(node);
        }
        if self.ignored_roots > 0 {
            log::debug!(
                "Ignored {} top-level element(s) after the root",
                self.ignored_roots
            );
        }
        self.root
    }
}

/// Whether `c`, following a `<`, can begin a tag, end tag, comment,
/// CDATA section, or processing instruction.
fn starts_markup(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | ':' | '/' | '!' | '?')
}

/// Escapes every `<` that cannot start markup, leaving comments and CDATA
/// sections untouched.
fn escape_stray_angles(text: &str) -> Cow<'_, str> {
    let stray = |i: usize| !text[i + 1..].chars().next().is_some_and(starts_markup);
    if !text.match_indices('<').any(|(i, _)| stray(i)) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let i = pos + offset;
        let tail = &text[i..];

        let skip_to = [("<!--", "-->"), ("<![CDATA[", "]]>")]
            .iter()
            .find(|(open, _)| tail.starts_with(open))
            .map(|(open, close)| {
                tail[open.len()..]
                    .find(close)
                    .map_or(text.len(), |end| i + open.len() + end + close.len())
            });

        if let Some(end) = skip_to {
            pos = end;
        } else if stray(i) {
            out.push_str(&text[rest..i]);
            out.push_str("&lt;");
            rest = i + 1;
            pos = i + 1;
        } else {
            pos = i + 1;
        }
    }

    out.push_str(&text[rest..]);
    Cow::Owned(out)
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(value) = resolve_predefined_entity(name) {
        return Some(value.to_string());
    }

    let code = name.strip_prefix('#')?;
    let value = match code.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse().ok()?,
    };
    char::from_u32(value).map(String::from)
}

/// Decodes entities one at a time, keeping anything unresolvable as is.
fn unescape_each(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let resolved = after
            .char_indices()
            .take(MAX_ENTITY_LEN)
            .find(|&(_, c)| c == ';' || c == '&' || c.is_whitespace())
            .filter(|&(_, c)| c == ';')
            .and_then(|(end, _)| resolve_entity(&after[..end]).map(|v| (end, v)));

        if let Some((end, value)) = resolved {
            out.push_str(&value);
            rest = &after[end + 1..];
        } else {
            out.push('&');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Unescapes text content, falling back to entity-by-entity decoding when
/// the text holds an unknown entity or a bare `&`.
fn unescape_text(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or_else(|_| Cow::Owned(unescape_each(raw)))
}

/// Parses `text` into a best-effort element tree.
///
/// Returns `None` only when not a single element could be recovered.
#[must_use]
pub fn parse_lenient(text: &str) -> Option<XmlNode> {
    let text = escape_stray_angles(text);
    let mut reader = Reader::from_str(&text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.trim_text(false);

    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => builder.open(XmlNode::from_start(&start)),
            Ok(Event::Empty(start)) => builder.attach(XmlNode::from_start(&start)),
            Ok(Event::End(end)) => builder.close(&String::from_utf8_lossy(end.name().as_ref())),
            Ok(Event::Text(raw)) => {
                let raw = String::from_utf8_lossy(&raw);
                builder.text(&unescape_text(&raw));
            }
            Ok(Event::CData(cdata)) => {
                let bytes: Cow<'_, [u8]> = cdata.into_inner();
                builder.text(&String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                log::debug!(
                    "XML syntax error at byte {}: {e}; keeping partial tree",
                    reader.error_position()
                );
                break;
            }
        }
    }

    builder.finish()
}
