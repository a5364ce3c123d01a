// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;
use std::ops::Range;

#[derive(Clone, Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// A list of byte range replacements for a source text.
///
/// Everything outside the edited ranges is copied as is.
#[derive(Clone, Default, Debug)]
pub(crate) struct TextEdits {
    edits: Vec<Edit>,
}

impl TextEdits {
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(Edit {
            range,
            text: text.into(),
        });
    }

    pub fn remove(&mut self, range: Range<usize>) {
        self.replace(range, String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies all edits to `text`.
    ///
    /// An edit that overlaps a preceding one is ignored. Since edits are sorted
    /// by start and then by descending end, an enclosing removal always wins.
    pub fn apply(mut self, text: &str) -> String {
        self.edits.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for edit in &self.edits {
            if edit.range.start < pos {
                continue;
            }

            out.push_str(&text[pos..edit.range.start]);
            out.push_str(&edit.text);
            pos = edit.range.end;
        }
        out.push_str(&text[pos..]);

        out
    }
}

/// Escapes an attribute value that will be placed between `quote` characters.
pub(crate) fn escape_attribute(value: &str, quote: char) -> Cow<str> {
    if !value.contains(|c| c == '&' || c == '<' || c == quote) {
        return Cow::Borrowed(value);
    }

    let mut s = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '"' if quote == '"' => s.push_str("&quot;"),
            '\'' if quote == '\'' => s.push_str("&apos;"),
            _ => s.push(c),
        }
    }

    Cow::Owned(s)
}

/// Maps byte positions of a parsed attribute value to positions in its source text.
///
/// The returned list has an entry for each `value` byte plus the end position.
/// Returns `None` when `raw` contains entities that cannot be mapped,
/// like the ones declared in a DTD.
pub(crate) fn value_offsets(raw: &str, value: &str) -> Option<Vec<usize>> {
    let mut offsets = Vec::with_capacity(value.len() + 1);
    let mut pos = 0;
    while pos < raw.len() {
        let rest = &raw[pos..];
        let (c, raw_len) = if rest.starts_with('&') {
            let end = rest.find(';')?;
            (resolve_entity(&rest[1..end])?, end + 1)
        } else if rest.starts_with("\r\n") {
            (' ', 2)
        } else {
            let c = rest.chars().next()?;
            (c, c.len_utf8())
        };

        offsets.extend(std::iter::repeat(pos).take(c.len_utf8()));
        pos += raw_len;
    }
    offsets.push(raw.len());

    if offsets.len() == value.len() + 1 {
        Some(offsets)
    } else {
        None
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match name.strip_prefix("#x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => name.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edits() {
        let edits = TextEdits::default();
        assert!(edits.is_empty());
        assert_eq!(edits.apply("<svg/>"), "<svg/>");
    }

    #[test]
    fn unordered_edits() {
        let mut edits = TextEdits::default();
        edits.replace(6..9, "blue");
        edits.replace(0..3, "one");
        assert_eq!(edits.apply("abc - xyz"), "one - blue");
    }

    #[test]
    fn enclosing_removal_wins() {
        let mut edits = TextEdits::default();
        edits.replace(3..4, "X");
        edits.remove(1..6);
        assert_eq!(edits.apply("0123456"), "06");
    }

    #[test]
    fn plain_value_offsets() {
        let offsets = value_offsets("fill:red", "fill:red").unwrap();
        assert_eq!(offsets, (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn value_offsets_with_entities() {
        let raw = "a:&gt;;&#10;b:&#x442;";
        let value = "a:>;\nb:\u{442}";
        let offsets = value_offsets(raw, value).unwrap();
        assert_eq!(offsets.len(), value.len() + 1);
        // `;` after `&gt;`
        assert_eq!(offsets[3], 6);
        // `b` after `&#10;`
        assert_eq!(offsets[5], 12);
        // both bytes of `т` point to `&#x442;`
        assert_eq!(offsets[7], 14);
        assert_eq!(offsets[8], 14);
        assert_eq!(offsets[9], raw.len());
    }

    #[test]
    fn unknown_entity_offsets() {
        assert_eq!(value_offsets("&custom;", "value"), None);
    }

    #[test]
    fn escape() {
        assert_eq!(escape_attribute("red", '"'), "red");
        assert_eq!(escape_attribute("a&b<\"'", '"'), "a&amp;b&lt;&quot;'");
        assert_eq!(escape_attribute("'", '\''), "&apos;");
    }
}
