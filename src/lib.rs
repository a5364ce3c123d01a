// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgflat` replaces `linearGradient` paint in SVG files with flat colors.

Some GUI toolkits export every filled region as a `linearGradient`,
even when the region has a single solid color. Many SVG to PDF converters
do not support such gradients. `svgflat` replaces each reference to
a linear gradient with the color of one of its stops.

## Features

- `fill="url(#id)"` and `style="fill:url(#id)"` references are replaced
- Optionally, `stroke` references are replaced too
- Stops inherited via `xlink:href` are supported
- `stop-color` can be set via an attribute or a `style`
- Unreferenced gradients can be removed
- Everything else is preserved as is, byte for byte
- SVGZ input is supported

## Limitations

- Only the color of a single stop is used. Colors are never averaged
- `radialGradient` and `pattern` are left untouched
- References inside CSS style sheets are left untouched

## Example

```
let svg = "<svg xmlns='http://www.w3.org/2000/svg'>
    <linearGradient id='lg1'>
        <stop offset='0' stop-color='red'/>
        <stop offset='1' stop-color='blue'/>
    </linearGradient>
    <rect fill='url(#lg1)' width='10' height='10'/>
</svg>";

let flat = svgflat::flatten(svg).unwrap();
assert!(flat.contains("<rect fill='red'"));
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

mod edit;
mod error;
mod gradient;
mod options;
mod paint;
mod style;
mod writer;

use std::collections::HashMap;
use std::io::Read;

pub use error::Error;
pub use options::{ColorStrategy, Options, PaintAttributes};
pub use writer::WriterOptions;
pub use xmlwriter::Indent;

use edit::TextEdits;
use gradient::{Gradients, ResolvedColor};

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub(crate) const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

trait OptionLog {
    fn log_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn log_none<F: FnOnce()>(self, f: F) -> Self {
        self.or_else(|| {
            f();
            None
        })
    }
}

/// Flattens gradients in an SVG string using default options.
pub fn flatten(text: &str) -> Result<String, Error> {
    flatten_str(text, &Options::default())
}

/// Flattens gradients in an SVG data.
///
/// Can contain an SVG string or a gzip compressed data.
/// The output is always an uncompressed SVG string.
pub fn flatten_data(data: &[u8], opt: &Options) -> Result<String, Error> {
    if data.starts_with(&[0x1f, 0x8b]) {
        let data = decompress_svgz(data)?;
        let text = std::str::from_utf8(&data).map_err(|_| Error::NotAnUtf8Str)?;
        flatten_str(text, opt)
    } else {
        let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
        flatten_str(text, opt)
    }
}

/// Flattens gradients in an SVG string.
pub fn flatten_str(text: &str, opt: &Options) -> Result<String, Error> {
    let doc = parse_svg(text)?;

    let gradients = Gradients::collect(&doc);
    if gradients.is_empty() {
        log::info!("No 'linearGradient' elements found.");
    }

    let colors = gradients.resolve(opt.strategy);

    let mut edits = TextEdits::default();
    // New attribute values indexed by the value start position.
    let mut values = HashMap::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        flatten_element(node, text, &colors, opt, &mut edits, &mut values, &mut counts);
    }

    for (id, resolved) in &colors {
        log::info!(
            "Replaced {} reference(s) to '{}' with '{}' (stop at {}).",
            counts.get(id).copied().unwrap_or(0),
            id,
            resolved.color,
            resolved.offset
        );
    }

    if opt.remove_gradients {
        for node in gradients.unused(&doc, &colors, &values) {
            let mut range = node.range();

            // Remove the indent too.
            if let Some(prev) = node.prev_sibling() {
                if prev.is_text() && prev.text().map_or(false, |t| t.trim().is_empty()) {
                    range.start = prev.range().start;
                }
            }

            log::info!(
                "Removed gradient '{}'.",
                node.attribute("id").unwrap_or_default()
            );
            edits.remove(range);
        }
    }

    let flat = if edits.is_empty() {
        text.to_string()
    } else {
        edits.apply(text)
    };

    match opt.pretty {
        Some(ref writer_opt) => writer::write(&flat, writer_opt),
        None => Ok(flat),
    }
}

fn flatten_element<'a>(
    node: roxmltree::Node,
    text: &str,
    colors: &HashMap<&'a str, ResolvedColor>,
    opt: &Options,
    edits: &mut TextEdits,
    values: &mut HashMap<usize, String>,
    counts: &mut HashMap<&'a str, usize>,
) {
    let names = opt.paint.names();
    for attr in node.attributes() {
        if attr.namespace().is_some() {
            continue;
        }

        let range = attr.range_value();
        let quote = quote_before(text, range.start);

        if names.contains(&attr.name()) {
            if let Some((id, color)) = find_color(attr.value(), colors) {
                *counts.entry(id).or_default() += 1;
                edits.replace(range.clone(), edit::escape_attribute(color, quote));
                values.insert(range.start, color.to_string());
            }
        } else if attr.name() == "style" {
            let value = attr.value();
            let mut replaced = Vec::new();
            for decl in style::declarations(value) {
                if !names.contains(&decl.name) {
                    continue;
                }

                if let Some((id, color)) = find_color(decl.value, colors) {
                    *counts.entry(id).or_default() += 1;
                    replaced.push((decl.value_range, color));
                }
            }

            if replaced.is_empty() {
                continue;
            }

            let mut style_edits = TextEdits::default();
            for (decl_range, color) in &replaced {
                style_edits.replace(decl_range.clone(), *color);
            }
            let new_value = style_edits.apply(value);

            let raw = text.get(range.clone()).unwrap_or_default();
            match edit::value_offsets(raw, value) {
                Some(offsets) => {
                    // The rest of the value keeps its source bytes.
                    for (decl_range, color) in &replaced {
                        let start = range.start + offsets[decl_range.start];
                        let end = range.start + offsets[decl_range.end];
                        edits.replace(start..end, edit::escape_attribute(color, quote));
                    }
                }
                None => {
                    edits.replace(range.clone(), edit::escape_attribute(&new_value, quote));
                }
            }

            values.insert(range.start, new_value);
        }
    }
}

fn find_color<'a, 'c>(
    value: &str,
    colors: &'c HashMap<&'a str, ResolvedColor>,
) -> Option<(&'a str, &'c str)> {
    let link = paint::paint_server_link(value)?;
    match colors.get_key_value(link) {
        Some((id, resolved)) => Some((*id, resolved.color.as_str())),
        None => {
            log::debug!("Paint server '{}' is not a flattened gradient.", link);
            None
        }
    }
}

/// Returns the quote character that opens an attribute value at `pos`.
fn quote_before(text: &str, pos: usize) -> char {
    match pos.checked_sub(1).and_then(|i| text.as_bytes().get(i)) {
        Some(b'\'') => '\'',
        _ => '"',
    }
}

pub(crate) fn parse_svg(text: &str) -> Result<roxmltree::Document, Error> {
    let xml_opt = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };

    let doc = roxmltree::Document::parse_with_options(text, xml_opt)?;
    if !is_svg_element(doc.root_element(), "svg") {
        return Err(Error::NotAnSvg);
    }

    Ok(doc)
}

/// Checks that a node is an SVG element with the specified name.
///
/// Elements without a namespace are treated as SVG ones too.
pub(crate) fn is_svg_element(node: roxmltree::Node, name: &str) -> bool {
    let tag_name = node.tag_name();
    node.is_element()
        && tag_name.name() == name
        && tag_name.namespace().map_or(true, |ns| ns == SVG_NS)
}

/// Decompresses an SVGZ file.
pub fn decompress_svgz(data: &[u8]) -> Result<Vec<u8>, Error> {
    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut decoded)
        .map_err(|_| Error::MalformedGZip)?;
    Ok(decoded)
}
