// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::{Node, NodeType};
use xmlwriter::{Indent, XmlWriter};

use crate::Error;

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriterOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// # Examples
    ///
    /// Before:
    ///
    /// ```text
    /// <rect fill="red"/>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <rect fill='red'/>
    /// ```
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// # Examples
    ///
    /// `Indent::None`
    /// Before:
    ///
    /// ```text
    /// <svg>
    ///     <rect fill="red"/>
    /// </svg>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <svg><rect fill="red"/></svg>
    /// ```
    ///
    /// Default: 4 spaces
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// # Examples
    ///
    /// `Indent::Spaces(2)`
    ///
    /// Before:
    ///
    /// ```text
    /// <svg>
    ///     <rect fill="red" stroke="black"/>
    /// </svg>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <svg>
    ///     <rect
    ///       fill="red"
    ///       stroke="black"/>
    /// </svg>
    /// ```
    ///
    /// Default: `None`
    pub attributes_indent: Indent,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            use_single_quote: false,
            indent: Indent::Spaces(4),
            attributes_indent: Indent::None,
        }
    }
}

/// Writes an SVG string back with normalized formatting.
///
/// Whitespace-only text nodes are replaced by the configured indent,
/// except inside `text` elements.
pub(crate) fn write(text: &str, opt: &WriterOptions) -> Result<String, Error> {
    let doc = crate::parse_svg(text)?;

    let mut xml = XmlWriter::new(xmlwriter::Options {
        use_single_quote: opt.use_single_quote,
        indent: opt.indent,
        attributes_indent: opt.attributes_indent,
    });
    xml.write_declaration();

    write_children(doc.root(), false, &mut xml);

    Ok(xml.end_document())
}

fn write_children(parent: Node, preserve_spaces: bool, xml: &mut XmlWriter) {
    for node in parent.children() {
        match node.node_type() {
            NodeType::Element => write_element(node, preserve_spaces, xml),
            NodeType::Text => {
                let text = node.text().unwrap_or_default();
                if preserve_spaces || !text.trim().is_empty() {
                    xml.write_text(&escape_text(text));
                }
            }
            NodeType::Comment => {
                xml.write_comment(node.text().unwrap_or_default());
            }
            NodeType::PI | NodeType::Root => {
                log::debug!("Processing instructions are not preserved.");
            }
        }
    }
}

fn write_element(node: Node, preserve_spaces: bool, xml: &mut XmlWriter) {
    let tag_name = node.tag_name();
    match tag_name.namespace().and_then(|ns| element_prefix(node, ns)) {
        Some(prefix) if !prefix.is_empty() => {
            xml.start_element(&format!("{}:{}", prefix, tag_name.name()));
        }
        _ => xml.start_element(tag_name.name()),
    }

    // Namespaces are declared where they enter the scope.
    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE_NS {
            continue;
        }

        let inherited = node.parent_element().map_or(false, |p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if inherited {
            continue;
        }

        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        xml.write_attribute_raw(&name, |buf| {
            buf.extend_from_slice(escape_attribute(ns.uri()).as_bytes())
        });
    }

    for attr in node.attributes() {
        let name = match attr.namespace() {
            None => attr.name().to_string(),
            Some(ns) => match attribute_prefix(node, ns) {
                Some(prefix) => format!("{}:{}", prefix, attr.name()),
                None => {
                    log::warn!("Attribute '{}' has an undeclared namespace.", attr.name());
                    continue;
                }
            },
        };

        xml.write_attribute_raw(&name, |buf| {
            buf.extend_from_slice(escape_attribute(attr.value()).as_bytes())
        });
    }

    let is_text = crate::is_svg_element(node, "text");
    if is_text {
        xml.set_preserve_whitespaces(true);
    }

    if node.has_children() {
        write_children(node, preserve_spaces || is_text, xml);
    }

    xml.end_element();

    if is_text && !preserve_spaces {
        xml.set_preserve_whitespaces(false);
    }
}

/// Returns an element prefix. The default namespace is preferred.
fn element_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .min_by_key(|ns| ns.name().is_some())
        .map(|ns| ns.name().unwrap_or(""))
}

/// Returns an attribute prefix. Attributes cannot use the default namespace.
fn attribute_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == XML_NAMESPACE_NS {
        return Some("xml");
    }

    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
