// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `style` attribute declarations.

use std::ops::Range;

/// A single `name: value` pair of a `style` attribute.
#[derive(Clone, Debug)]
pub(crate) struct Declaration<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Byte range of `value` inside the style string.
    pub value_range: Range<usize>,
}

/// Splits a `style` attribute into declarations.
pub(crate) fn declarations(style: &str) -> Vec<Declaration> {
    simplecss::DeclarationTokenizer::from(style)
        .filter_map(|d| {
            let value = d.value.trim();
            let value_range = subslice_range(style, value)?;
            Some(Declaration {
                name: d.name,
                value,
                value_range,
            })
        })
        .collect()
}

/// Returns the value of a declaration.
///
/// The last declaration wins, like in CSS.
pub(crate) fn find<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    simplecss::DeclarationTokenizer::from(style)
        .filter(|d| d.name == name)
        .last()
        .map(|d| d.value)
}

// `simplecss` returns slices of the input, so the position can be recovered.
fn subslice_range(outer: &str, inner: &str) -> Option<Range<usize>> {
    let start = (inner.as_ptr() as usize).checked_sub(outer.as_ptr() as usize)?;
    let end = start + inner.len();
    if outer.get(start..end) == Some(inner) {
        Some(start..end)
    } else {
        None
    }
}
