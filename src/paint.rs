// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Paint server references.

/// Returns a paint server ID from a `fill`/`stroke` value.
///
/// Accepts `url(#id)`, `url('#id')`, `url("#id")` and `url(#id) fallback`.
pub(crate) fn paint_server_link(value: &str) -> Option<&str> {
    match svgtypes::Paint::from_str(value) {
        Ok(svgtypes::Paint::FuncIRI(link, _)) => Some(link),
        Ok(_) => None,
        Err(_) => quoted_func_iri(value),
    }
}

/// Parses a `url()` with a quoted IRI, which `svgtypes` rejects for double quotes.
fn quoted_func_iri(value: &str) -> Option<&str> {
    let rest = value.trim_start().strip_prefix("url(")?;
    let end = rest.find(')')?;
    let link = rest[..end].trim();
    let link = link
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| link.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))?;

    match link.trim().strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(id),
        _ => None,
    }
}

/// Returns all local element IDs referenced by an attribute value or a style sheet.
///
/// Both `#id` (`href`) and `url(#id)` forms are detected.
pub(crate) fn links(value: &str) -> Vec<&str> {
    let mut list = Vec::new();

    if let Ok(iri) = svgtypes::IRI::from_str(value.trim()) {
        list.push(iri.0);
    }

    let mut rest = value;
    while let Some(idx) = rest.find("url(") {
        rest = &rest[idx + 4..];
        let end = match rest.find(')') {
            Some(v) => v,
            None => break,
        };

        let inner = rest[..end].trim().trim_matches(|c| c == '\'' || c == '"');
        if let Some(id) = inner.strip_prefix('#') {
            if !id.is_empty() {
                list.push(id);
            }
        }

        rest = &rest[end..];
    }

    list
}
