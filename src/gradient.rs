// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use roxmltree::{Node, NodeId};

use crate::{paint, style, ColorStrategy, OptionLog, XLINK_NS};

/// A single gradient stop.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Stop {
    /// `stop-color` as written in the document.
    ///
    /// `None` when not set or invalid.
    pub color: Option<String>,
    /// Normalized offset in a 0..1 range.
    pub offset: f64,
}

/// A `linearGradient` element.
#[derive(Clone, Debug)]
pub(crate) struct Gradient<'a, 'input: 'a> {
    pub node: Node<'a, 'input>,
    pub id: &'a str,
    pub stops: Vec<Stop>,
    /// A gradient referenced via `xlink:href`.
    pub link: Option<&'a str>,
}

/// A flat color that replaces a gradient.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct ResolvedColor {
    pub color: String,
    pub offset: f64,
}

/// All `linearGradient` elements of a document.
#[derive(Debug)]
pub(crate) struct Gradients<'a, 'input: 'a> {
    list: Vec<Gradient<'a, 'input>>,
    by_id: HashMap<&'a str, usize>,
}

impl<'a, 'input: 'a> Gradients<'a, 'input> {
    pub fn collect(doc: &'a roxmltree::Document<'input>) -> Self {
        let mut list = Vec::new();
        let mut by_id = HashMap::new();

        for node in doc
            .descendants()
            .filter(|n| crate::is_svg_element(*n, "linearGradient"))
        {
            let id = match node
                .attribute("id")
                .log_none(|| log::warn!("A 'linearGradient' without an ID. Skipped."))
            {
                Some(v) => v,
                None => continue,
            };

            // Like `getElementById`, the first element wins.
            if by_id.contains_key(id) {
                log::warn!("Duplicated gradient ID '{}'. Skipped.", id);
                continue;
            }

            let link = node
                .attribute((XLINK_NS, "href"))
                .or_else(|| node.attribute("href"))
                .and_then(|v| svgtypes::IRI::from_str(v.trim()).ok())
                .map(|v| v.0);

            by_id.insert(id, list.len());
            list.push(Gradient {
                node,
                id,
                stops: convert_stops(node),
                link,
            });
        }

        Gradients { list, by_id }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Gradient<'a, 'input>> {
        self.by_id.get(id).map(|idx| &self.list[*idx])
    }

    /// Resolves a flat color for each gradient.
    ///
    /// Gradients without a usable stop are not present in the returned map.
    pub fn resolve(&self, strategy: ColorStrategy) -> HashMap<&'a str, ResolvedColor> {
        let mut colors = HashMap::new();
        for gradient in &self.list {
            let stops = match self.find_gradient_with_stops(gradient) {
                Some(g) => &g.stops,
                None => {
                    log::warn!("Gradient '{}' has no stops. Skipped.", gradient.id);
                    continue;
                }
            };

            let stop = match strategy {
                ColorStrategy::FirstStop => stops.iter().find(|s| s.color.is_some()),
                ColorStrategy::LastStop => stops.iter().rev().find(|s| s.color.is_some()),
            };

            let resolved = stop.and_then(|s| {
                Some(ResolvedColor {
                    color: s.color.clone()?,
                    offset: s.offset,
                })
            });

            match resolved {
                Some(v) => {
                    colors.insert(gradient.id, v);
                }
                None => log::warn!("Gradient '{}' has no stop-color. Skipped.", gradient.id),
            }
        }

        colors
    }

    /// Follows `xlink:href` until a gradient with stops is found.
    fn find_gradient_with_stops<'g>(
        &'g self,
        gradient: &'g Gradient<'a, 'input>,
    ) -> Option<&'g Gradient<'a, 'input>> {
        let mut visited = HashSet::new();
        let mut current = gradient;
        loop {
            if !current.stops.is_empty() {
                return Some(current);
            }

            if !visited.insert(current.id) {
                log::warn!("Gradient '{}' has a recursive 'xlink:href'.", gradient.id);
                return None;
            }

            let link = current.link?;
            current = self.get(link).log_none(|| {
                log::warn!(
                    "Gradient '{}' cannot reference '{}' via 'xlink:href'.",
                    current.id,
                    link
                )
            })?;
        }
    }

    /// Returns gradients that are no longer referenced by anything.
    ///
    /// `values` contains attribute values that were changed,
    /// indexed by the attribute value start position.
    /// Only gradients present in `colors` are checked.
    pub fn unused(
        &self,
        doc: &'a roxmltree::Document<'input>,
        colors: &HashMap<&'a str, ResolvedColor>,
        values: &HashMap<usize, String>,
    ) -> Vec<Node<'a, 'input>> {
        let mut unused: HashMap<&'a str, NodeId> = self
            .list
            .iter()
            .filter(|g| colors.contains_key(g.id))
            .map(|g| (g.id, g.node.id()))
            .collect();

        // Removing a gradient may unlink another one, so repeat until nothing changes.
        loop {
            let removed: HashSet<NodeId> = unused.values().copied().collect();
            let mut referenced = HashSet::new();

            for node in doc.descendants() {
                if node.ancestors().any(|n| removed.contains(&n.id())) {
                    continue;
                }

                if node.is_text() {
                    if node
                        .parent()
                        .map_or(false, |p| crate::is_svg_element(p, "style"))
                    {
                        referenced.extend(paint::links(node.text().unwrap_or("")));
                    }

                    continue;
                }

                for attr in node.attributes() {
                    if attr.name() == "id" {
                        continue;
                    }

                    let value = values
                        .get(&attr.range_value().start)
                        .map(String::as_str)
                        .unwrap_or(attr.value());
                    referenced.extend(paint::links(value));
                }
            }

            let count = unused.len();
            unused.retain(|id, _| !referenced.contains(id));
            if unused.len() == count {
                break;
            }
        }

        self.list
            .iter()
            .filter(|g| unused.contains_key(g.id))
            .map(|g| g.node)
            .collect()
    }
}

fn convert_stops(gradient: Node) -> Vec<Stop> {
    let mut stops = Vec::new();
    let mut prev_offset = 0.0;
    for node in gradient.children().filter(|n| n.is_element()) {
        if !crate::is_svg_element(node, "stop") {
            log::warn!("Invalid gradient child: '{}'.", node.tag_name().name());
            continue;
        }

        // `number` can be either a number or a percentage.
        let offset = node
            .attribute("offset")
            .and_then(|v| svgtypes::Length::from_str(v).ok())
            .and_then(|v| match v.unit {
                svgtypes::LengthUnit::None => Some(v.number),
                svgtypes::LengthUnit::Percent => Some(v.number / 100.0),
                _ => None,
            })
            .unwrap_or(prev_offset);

        // Offsets cannot decrease.
        let offset = offset.max(prev_offset).min(1.0).max(0.0);
        prev_offset = offset;

        stops.push(Stop {
            color: stop_color(node),
            offset,
        });
    }

    stops
}

fn stop_color(stop: Node) -> Option<String> {
    let value = stop
        .attribute("style")
        .and_then(|s| style::find(s, "stop-color"))
        .or_else(|| stop.attribute("stop-color"))?
        .trim();

    if value == "currentColor" {
        return Some(current_color(stop));
    }

    match svgtypes::Color::from_str(value) {
        Ok(_) => Some(value.to_string()),
        Err(_) => {
            log::warn!("Failed to parse stop-color value: '{}'.", value);
            None
        }
    }
}

/// Resolves `currentColor` using the closest `color` attribute.
fn current_color(stop: Node) -> String {
    for node in stop.ancestors().filter(|n| n.is_element()) {
        let value = node
            .attribute("style")
            .and_then(|s| style::find(s, "color"))
            .or_else(|| node.attribute("color"))
            .map(str::trim);

        if let Some(value) = value {
            if svgtypes::Color::from_str(value).is_ok() {
                return value.to_string();
            }
        }
    }

    "black".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> roxmltree::Document {
        roxmltree::Document::parse(text).unwrap()
    }

    #[test]
    fn stops_and_offsets() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <linearGradient id='lg1'>
                    <stop offset='0.5' stop-color='red'/>
                    <stop offset='20%' style='stop-color:blue'/>
                    <stop offset='80%'/>
                </linearGradient>
            </svg>",
        );

        let gradients = Gradients::collect(&doc);
        let lg = gradients.get("lg1").unwrap();
        assert_eq!(
            lg.stops,
            vec![
                Stop {
                    color: Some("red".to_string()),
                    offset: 0.5
                },
                Stop {
                    color: Some("blue".to_string()),
                    offset: 0.5
                },
                Stop {
                    color: None,
                    offset: 0.8
                },
            ]
        );
    }

    #[test]
    fn gradient_without_id() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <linearGradient><stop stop-color='red'/></linearGradient>
            </svg>",
        );

        assert!(Gradients::collect(&doc).is_empty());
    }

    #[test]
    fn current_color_stop() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg' color='green'>
                <linearGradient id='lg1'><stop stop-color='currentColor'/></linearGradient>
                <linearGradient id='lg2' style='color:#123456'>
                    <stop stop-color='currentColor'/>
                </linearGradient>
            </svg>",
        );

        let colors = Gradients::collect(&doc).resolve(ColorStrategy::FirstStop);
        assert_eq!(colors["lg1"].color, "green");
        assert_eq!(colors["lg2"].color, "#123456");
    }

    #[test]
    fn last_stop_strategy() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <linearGradient id='lg1'>
                    <stop stop-color='red'/>
                    <stop stop-color='blue'/>
                    <stop/>
                </linearGradient>
            </svg>",
        );

        let colors = Gradients::collect(&doc).resolve(ColorStrategy::LastStop);
        assert_eq!(colors["lg1"].color, "blue");
    }

    #[test]
    fn recursive_href() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <linearGradient id='lg1' href='#lg2'/>
                <linearGradient id='lg2' href='#lg1'/>
            </svg>",
        );

        let colors = Gradients::collect(&doc).resolve(ColorStrategy::FirstStop);
        assert!(colors.is_empty());
    }
}
