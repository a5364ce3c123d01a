// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::WriterOptions;

/// A gradient stop selection method.
///
/// Defines which stop color replaces the whole gradient.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorStrategy {
    /// The first stop with a color.
    FirstStop,
    /// The last stop with a color.
    LastStop,
}

impl Default for ColorStrategy {
    fn default() -> Self {
        ColorStrategy::FirstStop
    }
}

impl std::str::FromStr for ColorStrategy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(ColorStrategy::FirstStop),
            "last" => Ok(ColorStrategy::LastStop),
            _ => Err("invalid"),
        }
    }
}

/// A list of paint attributes that will be flattened.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PaintAttributes {
    /// Only `fill`.
    Fill,
    /// `fill` and `stroke`.
    FillAndStroke,
}

impl PaintAttributes {
    pub(crate) fn names(self) -> &'static [&'static str] {
        match self {
            PaintAttributes::Fill => &["fill"],
            PaintAttributes::FillAndStroke => &["fill", "stroke"],
        }
    }
}

impl Default for PaintAttributes {
    fn default() -> Self {
        PaintAttributes::Fill
    }
}

impl std::str::FromStr for PaintAttributes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fill" => Ok(PaintAttributes::Fill),
            "fill-and-stroke" => Ok(PaintAttributes::FillAndStroke),
            _ => Err("invalid"),
        }
    }
}

/// Processing options.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Specifies which gradient stop provides the flat color.
    ///
    /// Default: FirstStop
    pub strategy: ColorStrategy,

    /// Specifies which paint attributes are checked for gradient references.
    ///
    /// Applies to both the attribute form (`fill="url(#lg1)"`)
    /// and the `style` form (`style="fill:url(#lg1)"`).
    ///
    /// Default: Fill
    pub paint: PaintAttributes,

    /// Removes `linearGradient` elements that are no longer referenced
    /// after flattening.
    ///
    /// Default: false
    pub remove_gradients: bool,

    /// Re-serializes the output with the provided writer options.
    ///
    /// When not set, the input text is preserved as is
    /// and only the flattened values are replaced.
    ///
    /// Default: `None`
    pub pretty: Option<WriterOptions>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            strategy: ColorStrategy::default(),
            paint: PaintAttributes::default(),
            remove_gradients: false,
            pretty: None,
        }
    }
}
