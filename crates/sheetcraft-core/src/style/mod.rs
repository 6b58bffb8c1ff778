//! Cell style descriptions
//!
//! [`StyleConfig`] is the value handed to a backing engine when a style is
//! registered. It is compared and hashed field by field, so two configurations
//! built independently with the same settings are interchangeable.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{Border, BorderEdge, BorderLineStyle};
pub use color::Color;
pub use fill::{Fill, PatternType};
pub use font::{Font, Underline};
pub use number_format::NumberFormat;

use std::fmt;

/// Identifier an engine hands back for a registered style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleId(pub u32);

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Complete formatting of one cell
///
/// Fields are private; builder methods consume and return the value, and getters
/// hand out shared references. A clone is an independent value.
///
/// ```rust
/// use sheetcraft_core::{Color, NumberFormat, StyleConfig};
///
/// let header = StyleConfig::new().bold(true).fill_color(Color::rgb(0xDD, 0xEB, 0xF7));
/// let same = StyleConfig::new().fill_color(Color::rgb(0xDD, 0xEB, 0xF7)).bold(true);
/// assert_eq!(header, same);
///
/// let money = header.clone().number_format(NumberFormat::currency());
/// assert_ne!(header, money);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleConfig {
    font: Font,
    fill: Fill,
    border: Border,
    alignment: Alignment,
    number_format: NumberFormat,
}

impl StyleConfig {
    /// Create the default style (Calibri 11, no fill, no border, General)
    pub fn new() -> Self {
        Self::default()
    }

    /// Font settings
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Fill settings
    pub fn fill(&self) -> &Fill {
        &self.fill
    }

    /// Border settings
    pub fn border(&self) -> &Border {
        &self.border
    }

    /// Alignment settings
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Number format
    pub fn format(&self) -> &NumberFormat {
        &self.number_format
    }

    /// Whether every field still has its default value
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Replace the whole font
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Replace the whole fill
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Replace all borders
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    /// Replace the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set font to italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    /// Set font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set font family
    pub fn font_name<S: Into<String>>(mut self, name: S) -> Self {
        self.font.name = name.into();
        self
    }

    /// Set font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Set a solid background color
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = Fill::Solid(color);
        self
    }

    /// Thin black border on all four sides
    pub fn thin_border(mut self) -> Self {
        self.border = Border::all(BorderLineStyle::Thin, Color::BLACK);
        self
    }

    /// Set horizontal alignment
    pub fn align(mut self, horizontal: HorizontalAlignment) -> Self {
        self.alignment.horizontal = horizontal;
        self
    }

    /// Set vertical alignment
    pub fn valign(mut self, vertical: VerticalAlignment) -> Self {
        self.alignment.vertical = vertical;
        self
    }

    /// Enable text wrapping
    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.alignment.wrap_text = wrap;
        self
    }

    /// Set number format
    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Short human description, used in log lines and error messages
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.font.bold {
            parts.push("bold".to_string());
        }
        if self.font.italic {
            parts.push("italic".to_string());
        }
        if self.font.size != Font::DEFAULT_SIZE {
            parts.push(format!("{}pt", self.font.size));
        }
        if !self.fill.is_none() {
            parts.push("filled".to_string());
        }
        if !self.border.is_empty() {
            parts.push("bordered".to_string());
        }
        if self.number_format != NumberFormat::General {
            parts.push(format!("format '{}'", self.number_format.format_code()));
        }
        if parts.is_empty() {
            "default".to_string()
        } else {
            parts.join(", ")
        }
    }
}
