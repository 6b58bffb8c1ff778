//! Font settings

use super::Color;
use std::hash::{Hash, Hasher};

/// Font used to render a cell's text
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    /// Family name, e.g. "Calibri"
    pub name: String,
    /// Size in points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Color,
}

impl Font {
    /// Size a fresh workbook uses
    pub const DEFAULT_SIZE: f64 = 11.0;
    /// Family a fresh workbook uses
    pub const DEFAULT_NAME: &'static str = "Calibri";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            size: Self::DEFAULT_SIZE,
            bold: false,
            italic: false,
            underline: Underline::None,
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

// Sizes are compared bitwise, matching `Hash`.
impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size.to_bits() == other.size.to_bits()
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikethrough == other.strikethrough
            && self.color == other.color
    }
}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
    }
}

impl Eq for Font {}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

impl Underline {
    /// Attribute value used in SpreadsheetML, `None` when no element is written
    pub fn xml_value(&self) -> Option<&'static str> {
        match self {
            Underline::None => None,
            Underline::Single => Some("single"),
            Underline::Double => Some("double"),
            Underline::SingleAccounting => Some("singleAccounting"),
            Underline::DoubleAccounting => Some("doubleAccounting"),
        }
    }

    /// Parse a SpreadsheetML attribute value; a bare `<u/>` means single
    pub fn from_xml(value: &str) -> Self {
        match value {
            "double" => Underline::Double,
            "singleAccounting" => Underline::SingleAccounting,
            "doubleAccounting" => Underline::DoubleAccounting,
            "none" => Underline::None,
            _ => Underline::Single,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(font: &Font) -> u64 {
        let mut hasher = DefaultHasher::new();
        font.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_signed_zero_sizes_are_distinct() {
        let positive = Font::new().with_size(0.0);
        let negative = Font::new().with_size(-0.0);
        assert_ne!(positive, negative);
        assert_ne!(hash_of(&positive), hash_of(&negative));
    }

    #[test]
    fn test_nan_size_equals_itself() {
        let font = Font::new().with_size(f64::NAN);
        assert_eq!(font, font.clone());
        assert_eq!(hash_of(&font), hash_of(&font.clone()));
    }

    #[test]
    fn test_equal_fonts_hash_equal() {
        let a = Font::new().with_name("Arial").with_size(12.0);
        let b = Font::new().with_size(12.0).with_name("Arial");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
