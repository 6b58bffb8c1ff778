//! Cell background fills

use super::Color;

/// Background of a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fill {
    /// Transparent
    #[default]
    None,
    /// Solid color
    Solid(Color),
    /// Two-color pattern
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Fill::Solid(color)
    }

    pub fn pattern(pattern: PatternType, foreground: Color, background: Color) -> Self {
        Fill::Pattern {
            pattern,
            foreground,
            background,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Fill::None)
    }
}

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternType {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkGrid,
    LightHorizontal,
    LightVertical,
    LightGrid,
    Gray125,
}

impl PatternType {
    /// Name used by the `patternType` attribute
    pub fn xml_name(&self) -> &'static str {
        match self {
            PatternType::None => "none",
            PatternType::Solid => "solid",
            PatternType::MediumGray => "mediumGray",
            PatternType::DarkGray => "darkGray",
            PatternType::LightGray => "lightGray",
            PatternType::DarkHorizontal => "darkHorizontal",
            PatternType::DarkVertical => "darkVertical",
            PatternType::DarkGrid => "darkGrid",
            PatternType::LightHorizontal => "lightHorizontal",
            PatternType::LightVertical => "lightVertical",
            PatternType::LightGrid => "lightGrid",
            PatternType::Gray125 => "gray125",
        }
    }

    /// Inverse of [`PatternType::xml_name`]; unknown names fall back to `None`
    pub fn from_xml_name(name: &str) -> Self {
        match name {
            "solid" => PatternType::Solid,
            "mediumGray" => PatternType::MediumGray,
            "darkGray" => PatternType::DarkGray,
            "lightGray" => PatternType::LightGray,
            "darkHorizontal" => PatternType::DarkHorizontal,
            "darkVertical" => PatternType::DarkVertical,
            "darkGrid" => PatternType::DarkGrid,
            "lightHorizontal" => PatternType::LightHorizontal,
            "lightVertical" => PatternType::LightVertical,
            "lightGrid" => PatternType::LightGrid,
            "gray125" => PatternType::Gray125,
            _ => PatternType::None,
        }
    }
}
