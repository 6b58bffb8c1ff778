//! Number formats

use crate::error::{Error, Result};

/// How a numeric cell is displayed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    #[default]
    General,
    /// One of the formats every spreadsheet application knows by id
    BuiltIn(u32),
    /// Format code such as `"$"#,##0.00`
    Custom(String),
}

impl NumberFormat {
    /// Longest format code accepted
    pub const MAX_CODE_LEN: usize = 255;

    /// 1 - 0
    pub const ID_INTEGER: u32 = 1;
    /// 2 - 0.00
    pub const ID_DECIMAL: u32 = 2;
    /// 3 - #,##0
    pub const ID_THOUSANDS: u32 = 3;
    /// 4 - #,##0.00
    pub const ID_THOUSANDS_DECIMAL: u32 = 4;
    /// 9 - 0%
    pub const ID_PERCENT: u32 = 9;
    /// 10 - 0.00%
    pub const ID_PERCENT_DECIMAL: u32 = 10;
    /// 14 - mm-dd-yy
    pub const ID_DATE: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    pub fn custom<S: Into<String>>(code: S) -> Self {
        NumberFormat::Custom(code.into())
    }

    /// Dollar amount with two decimals
    pub fn currency() -> Self {
        NumberFormat::Custom("\"$\"#,##0.00".to_string())
    }

    pub fn integer() -> Self {
        NumberFormat::BuiltIn(Self::ID_INTEGER)
    }

    pub fn decimal() -> Self {
        NumberFormat::BuiltIn(Self::ID_DECIMAL)
    }

    pub fn thousands() -> Self {
        NumberFormat::BuiltIn(Self::ID_THOUSANDS)
    }

    pub fn percent() -> Self {
        NumberFormat::BuiltIn(Self::ID_PERCENT)
    }

    pub fn percent_decimal() -> Self {
        NumberFormat::BuiltIn(Self::ID_PERCENT_DECIMAL)
    }

    pub fn date() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATE)
    }

    pub fn datetime() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATETIME)
    }

    pub fn text() -> Self {
        NumberFormat::BuiltIn(Self::ID_TEXT)
    }

    /// The format code text
    pub fn format_code(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => Self::builtin_code(*id).unwrap_or("General"),
            NumberFormat::Custom(code) => code,
        }
    }

    /// Code of a built-in format, `None` for ids outside the standard table
    pub fn builtin_code(id: u32) -> Option<&'static str> {
        let code = match id {
            0 => "General",
            1 => "0",
            2 => "0.00",
            3 => "#,##0",
            4 => "#,##0.00",
            9 => "0%",
            10 => "0.00%",
            11 => "0.00E+00",
            12 => "# ?/?",
            13 => "# ??/??",
            14 => "mm-dd-yy",
            15 => "d-mmm-yy",
            16 => "d-mmm",
            17 => "mmm-yy",
            18 => "h:mm AM/PM",
            19 => "h:mm:ss AM/PM",
            20 => "h:mm",
            21 => "h:mm:ss",
            22 => "m/d/yy h:mm",
            37 => "#,##0 ;(#,##0)",
            38 => "#,##0 ;[Red](#,##0)",
            39 => "#,##0.00;(#,##0.00)",
            40 => "#,##0.00;[Red](#,##0.00)",
            49 => "@",
            _ => return None,
        };
        Some(code)
    }

    /// Whether the format shows a currency symbol
    pub fn is_currency(&self) -> bool {
        let code = self.format_code();
        code.contains('$') || code.contains('€') || code.contains('£') || code.contains('¥')
    }

    /// Whether the format renders a date or time
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22),
            NumberFormat::Custom(code) => {
                let mut in_quotes = false;
                let mut in_brackets = false;
                for c in code.chars() {
                    match c {
                        '"' => in_quotes = !in_quotes,
                        '[' if !in_quotes => in_brackets = true,
                        ']' if !in_quotes => in_brackets = false,
                        'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M'
                            if !in_quotes && !in_brackets =>
                        {
                            return true
                        }
                        _ => {}
                    }
                }
                false
            }
        }
    }

    /// Check that the format is something a spreadsheet application will accept
    pub fn validate(&self) -> Result<()> {
        let code = match self {
            NumberFormat::General => return Ok(()),
            NumberFormat::BuiltIn(id) => {
                return match Self::builtin_code(*id) {
                    Some(_) => Ok(()),
                    None => Err(Self::invalid(&id.to_string(), "unknown built-in format id")),
                }
            }
            NumberFormat::Custom(code) => code,
        };

        if code.trim().is_empty() {
            return Err(Self::invalid(code, "format code is empty"));
        }
        if code.chars().count() > Self::MAX_CODE_LEN {
            return Err(Self::invalid(code, "format code is longer than 255 characters"));
        }

        let mut in_quotes = false;
        let mut bracket_depth = 0u32;
        let mut sections = 1;
        let mut chars = code.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' if !in_quotes => {
                    if chars.next().is_none() {
                        return Err(Self::invalid(code, "dangling escape at end of code"));
                    }
                }
                '"' => in_quotes = !in_quotes,
                '[' if !in_quotes => {
                    if bracket_depth > 0 {
                        return Err(Self::invalid(code, "nested '['"));
                    }
                    bracket_depth += 1;
                }
                ']' if !in_quotes => {
                    if bracket_depth == 0 {
                        return Err(Self::invalid(code, "unmatched ']'"));
                    }
                    bracket_depth -= 1;
                }
                ';' if !in_quotes && bracket_depth == 0 => sections += 1,
                _ => {}
            }
        }

        if in_quotes {
            return Err(Self::invalid(code, "unterminated quoted text"));
        }
        if bracket_depth > 0 {
            return Err(Self::invalid(code, "unterminated '['"));
        }
        if sections > 4 {
            return Err(Self::invalid(code, "more than four sections"));
        }
        Ok(())
    }

    fn invalid(code: &str, reason: &str) -> Error {
        Error::InvalidNumberFormat {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert_eq!(NumberFormat::General.format_code(), "General");
        assert_eq!(NumberFormat::percent().format_code(), "0%");
        assert_eq!(NumberFormat::date().format_code(), "mm-dd-yy");
        assert_eq!(NumberFormat::currency().format_code(), "\"$\"#,##0.00");
        assert!(NumberFormat::currency().is_currency());
        assert!(!NumberFormat::thousands().is_currency());
    }

    #[test]
    fn test_date_detection() {
        assert!(NumberFormat::date().is_date_format());
        assert!(NumberFormat::custom("yyyy-mm-dd").is_date_format());
        assert!(!NumberFormat::currency().is_date_format());
        assert!(!NumberFormat::custom("0.00\"days\"").is_date_format());
        assert!(!NumberFormat::custom("[Red]0.00").is_date_format());
    }

    #[test]
    fn test_validate() {
        assert!(NumberFormat::General.validate().is_ok());
        assert!(NumberFormat::currency().validate().is_ok());
        assert!(NumberFormat::custom("#,##0;[Red]-#,##0;\"zero\";@").validate().is_ok());
        assert!(NumberFormat::BuiltIn(9).validate().is_ok());

        for bad in ["", "\"$#,##0", "[Red0.00", "0.00]", "0;0;0;0;0", "0\\"] {
            let err = NumberFormat::custom(bad).validate().unwrap_err();
            assert!(matches!(err, Error::InvalidNumberFormat { .. }), "{bad}");
        }
        assert!(NumberFormat::BuiltIn(7).validate().is_err());
        assert!(NumberFormat::custom("0".repeat(256)).validate().is_err());
    }
}
