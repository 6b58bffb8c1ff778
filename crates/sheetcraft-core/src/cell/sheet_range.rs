//! Sheet-qualified ranges such as `Sales!A1:C10` or `'Q1 Sales'!$A$1:$C$10`

use super::{CellAddress, CellRange};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A range of cells on a named sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetRange {
    /// Sheet name, unquoted
    pub sheet: String,
    /// Cells on that sheet
    pub range: CellRange,
}

impl SheetRange {
    /// Create a sheet-qualified range
    pub fn new<S: Into<String>>(sheet: S, range: CellRange) -> Self {
        Self {
            sheet: sheet.into(),
            range,
        }
    }

    /// Parse `Sheet!A1:B2`, `'My Sheet'!A1:B2` or `Sheet!A1`
    ///
    /// Inside a quoted name a doubled apostrophe stands for one apostrophe.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (sheet, cells) = if let Some(quoted) = s.strip_prefix('\'') {
            let (name, rest) = Self::split_quoted(quoted)
                .ok_or_else(|| Error::InvalidRange(format!("unterminated sheet name in '{}'", s)))?;
            let cells = rest.strip_prefix('!').ok_or_else(|| {
                Error::InvalidRange(format!("expected '!' after sheet name in '{}'", s))
            })?;
            (name, cells)
        } else {
            let (name, cells) = s
                .rsplit_once('!')
                .ok_or_else(|| Error::InvalidRange(format!("missing sheet name in '{}'", s)))?;
            (name.to_string(), cells)
        };

        if sheet.is_empty() {
            return Err(Error::InvalidRange(format!("empty sheet name in '{}'", s)));
        }

        let range = CellRange::parse_ordered(cells)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;

        Ok(Self { sheet, range })
    }

    fn split_quoted(s: &str) -> Option<(String, &str)> {
        let mut name = String::new();
        let mut chars = s.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                name.push('\'');
            } else {
                return Some((name, &s[i + 1..]));
            }
        }
        None
    }

    /// Top-left cell of the range
    pub fn first_cell(&self) -> CellAddress {
        self.range.start
    }

    /// Sheet name as it must appear inside a formula
    pub fn quoted_sheet(&self) -> String {
        let plain = self
            .sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.sheet.starts_with(|c: char| c.is_ascii_digit());
        if plain {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }

    /// Formula form with absolute references (`'Q1 Sales'!$A$1:$C$10`)
    pub fn to_formula(&self) -> String {
        format!("{}!{}", self.quoted_sheet(), self.range.to_absolute_string())
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.quoted_sheet(), self.range)
    }
}

impl FromStr for SheetRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_and_quoted() {
        let r = SheetRange::parse("Sales!A1:C10").unwrap();
        assert_eq!(r.sheet, "Sales");
        assert_eq!(r.range, CellRange::parse("A1:C10").unwrap());

        let r = SheetRange::parse("'Q1 Sales'!$A$1:$C$10").unwrap();
        assert_eq!(r.sheet, "Q1 Sales");
        assert_eq!(r.range.row_count(), 10);

        let r = SheetRange::parse("'Bob''s data'!B2").unwrap();
        assert_eq!(r.sheet, "Bob's data");
        assert!(r.range.is_single_cell());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "A1:B2",
            "!A1:B2",
            "Sales!",
            "Sales!A1:",
            "Sales!B2:A1",
            "'Sales!A1:B2",
            "'Sales'A1:B2",
            "Sales!1A:B2",
        ] {
            assert!(SheetRange::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_formula_rendering() {
        let r = SheetRange::parse("'Q1 Sales'!A1:C10").unwrap();
        assert_eq!(r.to_formula(), "'Q1 Sales'!$A$1:$C$10");
        assert_eq!(r.to_string(), "'Q1 Sales'!A1:C10");

        let r = SheetRange::parse("Data!A2:A13").unwrap();
        assert_eq!(r.to_formula(), "Data!$A$2:$A$13");

        let r = SheetRange::new("Bob's", CellRange::parse("A1").unwrap());
        assert_eq!(r.to_string(), "'Bob''s'!A1");
        assert_eq!(SheetRange::parse(&r.to_string()).unwrap(), r);
    }
}
