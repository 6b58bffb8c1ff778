//! Data validation rules

use crate::cell::CellRange;
use std::fmt;

/// Comparison applied by numeric, date and text-length rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationOperator {
    #[default]
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ValidationOperator {
    pub fn xml_name(&self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Whether the operator compares against two bounds
    pub fn takes_two_values(&self) -> bool {
        matches!(
            self,
            ValidationOperator::Between | ValidationOperator::NotBetween
        )
    }
}

/// Bounds for a comparison rule, as formula text (`10`, `B1`, `DATE(2024,1,1)`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criteria {
    pub operator: ValidationOperator,
    pub formula1: String,
    pub formula2: Option<String>,
}

impl Criteria {
    pub fn between<A: ToString, B: ToString>(min: A, max: B) -> Self {
        Self {
            operator: ValidationOperator::Between,
            formula1: min.to_string(),
            formula2: Some(max.to_string()),
        }
    }

    pub fn compare<A: ToString>(operator: ValidationOperator, value: A) -> Self {
        Self {
            operator,
            formula1: value.to_string(),
            formula2: None,
        }
    }
}

/// Where the choices of a list rule come from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListSource {
    /// Literal choices
    Items(Vec<String>),
    /// Reference to cells holding the choices, e.g. `Lists!$A$1:$A$5`
    Reference(String),
}

/// What a validation rule checks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationKind {
    List(ListSource),
    WholeNumber(Criteria),
    Decimal(Criteria),
    Date(Criteria),
    TextLength(Criteria),
    /// Formula that must evaluate to TRUE
    Custom(String),
}

impl ValidationKind {
    /// Value of the `type` attribute
    pub fn xml_name(&self) -> &'static str {
        match self {
            ValidationKind::List(_) => "list",
            ValidationKind::WholeNumber(_) => "whole",
            ValidationKind::Decimal(_) => "decimal",
            ValidationKind::Date(_) => "date",
            ValidationKind::TextLength(_) => "textLength",
            ValidationKind::Custom(_) => "custom",
        }
    }

    pub fn criteria(&self) -> Option<&Criteria> {
        match self {
            ValidationKind::WholeNumber(c)
            | ValidationKind::Decimal(c)
            | ValidationKind::Date(c)
            | ValidationKind::TextLength(c) => Some(c),
            ValidationKind::List(_) | ValidationKind::Custom(_) => None,
        }
    }

    /// First formula as stored in the file; inline lists become one quoted string
    pub fn formula1(&self) -> String {
        match self {
            ValidationKind::List(ListSource::Items(items)) => {
                format!("\"{}\"", items.join(",").replace('"', "\"\""))
            }
            ValidationKind::List(ListSource::Reference(r)) => r.clone(),
            ValidationKind::Custom(f) => f.clone(),
            ValidationKind::WholeNumber(c)
            | ValidationKind::Decimal(c)
            | ValidationKind::Date(c)
            | ValidationKind::TextLength(c) => c.formula1.clone(),
        }
    }

    pub fn formula2(&self) -> Option<&str> {
        self.criteria().and_then(|c| c.formula2.as_deref())
    }
}

/// How the application reacts to an invalid entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationErrorStyle {
    /// Reject the value
    #[default]
    Stop,
    Warning,
    Information,
}

impl ValidationErrorStyle {
    pub fn xml_name(&self) -> &'static str {
        match self {
            ValidationErrorStyle::Stop => "stop",
            ValidationErrorStyle::Warning => "warning",
            ValidationErrorStyle::Information => "information",
        }
    }
}

/// A validation rule and the cells it covers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataValidation {
    pub kind: ValidationKind,
    pub ranges: Vec<CellRange>,
    pub allow_blank: bool,
    /// Hide the in-cell dropdown of a list rule
    pub hide_dropdown: bool,
    pub prompt_title: Option<String>,
    pub prompt: Option<String>,
    pub error_title: Option<String>,
    pub error: Option<String>,
    pub error_style: ValidationErrorStyle,
}

impl DataValidation {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            kind,
            ranges: Vec::new(),
            allow_blank: true,
            hide_dropdown: false,
            prompt_title: None,
            prompt: None,
            error_title: None,
            error: None,
            error_style: ValidationErrorStyle::Stop,
        }
    }

    /// Copy of the rule covering one more range
    pub fn covering(mut self, range: CellRange) -> Self {
        if !self.ranges.contains(&range) {
            self.ranges.push(range);
        }
        self
    }

    /// Space separated range list as written in `sqref`
    pub fn sqref(&self) -> String {
        self.ranges
            .iter()
            .map(CellRange::to_a1_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DataValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation on {}", self.kind.xml_name(), self.sqref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formulas() {
        let list = ValidationKind::List(ListSource::Items(vec!["North".into(), "South".into()]));
        assert_eq!(list.formula1(), "\"North,South\"");
        assert_eq!(list.formula2(), None);

        let whole = ValidationKind::WholeNumber(Criteria::between(1, 10));
        assert_eq!(whole.formula1(), "1");
        assert_eq!(whole.formula2(), Some("10"));
        assert!(whole.criteria().unwrap().operator.takes_two_values());
    }

    #[test]
    fn test_sqref() {
        let rule = DataValidation::new(ValidationKind::Custom("A1>0".into()))
            .covering(CellRange::parse("A1:A10").unwrap())
            .covering(CellRange::parse("C3").unwrap())
            .covering(CellRange::parse("A1:A10").unwrap());
        assert_eq!(rule.sqref(), "A1:A10 C3");
        assert_eq!(rule.to_string(), "custom validation on A1:A10 C3");
    }
}
