//! Data validation builder

use sheetcraft_core::{
    CellRange, Criteria, DataValidation, ListSource, ValidationErrorStyle, ValidationKind,
};

use crate::error::{Error, Result};

/// Longest inline list a spreadsheet application accepts, separators included
pub const MAX_LIST_LEN: usize = 255;

/// Longest prompt or alert title
pub const MAX_TITLE_LEN: usize = 32;

/// Longest prompt or alert message
pub const MAX_MESSAGE_LEN: usize = 255;

/// Builds a [`DataValidation`] rule
///
/// ```rust
/// use sheetcraft::DataValidationBuilder;
///
/// let rule = DataValidationBuilder::list(["North", "South"])
///     .range("B2:B100")
///     .prompt("Region", "Pick a sales region")
///     .build()
///     .unwrap();
/// assert_eq!(rule.sqref(), "B2:B100");
/// ```
#[derive(Debug, Clone)]
pub struct DataValidationBuilder {
    kind: ValidationKind,
    ranges: Vec<String>,
    allow_blank: bool,
    hide_dropdown: bool,
    prompt: Option<(String, String)>,
    error: Option<(String, String)>,
    error_style: ValidationErrorStyle,
}

impl DataValidationBuilder {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            kind,
            ranges: Vec::new(),
            allow_blank: true,
            hide_dropdown: false,
            prompt: None,
            error: None,
            error_style: ValidationErrorStyle::Stop,
        }
    }

    /// Dropdown of literal choices
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidationKind::List(ListSource::Items(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Dropdown whose choices live in cells, e.g. `Lists!$A$1:$A$5`
    pub fn list_from<S: Into<String>>(reference: S) -> Self {
        Self::new(ValidationKind::List(ListSource::Reference(reference.into())))
    }

    pub fn whole_number(criteria: Criteria) -> Self {
        Self::new(ValidationKind::WholeNumber(criteria))
    }

    pub fn decimal(criteria: Criteria) -> Self {
        Self::new(ValidationKind::Decimal(criteria))
    }

    pub fn date(criteria: Criteria) -> Self {
        Self::new(ValidationKind::Date(criteria))
    }

    pub fn text_length(criteria: Criteria) -> Self {
        Self::new(ValidationKind::TextLength(criteria))
    }

    /// Formula that must evaluate to TRUE
    pub fn custom<S: Into<String>>(formula: S) -> Self {
        Self::new(ValidationKind::Custom(formula.into()))
    }

    /// Cover one more range, given as `"B2:B100"` or a [`CellRange`]
    pub fn range<R: ToString>(mut self, range: R) -> Self {
        self.ranges.push(range.to_string());
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    pub fn hide_dropdown(mut self, hide: bool) -> Self {
        self.hide_dropdown = hide;
        self
    }

    /// Input message shown when a covered cell is selected
    pub fn prompt<T: Into<String>, M: Into<String>>(mut self, title: T, message: M) -> Self {
        self.prompt = Some((title.into(), message.into()));
        self
    }

    /// Alert shown when an invalid value is entered
    pub fn error_alert<T: Into<String>, M: Into<String>>(
        mut self,
        title: T,
        message: M,
        style: ValidationErrorStyle,
    ) -> Self {
        self.error = Some((title.into(), message.into()));
        self.error_style = style;
        self
    }

    pub fn build(self) -> Result<DataValidation> {
        check_kind(&self.kind)?;

        if self.ranges.is_empty() {
            return Err(Error::InvalidValidation(format!(
                "{} rule covers no cells",
                self.kind.xml_name()
            )));
        }

        for (title, message) in self.prompt.iter().chain(self.error.iter()) {
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(Error::InvalidValidation(format!(
                    "title '{}' is longer than {} characters",
                    title, MAX_TITLE_LEN
                )));
            }
            if message.chars().count() > MAX_MESSAGE_LEN {
                return Err(Error::InvalidValidation(format!(
                    "message is longer than {} characters",
                    MAX_MESSAGE_LEN
                )));
            }
        }

        let mut rule = DataValidation::new(self.kind);
        for range in &self.ranges {
            let range = CellRange::parse_ordered(range)
                .map_err(|e| Error::InvalidRange(format!("'{}': {}", range, e)))?;
            rule = rule.covering(range);
        }
        rule.allow_blank = self.allow_blank;
        rule.hide_dropdown = self.hide_dropdown;
        if let Some((title, message)) = self.prompt {
            rule.prompt_title = Some(title);
            rule.prompt = Some(message);
        }
        if let Some((title, message)) = self.error {
            rule.error_title = Some(title);
            rule.error = Some(message);
        }
        rule.error_style = self.error_style;
        Ok(rule)
    }
}

fn check_kind(kind: &ValidationKind) -> Result<()> {
    match kind {
        ValidationKind::List(ListSource::Items(items)) => {
            if items.is_empty() {
                return Err(Error::InvalidValidation("list has no items".into()));
            }
            if let Some(item) = items.iter().find(|i| i.contains(',')) {
                return Err(Error::InvalidValidation(format!(
                    "list item '{}' contains a comma",
                    item
                )));
            }
            let len = items.iter().map(|i| i.chars().count()).sum::<usize>() + items.len() - 1;
            if len > MAX_LIST_LEN {
                return Err(Error::InvalidValidation(format!(
                    "list is {} characters long, the limit is {}",
                    len, MAX_LIST_LEN
                )));
            }
        }
        ValidationKind::List(ListSource::Reference(reference)) => {
            if reference.trim().is_empty() {
                return Err(Error::InvalidValidation("list reference is empty".into()));
            }
        }
        ValidationKind::Custom(formula) => {
            if formula.trim().is_empty() {
                return Err(Error::InvalidValidation("custom formula is empty".into()));
            }
        }
        ValidationKind::WholeNumber(criteria)
        | ValidationKind::Decimal(criteria)
        | ValidationKind::Date(criteria)
        | ValidationKind::TextLength(criteria) => check_criteria(criteria)?,
    }
    Ok(())
}

fn check_criteria(criteria: &Criteria) -> Result<()> {
    match (&criteria.formula2, criteria.operator.takes_two_values()) {
        (None, true) => Err(Error::InvalidValidation(format!(
            "'{}' needs a second value",
            criteria.operator.xml_name()
        ))),
        (Some(max), true) => {
            let bounds = (
                criteria.formula1.trim().parse::<f64>(),
                max.trim().parse::<f64>(),
            );
            match bounds {
                (Ok(min), Ok(max)) if min > max => Err(Error::InvalidValidation(format!(
                    "minimum {} is greater than maximum {}",
                    min, max
                ))),
                _ => Ok(()),
            }
        }
        (_, false) => Ok(()),
    }
}
