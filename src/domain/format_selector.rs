//! Format choice control

use crate::domain::{DomainError, SchemaFormat};

/// Ordered list of formats with one selected entry.
///
/// The selection is persisted by index, so the option order is part of the
/// persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector {
    options: Vec<SchemaFormat>,
    selected: usize,
}

impl FormatSelector {
    /// Falls back to a single `SWAGGER` option when `options` is empty.
    pub fn new(options: Vec<SchemaFormat>) -> Self {
        let options = if options.is_empty() {
            vec![SchemaFormat::Swagger]
        } else {
            options
        };
        Self {
            options,
            selected: 0,
        }
    }

    pub fn options(&self) -> &[SchemaFormat] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &SchemaFormat {
        &self.options[self.selected]
    }

    pub fn select_index(&mut self, idx: usize) -> Result<(), DomainError> {
        if idx >= self.options.len() {
            return Err(DomainError::FormatIndexOutOfRange {
                index: idx,
                len: self.options.len(),
            });
        }
        self.selected = idx;
        Ok(())
    }

    /// Apply a persisted index string; anything unusable selects the first option.
    pub fn apply_persisted(&mut self, stored: Option<&str>) {
        self.selected = stored
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&idx| idx < self.options.len())
            .unwrap_or(0);
    }

    /// Index of `format`, matching wire names case-insensitively.
    pub fn position(&self, format: &SchemaFormat) -> Option<usize> {
        self.options
            .iter()
            .position(|f| f.wire_name().eq_ignore_ascii_case(format.wire_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn selector() -> FormatSelector {
        FormatSelector::new(vec![SchemaFormat::Swagger, SchemaFormat::Html])
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some("1"), 1)]
    #[case(Some(" 1 "), 1)]
    #[case(Some("7"), 0)]
    #[case(Some("-1"), 0)]
    #[case(Some("html"), 0)]
    fn given_persisted_index_when_applied_then_selects_expected(
        #[case] stored: Option<&str>,
        #[case] expected: usize,
    ) {
        let mut s = selector();
        s.apply_persisted(stored);
        assert_eq!(s.selected_index(), expected);
    }

    #[test]
    fn given_out_of_range_index_when_selecting_then_errors() {
        let mut s = selector();
        assert!(s.select_index(2).is_err());
        s.select_index(1).unwrap();
        assert_eq!(s.selected(), &SchemaFormat::Html);
    }

    #[test]
    fn given_no_options_when_created_then_defaults_to_swagger() {
        let s = FormatSelector::new(vec![]);
        assert_eq!(s.options(), &[SchemaFormat::Swagger]);
    }

    #[test]
    fn given_other_format_in_different_case_when_locating_then_found() {
        let selector = FormatSelector::new(vec![
            SchemaFormat::Swagger,
            SchemaFormat::Other("JSON".into()),
        ]);
        assert_eq!(selector.position(&"json".parse().unwrap()), Some(1));
        assert_eq!(selector.position(&SchemaFormat::Html), None);
    }
}
