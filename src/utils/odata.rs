//! Parsers for the `$filter` and `$orderby` query options.
//!
//! The filter grammar is marker-based rather than tokenized: for each known
//! field the parser looks for the literal text `<field> eq '` anywhere in the
//! input and reads the value up to the next single quote. Consequences that
//! callers rely on:
//!
//! - only the first occurrence of each marker is used;
//! - anything that is not a known marker (other fields, `and`, `or`) is ignored;
//! - a value containing another field's marker text can be mis-read.

use crate::domain::query::{CountryField, Predicate, SortDirection, SortKey};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ODataError {
    #[error("missing closing quote for '{field}' in $filter")]
    UnterminatedValue { field: &'static str },
}

/// Extracts equality predicates from a `$filter` string.
///
/// Predicates are returned in field order (`name`, `isoCode`, `entityId`),
/// independent of where the clauses appear in the input.
///
/// # Errors
///
/// Returns [`ODataError::UnterminatedValue`] when a marker has no closing quote.
pub fn parse_filter(filter: &str) -> Result<Vec<Predicate>, ODataError> {
    let mut predicates = Vec::new();

    for field in CountryField::ALL {
        let marker = format!("{} eq '", field.as_str());
        let Some(start) = filter.find(&marker) else {
            continue;
        };

        let rest = &filter[start + marker.len()..];
        let end = rest.find('\'').ok_or(ODataError::UnterminatedValue {
            field: field.as_str(),
        })?;

        predicates.push(Predicate::eq(field, &rest[..end]));
    }

    Ok(predicates)
}

/// Splits an `$orderby` string into sort keys, left to right.
///
/// Items are trimmed; a trailing ` desc` or ` asc` (any case) sets the
/// direction, otherwise the key is ascending. Empty items are skipped. Field
/// names are not validated here.
pub fn parse_order_by(order_by: &str) -> Vec<SortKey> {
    order_by
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            if let Some(field) = strip_suffix_ignore_case(item, " desc") {
                SortKey::new(field.trim_end(), SortDirection::Descending)
            } else if let Some(field) = strip_suffix_ignore_case(item, " asc") {
                SortKey::new(field.trim_end(), SortDirection::Ascending)
            } else {
                SortKey::ascending(item)
            }
        })
        .collect()
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    value[split..]
        .eq_ignore_ascii_case(suffix)
        .then(|| &value[..split])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_predicates() {
        assert!(parse_filter("").unwrap().is_empty());
    }

    #[test]
    fn test_single_clause() {
        assert_eq!(
            parse_filter("name eq 'France'").unwrap(),
            vec![Predicate::eq(CountryField::Name, "France")]
        );
    }

    #[test]
    fn test_clause_order_does_not_matter() {
        let expected = vec![
            Predicate::eq(CountryField::Name, "France"),
            Predicate::eq(CountryField::EntityId, "fr"),
        ];

        assert_eq!(
            parse_filter("entityId eq 'fr' and name eq 'France'").unwrap(),
            expected
        );
        assert_eq!(
            parse_filter("name eq 'France' and entityId eq 'fr'").unwrap(),
            expected
        );
    }

    #[test]
    fn test_all_three_fields() {
        let predicates =
            parse_filter("isoCode eq 'FR' and entityId eq 'fr' and name eq 'France'").unwrap();

        assert_eq!(
            predicates,
            vec![
                Predicate::eq(CountryField::Name, "France"),
                Predicate::eq(CountryField::IsoCode, "FR"),
                Predicate::eq(CountryField::EntityId, "fr"),
            ]
        );
    }

    #[test]
    fn test_only_first_occurrence_is_used() {
        assert_eq!(
            parse_filter("name eq 'France' and name eq 'Germany'").unwrap(),
            vec![Predicate::eq(CountryField::Name, "France")]
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        assert!(parse_filter("population eq '67'").unwrap().is_empty());
        assert_eq!(
            parse_filter("capital eq 'Paris' and isoCode eq 'FR'").unwrap(),
            vec![Predicate::eq(CountryField::IsoCode, "FR")]
        );
    }

    #[test]
    fn test_marker_is_matched_as_substring() {
        // `nickname eq '` contains the `name eq '` marker.
        assert_eq!(
            parse_filter("nickname eq 'Hexagon'").unwrap(),
            vec![Predicate::eq(CountryField::Name, "Hexagon")]
        );
    }

    #[test]
    fn test_other_operators_are_not_markers() {
        assert!(parse_filter("name ne 'France'").unwrap().is_empty());
        assert!(parse_filter("Name eq 'France'").unwrap().is_empty());
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(
            parse_filter("isoCode eq ''").unwrap(),
            vec![Predicate::eq(CountryField::IsoCode, "")]
        );
    }

    #[test]
    fn test_value_with_spaces_and_unicode() {
        assert_eq!(
            parse_filter("name eq 'Côte d’Ivoire'").unwrap(),
            vec![Predicate::eq(CountryField::Name, "Côte d’Ivoire")]
        );
    }

    #[test]
    fn test_missing_closing_quote_is_an_error() {
        assert_eq!(
            parse_filter("name eq 'France").unwrap_err(),
            ODataError::UnterminatedValue { field: "name" }
        );
        assert_eq!(
            parse_filter("name eq 'France' and entityId eq 'fr").unwrap_err(),
            ODataError::UnterminatedValue { field: "entityId" }
        );
    }

    #[test]
    fn test_order_by_single_desc() {
        assert_eq!(parse_order_by("name desc"), vec![SortKey::descending("name")]);
    }

    #[test]
    fn test_order_by_multiple_keys() {
        assert_eq!(
            parse_order_by("name,isoCode desc"),
            vec![SortKey::ascending("name"), SortKey::descending("isoCode")]
        );
    }

    #[test]
    fn test_order_by_suffix_is_case_insensitive() {
        assert_eq!(
            parse_order_by("name DESC, isoCode Asc"),
            vec![SortKey::descending("name"), SortKey::ascending("isoCode")]
        );
    }

    #[test]
    fn test_order_by_skips_empty_items() {
        assert_eq!(
            parse_order_by(" , name,, "),
            vec![SortKey::ascending("name")]
        );
        assert!(parse_order_by("").is_empty());
    }

    #[test]
    fn test_order_by_passes_unknown_fields_through() {
        assert_eq!(
            parse_order_by("population desc"),
            vec![SortKey::descending("population")]
        );
    }

    #[test]
    fn test_order_by_bare_direction_word_is_a_field() {
        assert_eq!(parse_order_by("desc"), vec![SortKey::ascending("desc")]);
    }

    #[test]
    fn test_strip_suffix_respects_char_boundaries() {
        assert_eq!(strip_suffix_ignore_case("é", " desc"), None);
        assert_eq!(strip_suffix_ignore_case("Égypte desc", " desc"), Some("Égypte"));
    }
}
