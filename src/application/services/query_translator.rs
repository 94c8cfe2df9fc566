//! Translation of raw query options into a [`CountryQuery`].

use serde_json::json;

use crate::domain::query::{CountryQuery, QueryOptions};
use crate::error::AppError;
use crate::utils::odata::{parse_filter, parse_order_by};

/// Turns caller-supplied query options into a storage-neutral query.
///
/// Handlers and services depend on this trait only, so the parsing strategy
/// can change without touching them.
pub trait QueryTranslator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed options.
    fn translate(&self, options: &QueryOptions) -> Result<CountryQuery, AppError>;
}

/// Marker-based translator for `$filter`, `$orderby`, `$skip` and `$top`.
///
/// # Policy
///
/// - empty or absent `$filter` matches every record; unknown fields are ignored
/// - absent `$skip` is 0, a negative `$skip` is rejected
/// - absent `$top` is unbounded, `$top <= 0` yields no records
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerQueryTranslator;

impl QueryTranslator for MarkerQueryTranslator {
    fn translate(&self, options: &QueryOptions) -> Result<CountryQuery, AppError> {
        let predicates = match options.filter.as_deref() {
            Some(filter) => parse_filter(filter).map_err(|e| {
                AppError::bad_request("Invalid $filter", json!({ "reason": e.to_string() }))
            })?,
            None => Vec::new(),
        };

        let sort = options
            .order_by
            .as_deref()
            .map(parse_order_by)
            .unwrap_or_default();

        let skip = match options.skip {
            None => 0,
            Some(skip) => u64::try_from(skip).map_err(|_| {
                AppError::bad_request(
                    "Invalid $skip",
                    json!({ "reason": "$skip must be non-negative", "value": skip }),
                )
            })?,
        };

        let top = options.top.map(|top| u64::try_from(top).unwrap_or(0));

        Ok(CountryQuery {
            predicates,
            sort,
            skip,
            top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{CountryField, Predicate, SortKey};

    fn options(
        filter: Option<&str>,
        order_by: Option<&str>,
        skip: Option<i64>,
        top: Option<i64>,
    ) -> QueryOptions {
        QueryOptions {
            filter: filter.map(str::to_string),
            order_by: order_by.map(str::to_string),
            skip,
            top,
        }
    }

    #[test]
    fn test_no_options_is_unbounded_scan() {
        let query = MarkerQueryTranslator
            .translate(&QueryOptions::default())
            .unwrap();

        assert_eq!(query, CountryQuery::default());
    }

    #[test]
    fn test_full_translation() {
        let query = MarkerQueryTranslator
            .translate(&options(
                Some("entityId eq 'fr' and name eq 'France'"),
                Some("name,isoCode desc"),
                Some(2),
                Some(5),
            ))
            .unwrap();

        assert_eq!(
            query,
            CountryQuery {
                predicates: vec![
                    Predicate::eq(CountryField::Name, "France"),
                    Predicate::eq(CountryField::EntityId, "fr"),
                ],
                sort: vec![SortKey::ascending("name"), SortKey::descending("isoCode")],
                skip: 2,
                top: Some(5),
            }
        );
    }

    #[test]
    fn test_unterminated_filter_is_bad_request() {
        let result = MarkerQueryTranslator.translate(&options(Some("name eq 'Fr"), None, None, None));

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_negative_skip_is_bad_request() {
        let result = MarkerQueryTranslator.translate(&options(None, None, Some(-1), None));

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_non_positive_top_is_clamped_to_zero() {
        for top in [0, -1, i64::MIN] {
            let query = MarkerQueryTranslator
                .translate(&options(None, None, None, Some(top)))
                .unwrap();
            assert_eq!(query.top, Some(0), "top={top}");
        }
    }

    #[test]
    fn test_unknown_filter_field_matches_everything() {
        let query = MarkerQueryTranslator
            .translate(&options(Some("population eq '1'"), None, None, None))
            .unwrap();

        assert!(query.predicates.is_empty());
    }
}
