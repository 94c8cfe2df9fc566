//! Storage-neutral query model for the country collection.
//!
//! A [`CountryQuery`] is a conjunction of equality [`Predicate`]s, a multi-key
//! sort, and skip/top pagination applied last. Repositories either translate it
//! to their native query language or evaluate it in memory with
//! [`CountryQuery::apply`]; both must produce the same sequence.

use std::cmp::Ordering;

use crate::domain::entities::Country;

/// Fields of a country that can be filtered and sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryField {
    Name,
    IsoCode,
    EntityId,
}

impl CountryField {
    /// Filter scanning order.
    pub const ALL: [CountryField; 3] = [
        CountryField::Name,
        CountryField::IsoCode,
        CountryField::EntityId,
    ];

    /// External (wire) name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            CountryField::Name => "name",
            CountryField::IsoCode => "isoCode",
            CountryField::EntityId => "entityId",
        }
    }

    /// Resolves a wire name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    pub fn value_of(self, country: &Country) -> &str {
        match self {
            CountryField::Name => &country.name,
            CountryField::IsoCode => &country.iso_code,
            CountryField::EntityId => &country.entity_id,
        }
    }
}

/// `field == value`, case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: CountryField,
    pub value: String,
}

impl Predicate {
    pub fn eq(field: CountryField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn matches(&self, country: &Country) -> bool {
        self.field.value_of(country) == self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One sort key. The field name is kept verbatim; only names that resolve to a
/// [`CountryField`] influence ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// The resolved field, or `None` when the name is not a known field.
    pub fn known_field(&self) -> Option<CountryField> {
        CountryField::parse(&self.field)
    }
}

/// Raw, untranslated query options as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub skip: Option<i64>,
    pub top: Option<i64>,
}

/// A bounded, deterministic query against the country collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    /// `None` means unbounded.
    pub top: Option<u64>,
}

impl CountryQuery {
    /// Every record, ascending by name.
    pub fn sorted_by_name() -> Self {
        Self {
            sort: vec![SortKey::ascending(CountryField::Name.as_str())],
            ..Self::default()
        }
    }

    pub fn matches(&self, country: &Country) -> bool {
        self.predicates.iter().all(|p| p.matches(country))
    }

    /// Compares two records by the sort keys, first key highest precedence.
    ///
    /// Unknown fields compare equal.
    pub fn compare(&self, a: &Country, b: &Country) -> Ordering {
        for key in &self.sort {
            let Some(field) = key.known_field() else {
                continue;
            };
            let ordering = field.value_of(a).cmp(field.value_of(b));
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Filters, sorts, and paginates `countries`.
    ///
    /// Input order is the tie-breaker (the sort is stable), so callers pass
    /// records in storage order.
    pub fn apply(&self, countries: impl IntoIterator<Item = Country>) -> Vec<Country> {
        let mut matched: Vec<Country> = countries.into_iter().filter(|c| self.matches(c)).collect();
        matched.sort_by(|a, b| self.compare(a, b));

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let top = self
            .top
            .map(|top| usize::try_from(top).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        matched.into_iter().skip(skip).take(top).collect()
    }
}
