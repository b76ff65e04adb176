use chrono::{Months, NaiveDate};

use crate::models::{DiscoverParams, Gender, Profile, SortMode};

/// Age floor and ceiling used when translating age filters
///
/// A minimum age is only applied above `floor`; a maximum age only strictly
/// between `floor` and `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBounds {
    pub floor: u32,
    pub ceiling: u32,
}

impl Default for AgeBounds {
    fn default() -> Self {
        Self {
            floor: 18,
            ceiling: 65,
        }
    }
}

/// A single typed predicate over candidate profiles
///
/// Clauses are combined conjunctively. Storage backends translate them into
/// bound query parameters; they are never formatted into query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterClause {
    /// Strictly earlier birth date
    BornBefore(NaiveDate),
    /// Strictly later birth date
    BornAfter(NaiveDate),
    GenderIs(Gender),
}

impl FilterClause {
    #[inline]
    pub fn matches(&self, profile: &Profile) -> bool {
        match *self {
            FilterClause::BornBefore(cutoff) => profile.date_of_birth < cutoff,
            FilterClause::BornAfter(cutoff) => profile.date_of_birth > cutoff,
            FilterClause::GenderIs(gender) => profile.gender == gender,
        }
    }
}

/// Compiled discovery filters: optional clauses plus the storage-side order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryFilters {
    clauses: Vec<FilterClause>,
    sort: SortMode,
}

impl DiscoveryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate request parameters into clauses as of `today`
    pub fn from_params(params: &DiscoverParams, bounds: &AgeBounds, today: NaiveDate) -> Self {
        let mut filters = Self::new().sorted(params.sort);

        if let Some(min) = params.age_min {
            if min > bounds.floor {
                let cutoff = years_before(today, min)
                    .map_or(earliest_cutoff(), |d| d.max(earliest_cutoff()));
                filters = filters.with(FilterClause::BornBefore(cutoff));
            }
        }

        if let Some(max) = params.age_max {
            if max > bounds.floor && max < bounds.ceiling {
                if let Some(cutoff) = years_before(today, max) {
                    filters = filters.with(FilterClause::BornAfter(cutoff));
                }
            }
        }

        if params.gender.is_specified() {
            filters = filters.with(FilterClause::GenderIs(params.gender));
        }

        filters
    }

    pub fn with(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn sorted(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Whether the profile satisfies every clause
    #[inline]
    pub fn matches(&self, profile: &Profile) -> bool {
        self.clauses.iter().all(|clause| clause.matches(profile))
    }
}

/// Lowest date a cutoff is clamped to; no stored birth date precedes it
///
/// Ages that reach past it still produce a clause, one that matches nobody.
fn earliest_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// The date `years` whole years before `today`
///
/// Feb 29 maps to Feb 28 in non-leap target years.
pub fn years_before(today: NaiveDate, years: u32) -> Option<NaiveDate> {
    today.checked_sub_months(Months::new(years.checked_mul(12)?))
}
