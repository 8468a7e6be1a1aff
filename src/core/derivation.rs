//! Duration and validity of date ranges, optionally bounded by a parent range.
//!
//! Everything here is pure: the same inputs always give the same duration and
//! the same ordered list of errors. Callers decide what to do with the errors
//! (forms block submission while the list is non-empty).
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A closed calendar range. Both endpoints count towards the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive day count, `None` when the range is inverted.
    pub fn duration_days(&self) -> Option<i64> {
        compute_duration(Some(self.start), Some(self.end))
    }

    pub fn contains(&self, other: &DateRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// A range that must stay inside an optional enclosing range, e.g. a stage
/// inside its mandate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedDateRange {
    pub range: DateRange,
    pub parent: Option<DateRange>,
}

impl BoundedDateRange {
    pub fn new(range: DateRange, parent: Option<DateRange>) -> Self {
        Self { range, parent }
    }

    pub fn validate(&self, today: NaiveDate, rules: RangeRules) -> Vec<RangeError> {
        validate_range(
            Some(self.range.start),
            Some(self.range.end),
            today,
            self.parent.as_ref(),
            rules,
        )
    }
}

/// Validation outcome for a date pair. Ordering of the variants matches the
/// order in which [`validate_range`] reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RangeError {
    StartAfterEnd,
    StartInPast,
    StartBeforeParent,
    EndAfterParent,
}

impl Display for RangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RangeError::StartAfterEnd => "start date must not be after end date",
                RangeError::StartInPast => "start date cannot be in the past",
                RangeError::StartBeforeParent => "start date precedes parent range",
                RangeError::EndAfterParent => "end date exceeds parent range",
            }
        )
    }
}

/// Which optional rules apply to a validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeRules {
    /// Reject a start date earlier than `today`. Only create flows turn this on.
    pub reject_past_start: bool,
}

impl RangeRules {
    pub fn create() -> Self {
        Self {
            reject_past_start: true,
        }
    }

    pub fn edit() -> Self {
        Self::default()
    }
}

/// Duration together with the errors that explain a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeDerivation {
    pub duration: Option<i64>,
    pub errors: Vec<RangeError>,
}

impl RangeDerivation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drops the time of day, keeping the calendar date in the value's own zone.
pub fn start_of_day<Tz: TimeZone>(value: &DateTime<Tz>) -> NaiveDate {
    value.date_naive()
}

/// Inclusive number of days between `start` and `end`.
///
/// Returns `None` when either date is missing or when `start` is after `end`.
pub fn compute_duration(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Some((end - start).num_days() + 1),
        _ => None,
    }
}

/// Collects every rule violation for the given dates, in a fixed order:
/// inverted range, past start, start before parent, end after parent.
pub fn validate_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    parent: Option<&DateRange>,
    rules: RangeRules,
) -> Vec<RangeError> {
    let mut errors = Vec::new();

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            errors.push(RangeError::StartAfterEnd);
        }
    }

    if rules.reject_past_start {
        if let Some(start) = start {
            if start < today {
                errors.push(RangeError::StartInPast);
            }
        }
    }

    if let Some(parent) = parent {
        if start.is_some_and(|start| start < parent.start) {
            errors.push(RangeError::StartBeforeParent);
        }
        if end.is_some_and(|end| end > parent.end) {
            errors.push(RangeError::EndAfterParent);
        }
    }

    errors
}

/// Renders an error list on one line, `; ` separated.
pub fn join_errors<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Duration and validation in one call, the pair a form recomputes on change.
pub fn derive_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    parent: Option<&DateRange>,
    rules: RangeRules,
) -> RangeDerivation {
    RangeDerivation {
        duration: compute_duration(start, end),
        errors: validate_range(start, end, today, parent, rules),
    }
}
