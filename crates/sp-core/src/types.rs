//! Core type definitions with validation.

use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// An hour amount was negative or not finite.
    #[error("hours must be a finite non-negative number, got {value}")]
    InvalidHours { value: f64 },

    /// A complexity score was outside 1-5.
    #[error("complexity must be between 1 and 5, got {value}")]
    ComplexityOutOfRange { value: i64 },

    /// A weekday index was outside 0-6.
    #[error("weekday must be between 0 (Sunday) and 6 (Saturday), got {value}")]
    WeekdayOutOfRange { value: i64 },

    /// A weekday name could not be recognized.
    #[error("unknown weekday: {value}")]
    UnknownWeekday { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated topic identifier.
    ///
    /// Topic IDs must be non-empty. The planner never interprets them; storage
    /// assigns UUIDs before scheduling.
    TopicId, "topic ID"
);

/// Amounts at or below this many hours are treated as zero.
///
/// Guards the allocator against phantom steps caused by floating drift.
pub const HOURS_EPSILON: f64 = 1e-9;

/// A non-negative, finite number of hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Hours(f64);

impl Hours {
    pub const ZERO: Self = Self(0.0);

    /// Creates an hour amount, rejecting negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && value >= 0.0 {
            // Normalize -0.0 so equality and display stay predictable.
            Ok(Self(value + 0.0))
        } else {
            Err(ValidationError::InvalidHours { value })
        }
    }

    /// Creates an hour amount, clamping negative and non-finite values to zero.
    pub fn saturating(value: f64) -> Self {
        Self::new(value).unwrap_or(Self::ZERO)
    }

    pub const fn get(self) -> f64 {
        self.0
    }

    /// Whether the amount is large enough to schedule.
    pub fn is_positive(self) -> bool {
        self.0 > HOURS_EPSILON
    }

    /// Subtracts, stopping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(0.0))
    }

    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 { other } else { self }
    }
}

impl TryFrom<f64> for Hours {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Hours> for f64 {
    fn from(hours: Hours) -> Self {
        hours.0
    }
}

impl Add for Hours {
    type Output = Self;

    /// Adds, saturating at `f64::MAX` so the result stays finite.
    fn add(self, rhs: Self) -> Self {
        Self((self.0 + rhs.0).min(f64::MAX))
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Hours {
    type Output = Self;

    /// Scales the amount. Negative or non-finite factors yield zero.
    fn mul(self, factor: f64) -> Self {
        Self::saturating(self.0 * factor)
    }
}

impl std::iter::Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = (self.0 * 100.0).round() / 100.0;
        write!(f, "{rounded}h")
    }
}

/// Topic difficulty on a 1 (easiest) to 5 (hardest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Complexity(u8);

impl Complexity {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(5);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=5).contains(v))
            .map(Self)
            .ok_or(ValidationError::ComplexityOutOfRange { value })
    }

    /// Builds a complexity, pulling out-of-range values to the nearest bound.
    pub fn clamped(value: i64) -> Self {
        Self::new(value.clamp(1, 5)).unwrap_or(Self::MIN)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Complexity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Complexity> for u8 {
    fn from(c: Complexity) -> Self {
        c.0
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Day of the week, indexed from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Looks up a weekday by its Sunday-based index.
    pub fn from_index(index: i64) -> Result<Self, ValidationError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(ValidationError::WeekdayOutOfRange { value: index })
    }

    /// Sunday-based index (0-6).
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Sunday => "Sun",
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for Weekday {
    type Err = ValidationError;

    /// Accepts an index ("0".."6") or an English name ("mon", "Monday").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Self::from_index(index);
        }
        let lower = trimmed.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| {
                let short = day.short_name().to_ascii_lowercase();
                lower == short || lower == format!("{day:?}").to_ascii_lowercase()
            })
            .ok_or_else(|| ValidationError::UnknownWeekday {
                value: trimmed.to_string(),
            })
    }
}

/// A set of weekdays on which studying is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StudyDays(u8);

impl StudyDays {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Monday through Friday.
    pub const fn weekdays() -> Self {
        Self(0b0011_1110)
    }

    pub const fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the set in Sunday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for StudyDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut days = Self::empty();
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl fmt::Display for StudyDays {
    /// Renders as the comma-separated index list used for storage ("1,3,5").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .iter()
            .map(|day| day.index().to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{rendered}")
    }
}
