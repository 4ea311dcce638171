//! Study topics and the loosely-typed input they are built from.

use serde::{Deserialize, Serialize};

use crate::types::{Complexity, Hours, TopicId};

/// A unit of study material, as fed to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,

    /// Display name. Not used for scheduling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub estimated_hours: Hours,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
}

impl Topic {
    pub fn new(id: TopicId, estimated_hours: Hours) -> Self {
        Self {
            id,
            name: None,
            estimated_hours,
            complexity: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }
}

/// A number that may arrive as JSON number or as text ("2.5", "4 hours").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Coerces to a float.
    ///
    /// Text is parsed as-is first; failing that, everything except digits and
    /// `.` is stripped and the remainder parsed. Unparseable input yields 0.
    pub fn coerce(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => {
                let trimmed = text.trim();
                if let Ok(value) = trimmed.parse::<f64>() {
                    return value;
                }
                let cleaned: String = trimmed
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                cleaned.parse().unwrap_or(0.0)
            }
        }
    }

    /// Coerces to hours, mapping negative and non-finite values to zero.
    pub fn coerce_hours(&self) -> Hours {
        Hours::saturating(self.coerce())
    }

    /// Returns the value if it denotes an exact integer.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_integer(&self) -> Option<i64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A topic as received from an extraction step or a file, before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTopic {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub estimated_hours: NumericInput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<NumericInput>,
}

impl RawTopic {
    pub fn new(id: impl Into<String>, estimated_hours: impl Into<NumericInput>) -> Self {
        Self {
            id: id.into(),
            name: None,
            estimated_hours: estimated_hours.into(),
            complexity: None,
        }
    }

    /// Complexity rounded and clamped to 1-5; absent or zero means unknown.
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce_complexity(&self) -> Option<Complexity> {
        let value = self.complexity.as_ref()?.coerce();
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        Some(Complexity::clamped(value.round() as i64))
    }
}
