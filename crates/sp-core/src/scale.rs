//! Load balancing: fitting total demand into available study time.

use serde::Serialize;

use crate::error::PlanError;
use crate::topic::Topic;
use crate::types::Hours;

/// Demand versus supply for one plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadBalance {
    pub total_demand_hours: Hours,
    pub total_available_hours: Hours,

    /// Uniform compression applied to every topic, in `(0, 1]`.
    pub scale_factor: f64,
}

impl LoadBalance {
    /// Compares topic demand against `session_count` days of `daily_budget` each.
    ///
    /// Totals are summed as plain floats; a total that overflows, or a factor
    /// that underflows to zero, is rejected rather than producing an empty plan.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(
        topics: &[Topic],
        session_count: usize,
        daily_budget: Hours,
    ) -> Result<Self, PlanError> {
        let demand: f64 = topics.iter().map(|t| t.estimated_hours.get()).sum();
        let supply = session_count as f64 * daily_budget.get();

        let total_demand_hours = Hours::new(demand).map_err(|_| {
            PlanError::invalid(format!("total estimated hours is too large ({demand})"))
        })?;
        let total_available_hours = Hours::new(supply).map_err(|_| {
            PlanError::invalid(format!("total available study hours is too large ({supply})"))
        })?;

        let scale_factor = if total_demand_hours.is_positive() {
            (supply / demand).min(1.0)
        } else {
            1.0
        };
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(PlanError::invalid(format!(
                "cannot fit {demand}h of topics into {supply}h of study time"
            )));
        }

        Ok(Self {
            total_demand_hours,
            total_available_hours,
            scale_factor,
        })
    }

    /// Whether topics had to be shrunk to fit.
    pub fn is_compressed(&self) -> bool {
        self.scale_factor < 1.0
    }

    /// Working hours for each topic, in input order.
    pub fn scaled_hours(&self, topics: &[Topic]) -> Vec<Hours> {
        topics
            .iter()
            .map(|t| t.estimated_hours * self.scale_factor)
            .collect()
    }
}
