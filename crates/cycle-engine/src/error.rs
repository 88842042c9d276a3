//! Error types for cycle-engine operations.

use serde::Serialize;
use thiserror::Error;

/// Failures produced while validating rules or computing cycle dates.
///
/// Only [`CycleError::InvalidRule`] is ever returned as an `Err` from the
/// calculators. The other two variants are recovered locally and surface as
/// the `degraded` marker on a [`Computed`](crate::calendar::Computed) value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum CycleError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid lunar date: {0}")]
    InvalidLunarDate(String),

    #[error("Degraded computation: {0}")]
    DegradedComputation(String),
}

pub type Result<T> = std::result::Result<T, CycleError>;
