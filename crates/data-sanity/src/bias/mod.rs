//! Bias analysis over sensitive attributes.
//!
//! [`GroupStatsCalculator`] summarizes each sensitive attribute per group and
//! [`BiasFlagEngine`] turns those summaries into flags:
//! - **Imbalance**: group share outside the representation band
//! - **Disparity**: gap between the highest and lowest favorable-outcome rates
//! - **DIR Summary**: Disparate Impact Ratio against a privileged group

mod flags;
mod groups;

pub use flags::BiasFlagEngine;
pub use groups::{GroupStats, GroupStatsCalculator, OutcomeSpec};
