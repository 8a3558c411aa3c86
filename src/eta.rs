use serde::Serialize;

use crate::error::PredictError;
use crate::features::{assemble, RawInputs};
use crate::model::Predictor;
use crate::part_of_day::PartOfDay;

/// Outcome of one assemble-then-predict call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub part_of_day: PartOfDay,
    /// Raw model output; the rounded form is for display only.
    pub eta_minutes: f64,
}

impl Estimate {
    pub fn display_minutes(&self) -> f64 {
        round_eta(self.eta_minutes)
    }

    pub fn message(&self) -> String {
        format_eta(self.eta_minutes)
    }
}

pub fn estimate<P: Predictor + ?Sized>(
    predictor: &P,
    raw: RawInputs,
) -> Result<Estimate, PredictError> {
    let features = assemble(raw);
    tracing::debug!(record = ?features, "assembled trip features");
    let eta_minutes = predictor.predict(&features)?;
    Ok(Estimate {
        part_of_day: features.part_of_day(),
        eta_minutes,
    })
}

/// One decimal place, rounded from the exact binary value with ties to even.
fn one_decimal(eta: f64) -> String {
    format!("{eta:.1}")
}

pub fn round_eta(eta: f64) -> f64 {
    one_decimal(eta).parse().unwrap_or(eta)
}

pub fn format_eta(eta: f64) -> String {
    format!(
        "The Estimated Time of Arrival is:\n {} minutes",
        one_decimal(eta)
    )
}
