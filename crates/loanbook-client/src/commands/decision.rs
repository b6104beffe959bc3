use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::DecisionData;
use crate::upload::classify::classify_instrument;
use crate::upload::explain::compose_trace;
use crate::upload::stage::{DpdInput, evaluate_staging};
use crate::ClientResult;

#[derive(Debug, Default)]
pub struct DecisionOptions {
    pub default_flag: bool,
    pub days_past_due: Option<String>,
    pub sicr_flag: bool,
    pub sppi_passed: bool,
    pub business_model: Option<String>,
}

/// Evaluates the staging and classification engines over explicit inputs and
/// returns the composed explainability trace. Pure; the ledger is never
/// touched.
pub fn run_with_options(options: DecisionOptions) -> ClientResult<SuccessEnvelope> {
    let staging = evaluate_staging(
        options.default_flag,
        DpdInput::from_raw(options.days_past_due.as_deref()),
        options.sicr_flag,
    );
    let classification = classify_instrument(
        options.sppi_passed,
        options.business_model.as_deref().unwrap_or(""),
    );
    let trace = compose_trace(&staging, &classification);

    success(
        "decision",
        DecisionData {
            stage: staging.stage,
            staging_reasons: staging.reasons,
            category: classification.category.as_str().to_string(),
            classification_reasons: classification.reasons,
            trace,
        },
    )
}
