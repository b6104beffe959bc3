use crate::upload::classify::ClassificationDecision;
use crate::upload::stage::StagingDecision;

/// Composes the staging and classification decisions into one ordered,
/// human-readable trace: a header per decision, one bullet per reason.
pub fn compose_trace(
    staging: &StagingDecision,
    classification: &ClassificationDecision,
) -> String {
    let mut lines = vec![format!(
        "Stage Evaluation: Assigned Stage {} because:",
        staging.stage
    )];
    for reason in &staging.reasons {
        lines.push(format!("- {reason}"));
    }

    lines.push(format!(
        "Classification: Assigned {} category because:",
        classification.category.as_str()
    ));
    for reason in &classification.reasons {
        lines.push(format!("- {reason}"));
    }

    lines.join("\n")
}
