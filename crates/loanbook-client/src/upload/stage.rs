/// IFRS 9 stage derivation from default flag, days past due, and SICR flag.
///
/// The rules are evaluated in order and the first match wins:
/// stage 3 on default, stage 2 on DPD > 30, stage 2 on SICR, stage 1
/// otherwise. Every decision carries the reasons that fired, in evaluation
/// order, so the trace reads back the same way the rules ran.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDecision {
    pub stage: u8,
    pub reasons: Vec<String>,
}

/// The days-past-due input as it arrived. A missing or unparseable value is
/// substituted with 0 and noted in the reasons; it is never a validation
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DpdInput {
    Missing,
    Unparseable(String),
    Days(i64),
}

impl DpdInput {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(text) = raw else {
            return Self::Missing;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<i64>() {
            Ok(days) => Self::Days(days),
            Err(_) => Self::Unparseable(trimmed.to_string()),
        }
    }
}

pub fn evaluate_staging(
    default_flag: bool,
    days_past_due: DpdInput,
    sicr_flag: bool,
) -> StagingDecision {
    let mut reasons = Vec::new();

    let dpd = match days_past_due {
        DpdInput::Days(days) => days,
        DpdInput::Missing => {
            reasons.push("Missing DPD value, defaulted to 0".to_string());
            0
        }
        DpdInput::Unparseable(raw) => {
            reasons.push(format!("Invalid DPD value '{raw}', defaulted to 0"));
            0
        }
    };

    let stage = if default_flag {
        reasons.push("Default flag is set, asset is credit impaired".to_string());
        3
    } else if dpd > 30 {
        reasons.push(format!("DPD of {dpd} days exceeds 30-day threshold"));
        2
    } else if sicr_flag {
        reasons.push("Significant increase in credit risk detected".to_string());
        2
    } else {
        reasons.push("No significant increase in credit risk or default observed".to_string());
        1
    };

    StagingDecision { stage, reasons }
}
