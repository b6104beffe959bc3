use std::io;

use serde_json::Value;

/// The decision trace is already a finished human-readable document; text
/// mode prints it verbatim.
pub fn render_decision(data: &Value) -> io::Result<String> {
    data.get("trace")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| io::Error::other("decision output requires a trace"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_decision;

    #[test]
    fn prints_the_trace_verbatim() {
        let data = json!({
            "stage": 2,
            "trace": "Stage Evaluation: Assigned Stage 2 because:\n- DPD of 45 days exceeds 30-day threshold"
        });

        let rendered = render_decision(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Stage Evaluation: Assigned Stage 2 because:"));
        }
    }
}
