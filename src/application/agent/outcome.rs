use serde_json::Value;

use crate::domain::types::RunOutcome;

/// Parse the oracle's final turn into a [`RunOutcome`].
///
/// Tolerates fenced code blocks and surrounding prose; returns `None` when no
/// JSON object with the required shape can be recovered.
pub fn parse_run_outcome(content: &str) -> Option<RunOutcome> {
    let value = extract_json(content)?;
    serde_json::from_value(value).ok()
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed.trim_start_matches("```json");
        let stripped = stripped.trim_start_matches("```JSON");
        let stripped = stripped.trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            let candidate = stripped[..end].trim();
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Some(value);
    }

    None
}
