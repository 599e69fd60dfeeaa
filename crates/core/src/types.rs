use serde_json::{Map, Value};

use crate::error::CoreError;

/// One deserialized step record: a mapping of string keys to JSON values.
pub type StepRecord = Map<String, Value>;

/// Step identifiers are free-form labels such as `step_5` or `step_11_means`.
pub type StepId = String;

/// Borrow a value as a step record, rejecting anything that is not a mapping.
pub fn as_record<'a>(value: &'a Value, label: &str) -> Result<&'a StepRecord, CoreError> {
    value.as_object().ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "{label} must be a mapping, got {}",
            json_type_name(value)
        ))
    })
}

/// Short type name used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_mapping() {
        let value = json!({"needs": []});
        assert!(as_record(&value, "step_5").is_ok());
    }

    #[test]
    fn rejects_sequence() {
        let value = json!(["a", "b"]);
        let err = as_record(&value, "step_5").unwrap_err();
        assert!(err.to_string().contains("step_5 must be a mapping, got sequence"));
    }
}
