//! Step record validation.
//!
//! Producers hand steps over as JSON objects. A step is accepted only if
//! every field in [`STEP_FIELDS`] is present, each has the expected type,
//! and `progress` lies in [0, 100]. Validation never touches aggregation
//! state, so a rejected step leaves the session exactly as it was.

use serde_json::Value;

use super::error::ValidationError;
use super::step::{StepRecord, STEP_FIELDS};

/// Parse and validate a raw step.
///
/// # Errors
///
/// - `ValidationError::NotAnObject`: `raw` is not a JSON object.
/// - `ValidationError::MissingField`: the first absent field, in trace order.
/// - `ValidationError::InvalidField`: a field has the wrong type.
/// - `ValidationError::ProgressOutOfRange`: progress outside [0, 100].
pub fn parse_step(raw: &Value) -> Result<StepRecord, ValidationError> {
    let fields = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = STEP_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
        return Err(ValidationError::MissingField {
            field: missing.to_string(),
        });
    }

    let step: StepRecord =
        serde_json::from_value(raw.clone()).map_err(|e| ValidationError::InvalidField {
            reason: e.to_string(),
        })?;
    validate_step(&step)?;
    Ok(step)
}

/// Range checks for an already-typed step.
pub fn validate_step(step: &StepRecord) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&step.progress) {
        return Err(ValidationError::ProgressOutOfRange {
            progress: step.progress,
        });
    }
    Ok(())
}
