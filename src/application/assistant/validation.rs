use super::types::{ConvertInput, RefineInput};
use crate::domain::{AssistError, PatternSpecification};

pub fn validate_specification(spec: &PatternSpecification) -> Result<(), AssistError> {
    if spec.description.trim().is_empty() {
        return Err(AssistError::validation("Description is required"));
    }
    Ok(())
}

pub fn validate_refinement(input: &RefineInput) -> Result<(), AssistError> {
    if input.feedback.trim().is_empty() {
        return Err(AssistError::validation("Feedback is required"));
    }
    if input.generation_context.trim().is_empty() {
        return Err(AssistError::validation(
            "No generation context available. Generate a pattern first",
        ));
    }
    if input.current.find.trim().is_empty() {
        return Err(AssistError::validation("Find pattern is required"));
    }
    Ok(())
}

pub fn validate_conversion(input: &ConvertInput) -> Result<(), AssistError> {
    if input.pair.find.trim().is_empty() {
        return Err(AssistError::validation("Find pattern is required"));
    }
    Ok(())
}
